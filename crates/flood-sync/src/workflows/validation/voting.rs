use serde::{Deserialize, Serialize};

use super::domain::{Report, ReportStatus, VoteKind};

/// Consensus thresholds applied to every vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingRules {
    /// Upvotes needed for a report to validate.
    pub validation_upvotes: u32,
    /// Validation only happens while downvotes stay strictly below this.
    pub validation_downvote_limit: u32,
    /// Downvotes that reject a report.
    pub rejection_downvotes: u32,
    /// Reports with this many votes in total leave the voting pool.
    pub vote_cap: u32,
}

impl Default for VotingRules {
    fn default() -> Self {
        Self {
            validation_upvotes: 3,
            validation_downvote_limit: 2,
            rejection_downvotes: 3,
            vote_cap: 5,
        }
    }
}

/// Outcome signalled to the voter after a vote lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Validated,
    Rejected,
    Pending,
}

impl VoteOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            VoteOutcome::Validated => "validated",
            VoteOutcome::Rejected => "rejected",
            VoteOutcome::Pending => "pending",
        }
    }

    /// User-facing notification for outcomes worth announcing.
    pub const fn notice(self) -> Option<&'static str> {
        match self {
            VoteOutcome::Validated => Some("Report validated successfully!"),
            VoteOutcome::Rejected => Some("Report rejected by peer validation!"),
            VoteOutcome::Pending => None,
        }
    }
}

/// Updated report together with the signalled outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteApplication {
    pub report: Report,
    pub outcome: VoteOutcome,
}

/// Apply one vote to `report` and evaluate the status transition.
///
/// Rules are checked in order and the first match wins: enough upvotes with
/// few downvotes validates, otherwise enough downvotes rejects. Reports that
/// already left `Pending` keep their status and only the counter moves.
pub fn apply_vote(report: &Report, kind: VoteKind, rules: &VotingRules) -> VoteApplication {
    let mut next = report.clone();
    match kind {
        VoteKind::Up => next.upvotes = next.upvotes.saturating_add(1),
        VoteKind::Down => next.downvotes = next.downvotes.saturating_add(1),
    }

    if next.status.is_terminal() {
        let outcome = match next.status {
            ReportStatus::Validated => VoteOutcome::Validated,
            _ => VoteOutcome::Rejected,
        };
        return VoteApplication {
            report: next,
            outcome,
        };
    }

    let outcome = if next.upvotes >= rules.validation_upvotes
        && next.downvotes < rules.validation_downvote_limit
    {
        next.status = ReportStatus::Validated;
        VoteOutcome::Validated
    } else if next.downvotes >= rules.rejection_downvotes {
        next.status = ReportStatus::Rejected;
        VoteOutcome::Rejected
    } else {
        VoteOutcome::Pending
    };

    VoteApplication {
        report: next,
        outcome,
    }
}
