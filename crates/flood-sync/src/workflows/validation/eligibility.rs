use super::domain::{Report, ReportStatus};
use super::voting::VotingRules;

/// Whether a report may still receive votes.
pub fn is_eligible(report: &Report, rules: &VotingRules) -> bool {
    report.status == ReportStatus::Pending && report.total_votes() < rules.vote_cap
}

/// Eligible reports in store order. Always recomputed, never cached.
pub fn eligible_reports(reports: &[Report], rules: &VotingRules) -> Vec<Report> {
    reports
        .iter()
        .filter(|report| is_eligible(report, rules))
        .cloned()
        .collect()
}
