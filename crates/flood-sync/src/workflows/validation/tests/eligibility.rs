use super::common::*;
use crate::workflows::validation::{
    apply_vote, eligible_reports, is_eligible, ReportStatus, VoteKind, VotingRules,
};

#[test]
fn keeps_pending_reports_under_the_vote_cap_in_store_order() {
    let rules = VotingRules::default();
    let reports = vec![
        pending("1"),
        report("2", 3, 0, ReportStatus::Validated),
        report("3", 2, 2, ReportStatus::Pending),
        report("4", 2, 3, ReportStatus::Pending),
        report("5", 0, 3, ReportStatus::Rejected),
        report("6", 1, 0, ReportStatus::Pending),
    ];

    let eligible = eligible_reports(&reports, &rules);
    let ids: Vec<_> = eligible.iter().map(|r| r.id.0.as_str()).collect();

    assert_eq!(ids, vec!["1", "3", "6"]);
}

#[test]
fn empty_store_has_empty_pool() {
    assert!(eligible_reports(&[], &VotingRules::default()).is_empty());
}

#[test]
fn reports_never_return_to_the_pool_once_ineligible() {
    let rules = VotingRules::default();
    let sequences = [
        [VoteKind::Up, VoteKind::Up, VoteKind::Up, VoteKind::Down, VoteKind::Down],
        [VoteKind::Down, VoteKind::Down, VoteKind::Down, VoteKind::Up, VoteKind::Up],
        [VoteKind::Up, VoteKind::Down, VoteKind::Up, VoteKind::Down, VoteKind::Up],
    ];

    for votes in sequences {
        let mut current = pending("1");
        let mut left_pool = false;
        for kind in votes.iter().chain(votes.iter()) {
            current = apply_vote(&current, *kind, &rules).report;
            if left_pool {
                assert!(!is_eligible(&current, &rules), "report re-entered pool");
            }
            left_pool |= !is_eligible(&current, &rules);
        }
        assert!(left_pool);
    }
}
