use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::store::InMemorySensorStore;
use crate::workflows::validation::{
    spawn_refresh, PeerValidationService, ReportStatus, VotingRules,
};

#[tokio::test]
async fn refresh_task_pulls_store_snapshot_until_shut_down() {
    let reports = vec![pending("1"), report("2", 3, 0, ReportStatus::Validated)];
    let service = Arc::new(PeerValidationService::new(
        Arc::new(ReadOnlyReportStore {
            reports: reports.clone(),
        }),
        Arc::new(InMemorySensorStore::with_readings(vec![sensor()])),
        VotingRules::default(),
    ));
    assert!(service.cache().refreshed_at().is_none());

    let handle = spawn_refresh(service.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(service.reports(), reports);
    assert_eq!(service.dashboard().sensors.len(), 1);
    assert!(service.cache().refreshed_at().is_some());

    handle.shutdown().await;
}

#[tokio::test]
async fn refresh_failures_leave_cache_untouched() {
    let service = Arc::new(PeerValidationService::new(
        Arc::new(UnavailableReportStore),
        Arc::new(InMemorySensorStore::default()),
        VotingRules::default(),
    ));
    service.cache().upsert(pending("7"));

    let handle = spawn_refresh(service.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!handle.is_finished());
    handle.shutdown().await;

    assert_eq!(service.reports(), vec![pending("7")]);
    assert!(service.cache().refreshed_at().is_none());
}
