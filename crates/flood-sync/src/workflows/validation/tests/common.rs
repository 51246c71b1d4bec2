use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::store::{InMemoryReportStore, InMemorySensorStore};
use crate::workflows::validation::{
    NewReport, PeerValidationService, Report, ReportId, ReportStatus, ReportStore,
    ReportSubmission, SensorReading, StoreError, VotingRules, PLACEHOLDER_IMAGE_URL,
};

pub(super) type MemoryService = PeerValidationService<InMemoryReportStore, InMemorySensorStore>;

pub(super) fn timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T09:30:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(super) fn report(id: &str, upvotes: u32, downvotes: u32, status: ReportStatus) -> Report {
    Report {
        id: ReportId(id.to_string()),
        location: format!("Street {id}"),
        latitude: 6.52,
        longitude: 3.38,
        water_level: 1.0,
        description: "Water over the kerb".to_string(),
        image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        timestamp: timestamp(),
        upvotes,
        downvotes,
        status,
    }
}

pub(super) fn pending(id: &str) -> Report {
    report(id, 0, 0, ReportStatus::Pending)
}

pub(super) fn submission(location: &str, water_level: f64) -> ReportSubmission {
    ReportSubmission {
        location: location.to_string(),
        water_level,
        description: "Heavy flooding, blocked drain".to_string(),
        latitude: Some(6.6),
        longitude: Some(3.5),
        image_url: None,
    }
}

pub(super) fn sensor() -> SensorReading {
    SensorReading {
        id: "sensor-1".to_string(),
        location: "Lagos Island".to_string(),
        latitude: 6.4541,
        longitude: 3.3947,
        current_water_level: 1.35,
        timestamp: timestamp(),
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryReportStore>) {
    let reports = Arc::new(InMemoryReportStore::default());
    let sensors = Arc::new(InMemorySensorStore::with_readings(vec![sensor()]));
    let service = Arc::new(PeerValidationService::new(
        reports.clone(),
        sensors,
        VotingRules::default(),
    ));
    (service, reports)
}

/// Submit `count` reports through the service, returning them in order.
pub(super) async fn seed(service: &MemoryService, count: usize) -> Vec<Report> {
    let mut stored = Vec::with_capacity(count);
    for index in 0..count {
        let report = service
            .submit(submission(&format!("Ward {index}"), 0.5 + index as f64))
            .await
            .expect("submission stored");
        stored.push(report);
    }
    stored
}

pub(super) struct UnavailableReportStore;

#[async_trait]
impl ReportStore for UnavailableReportStore {
    async fn list(&self) -> Result<Vec<Report>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create(&self, _report: NewReport) -> Result<Report, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update(&self, _id: &ReportId, _report: Report) -> Result<Report, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Serves reads from a fixed snapshot but refuses every write.
pub(super) struct ReadOnlyReportStore {
    pub(super) reports: Vec<Report>,
}

#[async_trait]
impl ReportStore for ReadOnlyReportStore {
    async fn list(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.reports.clone())
    }

    async fn create(&self, _report: NewReport) -> Result<Report, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    async fn update(&self, _id: &ReportId, _report: Report) -> Result<Report, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
