use async_trait::async_trait;

use super::domain::{NewReport, Report, ReportId, SensorReading};

/// Report persistence collaborator, addressable by report id.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// All reports in insertion order.
    async fn list(&self) -> Result<Vec<Report>, StoreError>;

    /// Store a new report; the store assigns the id.
    async fn create(&self, report: NewReport) -> Result<Report, StoreError>;

    /// Replace the record stored under `id`.
    async fn update(&self, id: &ReportId, report: Report) -> Result<Report, StoreError>;

    async fn fetch(&self, id: &ReportId) -> Result<Option<Report>, StoreError> {
        let reports = self.list().await?;
        Ok(reports.into_iter().find(|report| &report.id == id))
    }
}

/// Read-only sensor feed consumed by the dashboard.
#[async_trait]
pub trait SensorStore: Send + Sync {
    async fn list(&self) -> Result<Vec<SensorReading>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record not found")]
    NotFound,
    #[error("store returned an unreadable payload: {0}")]
    Decode(String),
}
