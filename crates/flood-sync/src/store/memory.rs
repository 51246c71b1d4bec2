use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::workflows::validation::{
    NewReport, Report, ReportId, ReportStore, SensorReading, SensorStore, StoreError,
};

/// Report store kept in process memory, preserving insertion order.
#[derive(Debug)]
pub struct InMemoryReportStore {
    records: Mutex<Vec<Report>>,
    sequence: AtomicU64,
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(1),
        }
    }
}

impl InMemoryReportStore {
    fn records(&self) -> Result<MutexGuard<'_, Vec<Report>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("report store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn list(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.records()?.clone())
    }

    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stored = report.into_report(ReportId(id.to_string()));
        self.records()?.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &ReportId, report: Report) -> Result<Report, StoreError> {
        let mut records = self.records()?;
        let slot = records
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StoreError::NotFound)?;
        let stored = Report {
            id: id.clone(),
            ..report
        };
        *slot = stored.clone();
        Ok(stored)
    }

    async fn fetch(&self, id: &ReportId) -> Result<Option<Report>, StoreError> {
        Ok(self
            .records()?
            .iter()
            .find(|report| &report.id == id)
            .cloned())
    }
}

/// Fixed set of sensor readings served from memory.
#[derive(Debug, Default)]
pub struct InMemorySensorStore {
    readings: Mutex<Vec<SensorReading>>,
}

impl InMemorySensorStore {
    pub fn with_readings(readings: Vec<SensorReading>) -> Self {
        Self {
            readings: Mutex::new(readings),
        }
    }
}

#[async_trait]
impl SensorStore for InMemorySensorStore {
    async fn list(&self) -> Result<Vec<SensorReading>, StoreError> {
        self.readings
            .lock()
            .map(|readings| readings.clone())
            .map_err(|_| StoreError::Unavailable("sensor store mutex poisoned".to_string()))
    }
}
