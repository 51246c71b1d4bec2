use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::domain::{Report, SensorReading};

#[derive(Debug, Default, Clone)]
struct Snapshot {
    reports: Vec<Report>,
    sensors: Vec<SensorReading>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Local copy of the store contents shared by the service and refresh task.
///
/// Refreshes overwrite the whole snapshot; whichever write lands last wins.
#[derive(Debug, Default)]
pub struct ReportCache {
    inner: RwLock<Snapshot>,
}

impl ReportCache {
    pub fn reports(&self) -> Vec<Report> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .reports
            .clone()
    }

    pub fn sensors(&self) -> Vec<SensorReading> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sensors
            .clone()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshed_at
    }

    pub fn replace(&self, reports: Vec<Report>, sensors: Vec<SensorReading>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.reports = reports;
        guard.sensors = sensors;
        guard.refreshed_at = Some(Utc::now());
    }

    /// Merge a single stored record, replacing by id or appending.
    pub fn upsert(&self, report: Report) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match guard
            .reports
            .iter_mut()
            .find(|existing| existing.id == report.id)
        {
            Some(existing) => *existing = report,
            None => guard.reports.push(report),
        }
    }
}
