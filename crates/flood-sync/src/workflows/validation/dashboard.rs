use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Report, ReportId, ReportStatus, SensorReading, MAP_CENTER};

/// Upper bound of the water level chart axis, in meters.
pub const CHART_MAX_LEVEL: f64 = 2.5;

/// Map marker for a validated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMarker {
    pub id: ReportId,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: f64,
    pub description: String,
    pub image_url: String,
}

/// Listing entry covering every report regardless of status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub id: ReportId,
    pub location: String,
    pub water_level: f64,
    pub description: String,
    pub image_url: String,
    pub status: ReportStatus,
    pub status_label: &'static str,
    pub upvotes: u32,
    pub downvotes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorChartPoint {
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub water_level: f64,
    pub axis_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the dashboard renders from one snapshot of the stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub map_center: MapCenter,
    pub validated: Vec<ReportMarker>,
    pub sensors: Vec<SensorReading>,
    pub sensor_chart: Option<SensorChartPoint>,
    pub reports: Vec<ReportCard>,
}

impl DashboardView {
    pub fn project(reports: &[Report], sensors: &[SensorReading]) -> Self {
        let validated = validated_reports(reports)
            .map(|report| ReportMarker {
                id: report.id.clone(),
                location: report.location.clone(),
                latitude: report.latitude,
                longitude: report.longitude,
                water_level: report.water_level,
                description: report.description.clone(),
                image_url: report.image_url.clone(),
            })
            .collect();

        let cards = reports
            .iter()
            .map(|report| ReportCard {
                id: report.id.clone(),
                location: report.location.clone(),
                water_level: report.water_level,
                description: report.description.clone(),
                image_url: report.image_url.clone(),
                status: report.status,
                status_label: report.status.label(),
                upvotes: report.upvotes,
                downvotes: report.downvotes,
            })
            .collect();

        // Only the first sensor feeds the chart.
        let sensor_chart = sensors.first().map(|sensor| SensorChartPoint {
            location: sensor.location.clone(),
            timestamp: sensor.timestamp,
            water_level: sensor.current_water_level,
            axis_max: CHART_MAX_LEVEL,
        });

        Self {
            map_center: MapCenter {
                latitude: MAP_CENTER.0,
                longitude: MAP_CENTER.1,
            },
            validated,
            sensors: sensors.to_vec(),
            sensor_chart,
            reports: cards,
        }
    }
}

/// Reports that made it onto the map.
pub fn validated_reports(reports: &[Report]) -> impl Iterator<Item = &Report> {
    reports.iter().filter(|report| report.validated())
}
