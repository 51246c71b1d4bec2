use chrono::Utc;
use flood_sync::workflows::validation::SensorReading;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sensor feed used when no external store is configured.
pub(crate) fn simulated_sensor_readings() -> Vec<SensorReading> {
    vec![SensorReading {
        id: "sensor-lagos-island".to_string(),
        location: "Lagos Island".to_string(),
        latitude: 6.4541,
        longitude: 3.3947,
        current_water_level: 1.2,
        timestamp: Utc::now(),
    }]
}
