use crate::cli::ServeArgs;
use crate::infra::{simulated_sensor_readings, AppState};
use crate::routes::with_validation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use flood_sync::config::{AppConfig, StoreConfig};
use flood_sync::error::AppError;
use flood_sync::store::{
    HttpReportStore, HttpSensorStore, InMemoryReportStore, InMemorySensorStore, StoreClient,
};
use flood_sync::telemetry;
use flood_sync::workflows::validation::{
    spawn_refresh, PeerValidationService, ReportStore, SensorStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(url) = args.store_url.take() {
        config.store.base_url = StoreConfig::normalize_url(Some(url))?;
    }

    telemetry::init(&config.telemetry)?;

    match StoreClient::from_config(&config.store)? {
        Some(client) => {
            info!(store = client.base_url(), "using external report store");
            let reports = Arc::new(HttpReportStore::new(client.clone()));
            let sensors = Arc::new(HttpSensorStore::new(client));
            serve(config, reports, sensors).await
        }
        None => {
            warn!("STORE_BASE_URL not set; reports are kept in memory");
            let reports = Arc::new(InMemoryReportStore::default());
            let sensors = Arc::new(InMemorySensorStore::with_readings(
                simulated_sensor_readings(),
            ));
            serve(config, reports, sensors).await
        }
    }
}

async fn serve<R, S>(config: AppConfig, reports: Arc<R>, sensors: Arc<S>) -> Result<(), AppError>
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(
        PeerValidationService::new(reports, sensors, config.voting)
            .with_session_idle_timeout(config.sessions.idle_timeout),
    );
    let refresh = spawn_refresh(service.clone(), config.store.refresh_interval);

    let app = with_validation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        refresh_secs = config.store.refresh_interval.as_secs(),
        "flood report validation service ready"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    readiness_flag.store(false, Ordering::Release);
    refresh.shutdown().await;
    info!("flood report validation service stopped");

    served.map_err(AppError::from)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
