use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::validation::StoreError;

/// Failure that stops one of the binary's commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Process exit status, following the sysexits convention.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 78,
            AppError::Store(StoreError::Unavailable(_)) => 69,
            AppError::Io(_) => 74,
            AppError::Telemetry(_) | AppError::Store(_) => 1,
        }
    }
}
