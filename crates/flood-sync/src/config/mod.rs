use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::validation::{VotingRules, DEFAULT_SESSION_IDLE_TIMEOUT};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub sessions: SessionConfig,
    pub voting: VotingRules,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let store = StoreConfig {
            base_url: StoreConfig::normalize_url(env::var("STORE_BASE_URL").ok())?,
            timeout: Duration::from_millis(positive_var("STORE_TIMEOUT_MS", 5_000)?),
            refresh_interval: Duration::from_secs(positive_var("REFRESH_INTERVAL_SECS", 3)?),
        };

        let sessions = SessionConfig {
            idle_timeout: Duration::from_secs(positive_var(
                "SESSION_IDLE_SECS",
                DEFAULT_SESSION_IDLE_TIMEOUT.as_secs(),
            )?),
        };

        let defaults = VotingRules::default();
        let voting = VotingRules {
            validation_upvotes: positive_var(
                "VOTE_VALIDATION_UPVOTES",
                defaults.validation_upvotes,
            )?,
            validation_downvote_limit: positive_var(
                "VOTE_VALIDATION_DOWNVOTE_LIMIT",
                defaults.validation_downvote_limit,
            )?,
            rejection_downvotes: positive_var(
                "VOTE_REJECTION_DOWNVOTES",
                defaults.rejection_downvotes,
            )?,
            vote_cap: positive_var("VOTE_CAP", defaults.vote_cap)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store,
            sessions,
            voting,
        })
    }
}

fn positive_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => Ok(value),
            _ => Err(ConfigError::InvalidNumber { key }),
        },
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where reports and sensors live and how often the local cache refreshes.
///
/// Without a `base_url` the service keeps reports in memory.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub refresh_interval: Duration,
}

impl StoreConfig {
    pub fn normalize_url(raw: Option<String>) -> Result<Option<String>, ConfigError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidStoreUrl {
                value: trimmed.to_string(),
            });
        }
        Ok(Some(trimmed.trim_end_matches('/').to_string()))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_millis(5_000),
            refresh_interval: Duration::from_secs(3),
        }
    }
}

/// Lifetime of validator sessions that stop sending requests.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidStoreUrl { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a positive integer")
            }
            ConfigError::InvalidStoreUrl { value } => {
                write!(f, "STORE_BASE_URL must be an http(s) URL, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidStoreUrl { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "STORE_BASE_URL",
            "STORE_TIMEOUT_MS",
            "REFRESH_INTERVAL_SECS",
            "SESSION_IDLE_SECS",
            "VOTE_VALIDATION_UPVOTES",
            "VOTE_VALIDATION_DOWNVOTE_LIMIT",
            "VOTE_REJECTION_DOWNVOTES",
            "VOTE_CAP",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.store.base_url.is_none());
        assert_eq!(config.store.refresh_interval, Duration::from_secs(3));
        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.voting, VotingRules::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
        reset_env();
    }

    #[test]
    fn reads_store_and_voting_overrides() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        reset_env();
        env::set_var("STORE_BASE_URL", "http://localhost:3000/");
        env::set_var("REFRESH_INTERVAL_SECS", "10");
        env::set_var("VOTE_CAP", "7");
        env::set_var("SESSION_IDLE_SECS", "120");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.store.base_url.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.store.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.voting.vote_cap, 7);
        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(120));
        assert_eq!(config.voting.validation_upvotes, 3);
        reset_env();
    }

    #[test]
    fn rejects_zero_refresh_interval_and_bad_urls() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        reset_env();
        env::set_var("REFRESH_INTERVAL_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "REFRESH_INTERVAL_SECS"
            })
        ));

        reset_env();
        env::set_var("STORE_BASE_URL", "localhost:3000");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidStoreUrl { .. })
        ));
        reset_env();
    }
}
