use std::env;
use std::fmt;
use std::time::Duration;

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

/// Top-level configuration for the back-office core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("API_BASE").map_err(|_| ConfigError::MissingApiBase)?;
        let api = ApiConfig::new(base_url, parse_var("API_TIMEOUT_SECS", 10)?)?;

        let refresh = RefreshConfig {
            base_interval_ms: parse_var("REFRESH_BASE_MS", 30_000)?,
            max_interval_ms: parse_var("REFRESH_MAX_MS", 120_000)?,
            search_debounce_ms: parse_var("SEARCH_DEBOUNCE_MS", 250)?,
        };
        refresh.validate()?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api,
            refresh,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Connection settings for the agency HTTP API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingApiBase);
        }
        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Base URL with any trailing slash removed, so callers can join
    /// server-relative paths by plain concatenation.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Timing knobs for the background refresh loop and the search debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub base_interval_ms: u64,
    pub max_interval_ms: u64,
    pub search_debounce_ms: u64,
}

impl RefreshConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_interval_ms == 0 || self.max_interval_ms < self.base_interval_ms {
            return Err(ConfigError::InvalidBackoffWindow {
                base_ms: self.base_interval_ms,
                max_ms: self.max_interval_ms,
            });
        }
        Ok(())
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 30_000,
            max_interval_ms: 120_000,
            search_debounce_ms: 250,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiBase,
    InvalidNumber { name: &'static str, value: String },
    InvalidBackoffWindow { base_ms: u64, max_ms: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiBase => {
                write!(f, "API_BASE must be set to the agency API base URL")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer, got '{value}'")
            }
            ConfigError::InvalidBackoffWindow { base_ms, max_ms } => {
                write!(
                    f,
                    "refresh window is invalid: base {base_ms}ms must be positive and no larger than max {max_ms}ms"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
