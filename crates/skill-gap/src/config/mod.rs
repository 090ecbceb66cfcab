use crate::workflows::skills::UnresolvedGradePolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let telemetry = TelemetryConfig {
            log_level: var_or("APP_LOG_LEVEL", "info"),
            log_targets: flag("APP_LOG_TARGETS")?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
            data: DataConfig::from_env()?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn flag(key: &'static str) -> Result<bool, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(false),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            _ => Err(ConfigError::InvalidFlag { key, value }),
        },
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_targets: bool,
}

/// Locations of the roster tables and generated artifacts, plus the refresh
/// agent period.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub employees_csv: PathBuf,
    pub requirements_csv: PathBuf,
    pub recommendations_csv: PathBuf,
    pub insights_csv: PathBuf,
    pub refresh_interval: Duration,
    pub unresolved_grade: UnresolvedGradePolicy,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            employees_csv: PathBuf::from("employee_data.csv"),
            requirements_csv: PathBuf::from("role_skill_requirements.csv"),
            recommendations_csv: PathBuf::from("training_recommendations.csv"),
            insights_csv: PathBuf::from("consultative_insights.csv"),
            refresh_interval: Duration::from_secs(10 * 60),
            unresolved_grade: UnresolvedGradePolicy::default(),
        }
    }
}

impl DataConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let path = |key: &str, fallback: PathBuf| {
            env::var_os(key).map(PathBuf::from).unwrap_or(fallback)
        };

        let refresh_interval = match env::var("APP_REFRESH_MINUTES") {
            Ok(value) => refresh_minutes(&value)?,
            Err(_) => defaults.refresh_interval,
        };
        let unresolved_grade = match env::var("APP_UNRESOLVED_GRADE") {
            Ok(value) => value
                .parse::<UnresolvedGradePolicy>()
                .map_err(|_| ConfigError::InvalidGradePolicy { value })?,
            Err(_) => defaults.unresolved_grade,
        };

        Ok(Self {
            employees_csv: path("APP_EMPLOYEES_CSV", defaults.employees_csv),
            requirements_csv: path("APP_REQUIREMENTS_CSV", defaults.requirements_csv),
            recommendations_csv: path("APP_RECOMMENDATIONS_CSV", defaults.recommendations_csv),
            insights_csv: path("APP_INSIGHTS_CSV", defaults.insights_csv),
            refresh_interval,
            unresolved_grade,
        })
    }
}

/// Parses a positive whole number of minutes.
pub fn refresh_minutes(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(Duration::from_secs(minutes * 60)),
        _ => Err(ConfigError::InvalidRefreshInterval {
            value: value.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { key: &'static str, value: String },
    InvalidRefreshInterval { value: String },
    InvalidGradePolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false, got '{value}'")
            }
            ConfigError::InvalidRefreshInterval { value } => {
                write!(
                    f,
                    "refresh interval must be a positive number of minutes, got '{value}'"
                )
            }
            ConfigError::InvalidGradePolicy { value } => {
                write!(
                    f,
                    "unresolved grade policy must be 'bucket' or 'drop', got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidRefreshInterval { .. }
            | ConfigError::InvalidGradePolicy { .. } => None,
        }
    }
}
