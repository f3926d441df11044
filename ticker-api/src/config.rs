//! Environment configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use ticker_influx::InfluxConfig;
use ticker_services::StatsServiceConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {field}={value:?}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Everything the binary reads from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub web_host: String,
    pub web_port: u16,
    pub influx: InfluxConfig,
    pub stats: StatsServiceConfig,
    /// Create the database before serving
    pub allow_migrations: bool,
    /// Reported by `/healthcheck`
    pub version: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset and blank values
    /// fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let influx_defaults = InfluxConfig::default();
        let stats_defaults = StatsServiceConfig::default();

        let stack_size: usize = parse(&get, "TIME_SERIES_STACKED_REQUESTS_SIZE", 10)?;
        if stack_size == 0 {
            return Err(ConfigError::invalid(
                "TIME_SERIES_STACKED_REQUESTS_SIZE",
                "0",
                "must be at least 1",
            ));
        }

        let update_interval = seconds(&get, "TIME_SERIES_UPDATE_INTERVAL", 86_400.0)?;
        if update_interval.is_zero() {
            return Err(ConfigError::invalid(
                "TIME_SERIES_UPDATE_INTERVAL",
                "0",
                "must be positive",
            ));
        }

        Ok(Self {
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse(&get, "WEB_PORT", 8080)?,
            influx: InfluxConfig {
                host: get("TIME_SERIES_HOST").unwrap_or(influx_defaults.host),
                port: parse(&get, "TIME_SERIES_PORT", influx_defaults.port)?,
                database: get("TIME_SERIES_DB").unwrap_or(influx_defaults.database),
                timeout: seconds(&get, "TIME_SERIES_CLIENT_TIMEOUT", 10.0)?,
                measurement: influx_defaults.measurement,
            },
            stats: StatsServiceConfig {
                cache_file: get("STATS_CACHE_FILE").map(PathBuf::from),
                update_interval,
                stack_size,
                stack_interval: seconds(&get, "TIME_SERIES_STACKED_REQUESTS_INTERVAL", 10.0)?,
                retry: stats_defaults.retry,
            },
            allow_migrations: flag(&get, "TIME_SERIES_ALLOW_MIGRATIONS")?,
            version: get("STATS_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    field: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(field) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(field, &raw, e.to_string())),
        None => Ok(default),
    }
}

/// Fractional, non-negative seconds
fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    field: &'static str,
    default: f64,
) -> Result<Duration, ConfigError> {
    let secs: f64 = parse(get, field, default)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ConfigError::invalid(field, &secs.to_string(), e.to_string()))
}

fn flag(get: &impl Fn(&str) -> Option<String>, field: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = get(field) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(field, &raw, "expected a boolean")),
    }
}
