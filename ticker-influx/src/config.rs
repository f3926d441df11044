//! Connection settings for the InfluxDB client

use std::time::Duration;

/// Default measurement holding candles
pub const CANDLES_MEASUREMENT: &str = "candles";

/// Configuration for [`InfluxTimeSeries`](crate::InfluxTimeSeries)
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    /// Database queried and written to
    pub database: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Measurement holding candles
    pub measurement: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            database: "jticker".to_string(),
            timeout: Duration::from_secs(10),
            measurement: CANDLES_MEASUREMENT.to_string(),
        }
    }
}

impl InfluxConfig {
    /// HTTP base URL of the server
    pub fn base_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&format!("http://{}:{}", self.host, self.port))
    }
}
