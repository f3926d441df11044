//! Candle data structures

use crate::pair::TradingPair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle aggregation interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute candles
    #[serde(rename = "1m")]
    OneMinute,
    /// 5 minute candles
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minute candles
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 1 hour candles
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hour candles
    #[serde(rename = "4h")]
    FourHours,
    /// 1 day candles
    #[serde(rename = "1d")]
    OneDay,
    /// 1 week candles
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    /// Get the interval duration in seconds
    pub fn to_seconds(&self) -> u32 {
        match self {
            Interval::OneMinute => 60,
            Interval::FiveMinutes => 300,
            Interval::FifteenMinutes => 900,
            Interval::OneHour => 3600,
            Interval::FourHours => 14400,
            Interval::OneDay => 86400,
            Interval::OneWeek => 604800,
        }
    }

    /// String representation, also a valid InfluxQL duration literal
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time ordering of a candle query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Oldest first
    Asc,
    /// Newest first
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// A single OHLC candle for one trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub exchange: String,
    pub symbol: String,
    pub interval: Interval,
    /// Start time of the candle, unix seconds on the wire
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub base_volume: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quote_volume: Option<Decimal>,
}

impl Candle {
    /// The trading pair this candle belongs to
    pub fn trading_pair(&self) -> TradingPair {
        TradingPair::new(self.exchange.clone(), self.symbol.clone())
    }

    /// Whether this candle belongs to `pair`
    pub fn is_for(&self, pair: &TradingPair) -> bool {
        self.exchange == pair.exchange && self.symbol == pair.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_interval_names() {
        assert_eq!(serde_json::to_value(Interval::OneWeek).unwrap(), "1w");
        assert_eq!(
            serde_json::from_str::<Interval>("\"1d\"").unwrap(),
            Interval::OneDay
        );
        assert!(serde_json::from_str::<Interval>("\"2d\"").is_err());
        assert_eq!(Interval::OneDay.to_seconds(), 86400);
        assert_eq!(Interval::FourHours.to_string(), "4h");
    }

    #[test]
    fn test_candle_wire_format() {
        let candle = Candle {
            exchange: "A".to_string(),
            symbol: "BTCUSD".to_string(),
            interval: Interval::OneDay,
            timestamp: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            open: dec!(1.5),
            high: dec!(2),
            low: dec!(1),
            close: dec!(1.25),
            base_volume: None,
            quote_volume: Some(dec!(10)),
        };

        let json = serde_json::to_value(&candle).unwrap();
        assert_eq!(json["interval"], "1d");
        assert_eq!(json["timestamp"], 1_600_000_000);
        assert_eq!(json["open"], 1.5);
        assert_eq!(json["close"], 1.25);
        assert!(json["base_volume"].is_null());

        let back: Candle = serde_json::from_value(json).unwrap();
        assert_eq!(back, candle);
    }

    #[test]
    fn test_candle_missing_volumes() {
        let json = r#"{
            "exchange": "A", "symbol": "CD", "interval": "1m", "timestamp": 60,
            "open": 1, "high": 1, "low": 1, "close": 1
        }"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.base_volume, None);
        assert_eq!(candle.trading_pair(), TradingPair::new("A", "CD"));
    }
}
