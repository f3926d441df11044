//! InfluxDB wire types
//!
//! These types mirror the `/query` JSON responses and the line protocol
//! accepted by `/write`, and convert to ticker-core types.

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use ticker_core::{Candle, Interval, StorageError, StorageResult, TradingPair};

/// Response from GET/POST /query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    /// Set when the whole request failed (e.g. unparseable query)
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a single InfluxQL statement
#[derive(Debug, Clone, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: u32,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One series of a statement result
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl QueryResponse {
    /// Flatten into statement results, surfacing any query error
    pub fn into_results(self) -> StorageResult<Vec<StatementResult>> {
        if let Some(error) = self.error {
            return Err(StorageError::query(error));
        }
        if let Some(error) = self.results.iter().find_map(|r| r.error.clone()) {
            return Err(StorageError::query(error));
        }
        Ok(self.results)
    }
}

impl Series {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Decode grouped candle rows
    ///
    /// Rows whose price columns are null (empty buckets when `fill(none)` was
    /// not honoured) are skipped.
    pub fn to_candles(&self, pair: &TradingPair, interval: Interval) -> StorageResult<Vec<Candle>> {
        let time_idx = self
            .column_index("time")
            .ok_or_else(|| StorageError::parse("Missing time column"))?;
        let price_idx = ["open", "high", "low", "close"].map(|name| self.column_index(name));
        let [Some(open_idx), Some(high_idx), Some(low_idx), Some(close_idx)] = price_idx else {
            return Err(StorageError::parse(format!(
                "Missing price columns in {:?}",
                self.columns
            )));
        };
        let base_idx = self.column_index("base_volume");
        let quote_idx = self.column_index("quote_volume");

        let mut candles = Vec::with_capacity(self.values.len());
        for row in &self.values {
            if row.get(open_idx).map_or(true, Value::is_null) {
                continue;
            }

            let ts = row
                .get(time_idx)
                .and_then(Value::as_i64)
                .ok_or_else(|| StorageError::parse(format!("Invalid time in row {:?}", row)))?;
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| StorageError::parse(format!("Timestamp out of range: {}", ts)))?;

            candles.push(Candle {
                exchange: pair.exchange.clone(),
                symbol: pair.symbol.clone(),
                interval,
                timestamp,
                open: decimal_at(row, open_idx)?,
                high: decimal_at(row, high_idx)?,
                low: decimal_at(row, low_idx)?,
                close: decimal_at(row, close_idx)?,
                base_volume: optional_decimal_at(row, base_idx)?,
                quote_volume: optional_decimal_at(row, quote_idx)?,
            });
        }

        Ok(candles)
    }
}

fn decimal_at(row: &[Value], idx: usize) -> StorageResult<Decimal> {
    optional_decimal_at(row, Some(idx))?
        .ok_or_else(|| StorageError::parse(format!("Null price in row {:?}", row)))
}

fn optional_decimal_at(row: &[Value], idx: Option<usize>) -> StorageResult<Option<Decimal>> {
    let Some(value) = idx.and_then(|i| row.get(i)) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let number = value
        .as_f64()
        .ok_or_else(|| StorageError::parse(format!("Expected number, got {}", value)))?;
    Decimal::try_from(number)
        .map(Some)
        .map_err(|e| StorageError::parse(format!("Invalid decimal {}: {}", number, e)))
}

/// Parse a series key (`candles,exchange=A,interval=1d,symbol=BTCUSD`)
/// into its trading pair. Returns `None` when either tag is missing.
pub fn parse_series_key(key: &str) -> Option<TradingPair> {
    let mut parts = split_unescaped(key, ',').into_iter();
    let _measurement = parts.next()?;

    let mut exchange = None;
    let mut symbol = None;
    for part in parts {
        let kv = split_unescaped(part, '=');
        let [name, value] = kv.as_slice() else {
            continue;
        };
        match unescape(name).as_str() {
            "exchange" => exchange = Some(unescape(value)),
            "symbol" => symbol = Some(unescape(value)),
            _ => {}
        }
    }

    Some(TradingPair::new(exchange?, symbol?))
}

/// Split on every `sep` not preceded by a backslash, keeping escapes intact
fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape a tag key or value for the line protocol
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quote a string literal for an InfluxQL `WHERE` clause
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Encode a candle as one line-protocol point with second precision
pub fn to_line_protocol(measurement: &str, candle: &Candle) -> String {
    let mut fields = vec![
        format!("open={}", candle.open),
        format!("high={}", candle.high),
        format!("low={}", candle.low),
        format!("close={}", candle.close),
    ];
    if let Some(v) = candle.base_volume {
        fields.push(format!("base_volume={}", v));
    }
    if let Some(v) = candle.quote_volume {
        fields.push(format!("quote_volume={}", v));
    }

    format!(
        "{},exchange={},interval={},symbol={} {} {}",
        escape_tag(measurement),
        escape_tag(&candle.exchange),
        candle.interval,
        escape_tag(&candle.symbol),
        fields.join(","),
        candle.timestamp.timestamp()
    )
}
