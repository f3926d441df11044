//! InfluxDB API client
//!
//! Provides the time-series storage operations over the InfluxDB 1.x HTTP API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::collections::BTreeSet;
use ticker_core::{
    Candle, Interval, Order, StorageError, StorageResult, TimeSeriesStorage, TradingPair,
};
use tracing::{debug, info, instrument};

use crate::config::InfluxConfig;
use crate::types::{
    parse_series_key, quote_literal, to_line_protocol, QueryResponse, StatementResult,
};

/// InfluxDB-backed time-series storage
#[derive(Clone)]
pub struct InfluxTimeSeries {
    client: Client,
    base_url: String,
    database: String,
    measurement: String,
}

impl InfluxTimeSeries {
    /// Create a new client
    pub fn new(config: &InfluxConfig) -> StorageResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| StorageError::internal(format!("Invalid InfluxDB address: {}", e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            database: config.database.clone(),
            measurement: config.measurement.clone(),
        })
    }

    /// Run a read-only InfluxQL query
    #[instrument(skip(self))]
    pub async fn query(&self, q: &str) -> StorageResult<Vec<StatementResult>> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("db", self.database.as_str()), ("q", q), ("epoch", "s")])
            .send()
            .await
            .map_err(|e| StorageError::network(format!("Failed to query InfluxDB: {}", e)))?;

        Self::decode(response).await
    }

    /// Run a statement that modifies server state (e.g. `CREATE DATABASE`)
    #[instrument(skip(self))]
    async fn execute(&self, q: &str) -> StorageResult<Vec<StatementResult>> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("q", q)])
            .send()
            .await
            .map_err(|e| StorageError::network(format!("Failed to execute on InfluxDB: {}", e)))?;

        Self::decode(response).await
    }

    async fn decode(response: Response) -> StorageResult<Vec<StatementResult>> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::api(status.as_u16(), body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::network(format!("Failed to read query response: {}", e)))?;
        let parsed: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| StorageError::parse(format!("Failed to parse query response: {}", e)))?;

        parsed.into_results()
    }

    /// Build the grouped candle query for one pair
    fn candles_query(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> String {
        format!(
            concat!(
                "SELECT first(\"open\") AS \"open\", max(\"high\") AS \"high\", ",
                "min(\"low\") AS \"low\", last(\"close\") AS \"close\", ",
                "sum(\"base_volume\") AS \"base_volume\", sum(\"quote_volume\") AS \"quote_volume\" ",
                "FROM \"{}\" WHERE \"exchange\" = {} AND \"symbol\" = {} AND time >= 0 ",
                "GROUP BY time({}) fill(none) ORDER BY time {} LIMIT {}"
            ),
            self.measurement,
            quote_literal(&pair.exchange),
            quote_literal(&pair.symbol),
            group_interval.as_str(),
            order.as_sql(),
            limit
        )
    }
}

#[async_trait]
impl TimeSeriesStorage for InfluxTimeSeries {
    #[instrument(skip(self))]
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>> {
        let q = format!("SHOW SERIES FROM \"{}\"", self.measurement);
        let results = self.query(&q).await?;

        let pairs: BTreeSet<TradingPair> = results
            .iter()
            .flat_map(|r| r.series.iter())
            .flat_map(|s| s.values.iter())
            .filter_map(|row| row.first().and_then(|v| v.as_str()))
            .filter_map(parse_series_key)
            .collect();

        debug!("InfluxDB reports {} trading pairs", pairs.len());
        Ok(pairs.into_iter().collect())
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>> {
        let q = self.candles_query(pair, limit, order, group_interval);
        let results = self.query(&q).await?;

        let mut candles = Vec::new();
        for series in results.iter().flat_map(|r| r.series.iter()) {
            candles.extend(series.to_candles(pair, group_interval)?);
        }
        Ok(candles)
    }

    #[instrument(skip(self, candles), fields(count = candles.len()))]
    async fn add_candles(&self, candles: &[Candle]) -> StorageResult<()> {
        if candles.is_empty() {
            return Ok(());
        }

        let body = candles
            .iter()
            .map(|c| to_line_protocol(&self.measurement, c))
            .collect::<Vec<_>>()
            .join("\n");

        let url = format!("{}/write", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("db", self.database.as_str()), ("precision", "s")])
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::network(format!("Failed to write candles: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::api(status.as_u16(), body));
        }

        Ok(())
    }

    async fn migrate(&self) -> StorageResult<()> {
        let q = format!("CREATE DATABASE \"{}\"", self.database);
        self.execute(&q).await?;
        info!("InfluxDB database {} is ready", self.database);
        Ok(())
    }
}
