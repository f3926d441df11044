//! Fixtures shared by the engine integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal_macros::dec;
use ticker_core::{
    Candle, Interval, MemoryTimeSeries, Order, StorageResult, TimeSeriesStorage, TradingPair,
};

/// Midnight UTC of the current day; read once per test so every fixture
/// date in it shares the same anchor
pub fn today() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .unwrap()
}

/// Midnight UTC `days` days before `today`
pub fn days_before(today: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    today - Duration::days(days)
}

pub fn candle_at(exchange: &str, symbol: &str, timestamp: DateTime<Utc>) -> Candle {
    Candle {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        interval: Interval::OneMinute,
        timestamp,
        open: dec!(100),
        high: dec!(110),
        low: dec!(90),
        close: dec!(105),
        base_volume: Some(dec!(2.5)),
        quote_volume: None,
    }
}

/// Memory store that also lists pairs it holds no candles for, like a
/// series that exists in the index but whose points were dropped
#[derive(Default)]
pub struct ListedPairs {
    pub inner: MemoryTimeSeries,
    extra: RwLock<Vec<TradingPair>>,
}

impl ListedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, pair: TradingPair) {
        self.extra.write().push(pair);
    }
}

#[async_trait]
impl TimeSeriesStorage for ListedPairs {
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>> {
        let mut pairs = self.inner.get_trading_pairs().await?;
        pairs.extend(self.extra.read().iter().cloned());
        Ok(pairs)
    }

    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>> {
        self.inner
            .query_candles(pair, limit, order, group_interval)
            .await
    }

    async fn add_candles(&self, candles: &[Candle]) -> StorageResult<()> {
        self.inner.add_candles(candles).await
    }

    async fn migrate(&self) -> StorageResult<()> {
        self.inner.migrate().await
    }
}
