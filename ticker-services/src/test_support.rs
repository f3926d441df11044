//! Shared test doubles for the engine's unit tests

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use ticker_core::{
    Candle, Interval, MemoryTimeSeries, Order, StorageError, StorageResult, TimeSeriesStorage,
    TradingPair,
};

/// A daily candle `day` days after the epoch
pub fn daily_candle(exchange: &str, symbol: &str, day: i64) -> Candle {
    Candle {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        interval: Interval::OneDay,
        timestamp: DateTime::from_timestamp(day * 86_400, 0).unwrap(),
        open: dec!(1),
        high: dec!(1),
        low: dec!(1),
        close: dec!(1),
        base_volume: None,
        quote_volume: None,
    }
}

/// Memory store with injectable failures and call counters
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryTimeSeries,
    pair_error: Mutex<Option<StorageError>>,
    pair_failures_left: AtomicUsize,
    query_error: Mutex<Option<(Option<TradingPair>, StorageError)>>,
    stall_queries: AtomicBool,
    pub pair_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl FlakyStorage {
    pub fn new(inner: MemoryTimeSeries) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Fail the next `times` pair enumerations
    pub fn fail_pairs_with(&self, error: StorageError, times: usize) {
        *self.pair_error.lock() = Some(error);
        self.pair_failures_left.store(times, Ordering::SeqCst);
    }

    /// Fail every candle query
    pub fn fail_queries_with(&self, error: StorageError) {
        *self.query_error.lock() = Some((None, error));
    }

    /// Fail candle queries of one pair only
    pub fn fail_pair_queries_with(&self, pair: TradingPair, error: StorageError) {
        *self.query_error.lock() = Some((Some(pair), error));
    }

    /// Make every candle query hang forever
    pub fn stall_queries(&self) {
        self.stall_queries.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        *self.pair_error.lock() = None;
        *self.query_error.lock() = None;
        self.pair_failures_left.store(0, Ordering::SeqCst);
        self.stall_queries.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeSeriesStorage for FlakyStorage {
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        let left = self.pair_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            if let Some(error) = self.pair_error.lock().clone() {
                self.pair_failures_left.store(left - 1, Ordering::SeqCst);
                return Err(error);
            }
        }
        self.inner.get_trading_pairs().await
    }

    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_queries.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        let failure = self.query_error.lock().clone();
        if let Some((target, error)) = failure {
            if target.as_ref().map_or(true, |t| t == pair) {
                return Err(error);
            }
        }
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
