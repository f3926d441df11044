//! Time-series storage abstraction
//!
//! The statistics engine only ever reads through this trait; the write side
//! exists for tooling and tests that need to seed a store.

use async_trait::async_trait;
use std::sync::Arc;

use crate::candle::{Candle, Interval, Order};
use crate::error::StorageResult;
use crate::pair::TradingPair;

#[async_trait]
pub trait TimeSeriesStorage: Send + Sync {
    /// Enumerate every trading pair the store currently holds candles for
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>>;

    /// Query up to `limit` candles of `pair`, regrouped to `group_interval`.
    ///
    /// An empty result means the pair has no data; it is not an error.
    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>>;

    /// Append candles, replacing any with the same pair, interval and timestamp
    async fn add_candles(&self, candles: &[Candle]) -> StorageResult<()>;

    /// Create whatever the store needs before candles can be written
    async fn migrate(&self) -> StorageResult<()>;
}

#[async_trait]
impl<T: TimeSeriesStorage + ?Sized> TimeSeriesStorage for Arc<T> {
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>> {
        (**self).get_trading_pairs().await
    }

    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>> {
        (**self).query_candles(pair, limit, order, group_interval).await
    }

    async fn add_candles(&self, candles: &[Candle]) -> StorageResult<()> {
        (**self).add_candles(candles).await
    }

    async fn migrate(&self) -> StorageResult<()> {
        (**self).migrate().await
    }
}
