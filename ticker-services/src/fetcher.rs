//! Per-pair statistic fetcher
//!
//! Issues the two grouped candle queries a pair's statistic is made of.

use std::sync::Arc;
use ticker_core::{
    Interval, Order, PairStatistic, StorageError, StorageResult, TimeSeriesStorage, TradingPair,
};

/// Candle grouping the statistics are computed on
pub const STATS_GROUP_INTERVAL: Interval = Interval::OneDay;

/// Fetches the earliest and latest daily candle of a pair
#[derive(Clone)]
pub struct PairStatFetcher {
    storage: Arc<dyn TimeSeriesStorage>,
}

impl PairStatFetcher {
    pub fn new(storage: Arc<dyn TimeSeriesStorage>) -> Self {
        Self { storage }
    }

    /// Fetch the statistic of one pair.
    ///
    /// Returns `Ok(None)` when the pair has no candles yet. Storage errors
    /// are returned as-is; retrying is the caller's business.
    pub async fn fetch(&self, pair: &TradingPair) -> StorageResult<Option<PairStatistic>> {
        let (first, last) = futures::try_join!(
            self.storage
                .query_candles(pair, 1, Order::Asc, STATS_GROUP_INTERVAL),
            self.storage
                .query_candles(pair, 1, Order::Desc, STATS_GROUP_INTERVAL),
        )?;

        let Some(first) = first.into_iter().next() else {
            return Ok(None);
        };
        let last = last.into_iter().next().ok_or_else(|| {
            StorageError::internal(format!(
                "Latest candle query for {} returned no rows while earliest did",
                pair
            ))
        })?;

        Ok(Some(PairStatistic::new(pair.clone(), first, last)))
    }
}
