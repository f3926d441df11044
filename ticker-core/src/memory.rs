//! In-process time-series store
//!
//! Behaves like the real store for the operations the statistics engine
//! needs: candles are regrouped into epoch-aligned buckets of the requested
//! interval, then ordered and limited.

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::candle::{Candle, Interval, Order};
use crate::error::StorageResult;
use crate::pair::TradingPair;
use crate::storage::TimeSeriesStorage;

/// Candles of one pair keyed by (timestamp, interval)
type Series = BTreeMap<(i64, u32), Candle>;

#[derive(Debug, Default)]
pub struct MemoryTimeSeries {
    series: RwLock<HashMap<TradingPair, Series>>,
}

impl MemoryTimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored candles across all pairs
    pub fn candle_count(&self) -> usize {
        self.series.read().values().map(BTreeMap::len).sum()
    }

    /// Build one grouped candle from the raw candles of a bucket
    fn merge_bucket(
        pair: &TradingPair,
        bucket_ts: i64,
        interval: Interval,
        candles: &[&Candle],
    ) -> Option<Candle> {
        let first = candles.first()?;
        let last = candles.last()?;

        let high = candles.iter().map(|c| c.high).max().unwrap_or(first.high);
        let low = candles.iter().map(|c| c.low).min().unwrap_or(first.low);

        Some(Candle {
            exchange: pair.exchange.clone(),
            symbol: pair.symbol.clone(),
            interval,
            timestamp: DateTime::from_timestamp(bucket_ts, 0).unwrap_or(first.timestamp),
            open: first.open,
            high,
            low,
            close: last.close,
            base_volume: sum_volumes(candles.iter().map(|c| c.base_volume)),
            quote_volume: sum_volumes(candles.iter().map(|c| c.quote_volume)),
        })
    }
}

fn sum_volumes(volumes: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    volumes.fold(None, |acc, v| match (acc, v) {
        (None, None) => None,
        (acc, v) => Some(acc.unwrap_or_default() + v.unwrap_or_default()),
    })
}

#[async_trait]
impl TimeSeriesStorage for MemoryTimeSeries {
    async fn get_trading_pairs(&self) -> StorageResult<Vec<TradingPair>> {
        let series = self.series.read();
        let mut pairs: Vec<TradingPair> = series
            .iter()
            .filter(|(_, candles)| !candles.is_empty())
            .map(|(pair, _)| pair.clone())
            .collect();
        pairs.sort();
        Ok(pairs)
    }

    async fn query_candles(
        &self,
        pair: &TradingPair,
        limit: usize,
        order: Order,
        group_interval: Interval,
    ) -> StorageResult<Vec<Candle>> {
        let series = self.series.read();
        let Some(candles) = series.get(pair) else {
            return Ok(Vec::new());
        };

        let interval_secs = group_interval.to_seconds() as i64;
        let mut buckets: BTreeMap<i64, Vec<&Candle>> = BTreeMap::new();
        for candle in candles.values() {
            let bucket = candle.timestamp.timestamp().div_euclid(interval_secs) * interval_secs;
            buckets.entry(bucket).or_default().push(candle);
        }

        let grouped = buckets.into_iter().filter_map(|(bucket_ts, bucket_candles)| {
            Self::merge_bucket(pair, bucket_ts, group_interval, &bucket_candles)
        });

        let result = match order {
            Order::Asc => grouped.take(limit).collect(),
            Order::Desc => {
                let mut all: Vec<Candle> = grouped.collect();
                all.reverse();
                all.truncate(limit);
                all
            }
        };

        Ok(result)
    }

    async fn add_candles(&self, candles: &[Candle]) -> StorageResult<()> {
        let mut series = self.series.write();
        for candle in candles {
            series.entry(candle.trading_pair()).or_default().insert(
                (candle.timestamp.timestamp(), candle.interval.to_seconds()),
                candle.clone(),
            );
        }
        Ok(())
    }

    async fn migrate(&self) -> StorageResult<()> {
        Ok(())
    }
}
