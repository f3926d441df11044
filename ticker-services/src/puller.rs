//! One full aggregation pass with bounded retry

use std::sync::Arc;
use ticker_core::{PairStatistic, StorageError, StorageResult, TimeSeriesStorage};
use tracing::info;

use crate::batch::{BatchScheduler, Pacing};
use crate::retry::RetryPolicy;

/// Enumerates pairs and fetches their statistics, retrying the whole pass
/// on transient storage failures
pub struct RetryingPuller {
    storage: Arc<dyn TimeSeriesStorage>,
    scheduler: BatchScheduler,
    policy: RetryPolicy,
}

impl RetryingPuller {
    pub fn new(
        storage: Arc<dyn TimeSeriesStorage>,
        scheduler: BatchScheduler,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            storage,
            scheduler,
            policy,
        }
    }

    /// Run one pass, restarting it from pair enumeration on every retry
    pub async fn pull(&self, pacing: Pacing) -> StorageResult<Vec<PairStatistic>> {
        self.policy
            .retry(|| self.pull_once(pacing), StorageError::is_transient)
            .await
    }

    async fn pull_once(&self, pacing: Pacing) -> StorageResult<Vec<PairStatistic>> {
        let pairs = self.storage.get_trading_pairs().await?;
        info!("Pulled {} trading pairs", pairs.len());

        let stats = self.scheduler.run(&pairs, pacing).await?;
        info!("Pulled {} stat records", stats.len());
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::PairStatFetcher;
    use crate::progress::PassProgress;
    use crate::test_support::{daily_candle, FlakyStorage};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use ticker_core::MemoryTimeSeries;
    use tokio::time::Instant;

    fn puller(storage: Arc<FlakyStorage>) -> RetryingPuller {
        let scheduler = BatchScheduler::new(
            PairStatFetcher::new(storage.clone()),
            10,
            Duration::from_secs(10),
            Arc::new(PassProgress::new()),
        );
        RetryingPuller::new(storage, scheduler, RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_enumeration_failure_is_retried() {
        let storage = Arc::new(FlakyStorage::new(MemoryTimeSeries::new()));
        storage
            .add_candles(&[daily_candle("A", "X", 1), daily_candle("A", "Y", 1)])
            .await
            .unwrap();
        storage.fail_pairs_with(StorageError::network("connection refused"), 2);

        let stats = puller(storage.clone()).pull(Pacing::Immediate).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(storage.pair_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_transient_fails_after_full_budget() {
        let storage = Arc::new(FlakyStorage::new(MemoryTimeSeries::new()));
        storage.add_candles(&[daily_candle("A", "X", 1)]).await.unwrap();
        storage.fail_queries_with(StorageError::network("timed out"));

        let started = Instant::now();
        let err = puller(storage).pull(Pacing::Immediate).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_data_error_fails_immediately() {
        let storage = Arc::new(FlakyStorage::new(MemoryTimeSeries::new()));
        storage.add_candles(&[daily_candle("A", "X", 1)]).await.unwrap();
        storage.fail_queries_with(StorageError::parse("unexpected column"));

        let started = Instant::now();
        let err = puller(storage.clone()).pull(Pacing::Immediate).await.unwrap_err();

        assert_eq!(err, StorageError::parse("unexpected column"));
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(storage.pair_calls.load(Ordering::SeqCst), 1);
    }
}
