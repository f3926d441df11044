//! Batch scheduler
//!
//! Splits the pair list into fixed-size stacks, fetches each stack
//! concurrently and optionally paces the store between stacks.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use ticker_core::{PairStatistic, StorageResult, TradingPair};
use tracing::{debug, info};

use crate::fetcher::PairStatFetcher;
use crate::progress::PassProgress;

/// Whether a pass sleeps between stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// No pause; used for the startup pass to get ready quickly
    Immediate,
    /// Sleep `stack_interval` after every stack
    Throttled,
}

/// Drives [`PairStatFetcher`] over all pairs with bounded concurrency
pub struct BatchScheduler {
    fetcher: PairStatFetcher,
    stack_size: usize,
    stack_interval: Duration,
    progress: Arc<PassProgress>,
}

impl BatchScheduler {
    pub fn new(
        fetcher: PairStatFetcher,
        stack_size: usize,
        stack_interval: Duration,
        progress: Arc<PassProgress>,
    ) -> Self {
        Self {
            fetcher,
            // chunks(0) panics
            stack_size: stack_size.max(1),
            stack_interval,
            progress,
        }
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Fetch statistics of every pair, dropping pairs without data.
    ///
    /// A stack fails as a unit: the first error of any member aborts the
    /// whole run and nothing gathered so far is returned.
    pub async fn run(
        &self,
        pairs: &[TradingPair],
        pacing: Pacing,
    ) -> StorageResult<Vec<PairStatistic>> {
        let total = pairs.len();
        self.progress.begin(total);

        let mut stats = Vec::with_capacity(total);
        for stack in pairs.chunks(self.stack_size) {
            let results = try_join_all(stack.iter().map(|pair| self.fetcher.fetch(pair))).await?;
            stats.extend(results.into_iter().flatten());

            let processed = self.progress.advance(stack.len());
            debug!("Processed {}/{} trading pairs", processed, total);

            if pacing == Pacing::Throttled {
                self.progress.record_pacing_delay();
                tokio::time::sleep(self.stack_interval).await;
            }
        }

        if total > 0 {
            info!("Processed {} trading pairs, {} with data", total, stats.len());
        }
        Ok(stats)
    }
}
