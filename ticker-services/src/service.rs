//! Stats Service
//!
//! Owns the aggregation loop: warm start from the cache file, one unpaced
//! startup pass, then one paced pass every `update_interval` until shutdown.

use std::sync::Arc;
use std::time::Duration;
use ticker_core::{StorageResult, TimeSeriesStorage};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::batch::{BatchScheduler, Pacing};
use crate::config::StatsServiceConfig;
use crate::fetcher::PairStatFetcher;
use crate::progress::{PassProgress, ProgressSnapshot};
use crate::puller::RetryingPuller;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Lifecycle of the aggregation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Starting,
    /// Serving a snapshot loaded from the cache file
    Warm,
    RunningPass,
    /// Waiting for the next scheduled pass
    Idle,
    Stopped,
}

/// Periodic statistics aggregation service
pub struct StatsService {
    puller: RetryingPuller,
    snapshots: Arc<SnapshotStore>,
    progress: Arc<PassProgress>,
    update_interval: Duration,
    state: watch::Sender<ServiceState>,
}

impl StatsService {
    pub fn new(storage: Arc<dyn TimeSeriesStorage>, config: StatsServiceConfig) -> Self {
        let progress = Arc::new(PassProgress::new());
        let scheduler = BatchScheduler::new(
            PairStatFetcher::new(storage.clone()),
            config.stack_size,
            config.stack_interval,
            progress.clone(),
        );

        Self {
            puller: RetryingPuller::new(storage, scheduler, config.retry),
            snapshots: Arc::new(SnapshotStore::new(config.cache_file)),
            progress,
            update_interval: config.update_interval,
            state: watch::Sender::new(ServiceState::Starting),
        }
    }

    /// Shared handle for readers of the published snapshot
    pub fn snapshots(&self) -> Arc<SnapshotStore> {
        self.snapshots.clone()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    /// Run one pass and publish its result.
    ///
    /// On failure the previously published snapshot stays in place.
    pub async fn run_pass(&self, pacing: Pacing) -> StorageResult<Arc<Snapshot>> {
        self.state.send_replace(ServiceState::RunningPass);
        let started = Instant::now();

        match self.puller.pull(pacing).await {
            Ok(stats) => {
                let snapshot = self.snapshots.publish(stats);
                self.progress.record_success();
                self.state.send_replace(ServiceState::Idle);
                info!(
                    "Published {} stat records in {:?}",
                    snapshot.len(),
                    started.elapsed()
                );
                self.snapshots.persist_to_disk().await;
                Ok(snapshot)
            }
            Err(e) => {
                self.progress.record_failure();
                self.state.send_replace(ServiceState::Idle);
                error!("Stats pass failed after {:?}: {}", started.elapsed(), e);
                Err(e)
            }
        }
    }

    /// Drive the aggregation loop until `shutdown` turns true.
    ///
    /// A failed pass never ends the loop. Shutdown interrupts a pending
    /// wait or an in-flight pass; an interrupted pass publishes nothing.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting stats service (update interval {:?})",
            self.update_interval
        );

        if self.snapshots.load_from_disk().await {
            self.state.send_replace(ServiceState::Warm);
        }

        tokio::select! {
            _ = self.run_pass(Pacing::Immediate) => {}
            _ = stopped(&mut shutdown) => {
                self.stop();
                return;
            }
        }

        // interval_at panics on a zero period
        let period = self.update_interval.max(Duration::from_millis(1));
        let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticks.tick() => {}
                _ = stopped(&mut shutdown) => break,
            }

            tokio::select! {
                _ = self.run_pass(Pacing::Throttled) => {}
                _ = stopped(&mut shutdown) => break,
            }
        }

        self.stop();
    }

    fn stop(&self) {
        self.state.send_replace(ServiceState::Stopped);
        info!("Stats service stopped");
    }
}

/// Resolves once shutdown is requested or its sender is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
