//! Trading pair statistics aggregation engine
//!
//! Periodically enumerates every trading pair in the time-series store,
//! fetches its first and last daily candle in paced stacks and publishes
//! the result as one consistent snapshot.

pub mod batch;
pub mod config;
pub mod fetcher;
pub mod progress;
pub mod puller;
pub mod retry;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod test_support;

pub use batch::{BatchScheduler, Pacing};
pub use config::StatsServiceConfig;
pub use fetcher::{PairStatFetcher, STATS_GROUP_INTERVAL};
pub use progress::{PassProgress, ProgressSnapshot};
pub use puller::RetryingPuller;
pub use retry::RetryPolicy;
pub use service::{ServiceState, StatsService};
pub use snapshot::{read_cache_file, Snapshot, SnapshotError, SnapshotOrigin, SnapshotStore};
