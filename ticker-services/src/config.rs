//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Configuration for the [`StatsService`](crate::StatsService)
#[derive(Debug, Clone)]
pub struct StatsServiceConfig {
    /// Snapshot cache file for fast warm start
    pub cache_file: Option<PathBuf>,
    /// Time between two scheduled passes
    pub update_interval: Duration,
    /// Number of pairs fetched concurrently in one stack
    pub stack_size: usize,
    /// Pause after each stack on periodic passes
    pub stack_interval: Duration,
    /// Retry policy applied to one whole pass
    pub retry: RetryPolicy,
}

impl Default for StatsServiceConfig {
    fn default() -> Self {
        Self {
            cache_file: None,
            update_interval: Duration::from_secs(60 * 60 * 24),
            stack_size: 10,
            stack_interval: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}
