//! Snapshot store
//!
//! Holds the last published set of statistics behind a single pointer swap
//! and mirrors it to an optional JSON cache file.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use ticker_core::PairStatistic;
use tracing::{debug, info, warn};

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Loaded from the cache file at startup
    Cache,
    /// Produced by a completed pass
    Pass,
}

/// The statistics of one complete pass
#[derive(Debug, Clone)]
pub struct Snapshot {
    stats: Vec<PairStatistic>,
    published_at: DateTime<Utc>,
    origin: SnapshotOrigin,
}

impl Snapshot {
    pub fn stats(&self) -> &[PairStatistic] {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }
}

/// Cache file errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Single-writer, many-reader holder of the published snapshot
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    cache_file: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn new(cache_file: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(None),
            cache_file,
        }
    }

    /// Replace the visible snapshot in one swap
    pub fn publish(&self, stats: Vec<PairStatistic>) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot {
            stats,
            published_at: Utc::now(),
            origin: SnapshotOrigin::Pass,
        });
        *self.current.write() = Some(snapshot.clone());
        snapshot
    }

    /// The last published snapshot, `None` until ready
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Populate the store from the cache file.
    ///
    /// Never fails: a missing or unreadable file only costs the warm start.
    /// A snapshot already published by a pass is never overwritten.
    pub async fn load_from_disk(&self) -> bool {
        let Some(path) = self.cache_file.clone() else {
            return false;
        };

        if !path.exists() {
            info!("No stats cache at {}", path.display());
            return false;
        }

        let stats = match read_cache_file(&path).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Failed to load stats cache {}: {}", path.display(), e);
                return false;
            }
        };

        let count = stats.len();
        let mut current = self.current.write();
        if current.is_some() {
            debug!("Stats already published, ignoring cache");
            return false;
        }
        *current = Some(Arc::new(Snapshot {
            stats,
            published_at: Utc::now(),
            origin: SnapshotOrigin::Cache,
        }));
        info!("Loaded {} stat records from {}", count, path.display());
        true
    }

    /// Write the current snapshot to the cache file.
    ///
    /// Best-effort: failures are logged and reported as `false`.
    pub async fn persist_to_disk(&self) -> bool {
        let Some(path) = self.cache_file.clone() else {
            return false;
        };
        let Some(snapshot) = self.current() else {
            return false;
        };

        match write_cache_file(&path, snapshot).await {
            Ok(count) => {
                info!("Saved {} stat records to {}", count, path.display());
                true
            }
            Err(e) => {
                warn!("Failed to save stats cache {}: {}", path.display(), e);
                false
            }
        }
    }
}

/// Read and parse a cache file
pub async fn read_cache_file(path: &Path) -> Result<Vec<PairStatistic>, SnapshotError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Vec<PairStatistic>, SnapshotError> {
        let bytes = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    })
    .await?
}

/// Write a snapshot through a temporary sibling file and rename it into place
async fn write_cache_file(path: &Path, snapshot: Arc<Snapshot>) -> Result<usize, SnapshotError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<usize, SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let bytes = serde_json::to_vec_pretty(snapshot.stats())?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(snapshot.len())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::daily_candle;
    use ticker_core::TradingPair;

    fn stat(symbol: &str, first: i64, last: i64) -> PairStatistic {
        PairStatistic::new(
            TradingPair::new("A", symbol),
            daily_candle("A", symbol, first),
            daily_candle("A", symbol, last),
        )
    }

    #[test]
    fn test_not_ready_until_published() {
        let store = SnapshotStore::new(None);
        assert!(!store.is_ready());
        assert!(store.current().is_none());

        store.publish(Vec::new());
        assert!(store.is_ready());
        assert!(store.current().unwrap().is_empty());
    }

    #[test]
    fn test_publish_replaces_previous_snapshot() {
        let store = SnapshotStore::new(None);
        let old = store.publish(vec![stat("X", 1, 2)]);
        store.publish(vec![stat("Y", 1, 3), stat("Z", 2, 3)]);

        // readers holding the old snapshot keep it intact
        assert_eq!(old.stats(), &[stat("X", 1, 2)]);
        let current = store.current().unwrap();
        assert_eq!(current.len(), 2);
        assert_eq!(current.origin(), SnapshotOrigin::Pass);
    }

    #[tokio::test]
    async fn test_persist_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let stats = vec![stat("X", 1, 5), stat("Y", 2, 4)];

        let writer = SnapshotStore::new(Some(path.clone()));
        writer.publish(stats.clone());
        assert!(writer.persist_to_disk().await);
        assert!(!dir.path().join("stats.json.tmp").exists());

        let reader = SnapshotStore::new(Some(path));
        assert!(reader.load_from_disk().await);
        let loaded = reader.current().unwrap();
        assert_eq!(loaded.stats(), stats.as_slice());
        assert_eq!(loaded.origin(), SnapshotOrigin::Cache);
    }

    #[tokio::test]
    async fn test_missing_cache_file_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(Some(dir.path().join("absent.json")));

        assert!(!store.load_from_disk().await);
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn test_corrupt_cache_file_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, b"[{\"trading_pair\": ").unwrap();

        let err = read_cache_file(&path).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Serialization(_)));

        let store = SnapshotStore::new(Some(path));
        assert!(!store.load_from_disk().await);
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn test_cache_never_overrides_published_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let writer = SnapshotStore::new(Some(path.clone()));
        writer.publish(vec![stat("OLD", 1, 2)]);
        assert!(writer.persist_to_disk().await);

        let store = SnapshotStore::new(Some(path));
        store.publish(vec![stat("NEW", 1, 2)]);
        assert!(!store.load_from_disk().await);
        assert_eq!(store.current().unwrap().stats()[0].trading_pair.symbol, "NEW");
    }

    #[tokio::test]
    async fn test_persist_without_cache_file_is_noop() {
        let store = SnapshotStore::new(None);
        store.publish(vec![stat("X", 1, 2)]);
        assert!(!store.persist_to_disk().await);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let store = SnapshotStore::new(Some(path));
        store.publish(vec![stat("X", 1, 2)]);
        assert!(!store.persist_to_disk().await);
        assert!(store.is_ready());
    }
}
