//! Pass progress counters
//!
//! Observability only: nothing in the engine's correctness depends on these.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time view of [`PassProgress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Pairs in the pass currently (or last) running
    pub total_pairs: usize,
    /// Pairs of that pass whose stack has completed
    pub processed_pairs: usize,
    /// Pacing delays taken by that pass
    pub pacing_delays: usize,
    pub completed_passes: u64,
    pub failed_passes: u64,
}

/// Atomic counters updated by the batch scheduler and the service loop
#[derive(Debug, Default)]
pub struct PassProgress {
    total_pairs: AtomicUsize,
    processed_pairs: AtomicUsize,
    pacing_delays: AtomicUsize,
    completed_passes: AtomicU64,
    failed_passes: AtomicU64,
}

impl PassProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-pass counters for a pass over `total` pairs
    pub fn begin(&self, total: usize) {
        self.total_pairs.store(total, Ordering::SeqCst);
        self.processed_pairs.store(0, Ordering::SeqCst);
        self.pacing_delays.store(0, Ordering::SeqCst);
    }

    /// Record a completed stack, returning the processed count so far
    pub fn advance(&self, pairs: usize) -> usize {
        self.processed_pairs.fetch_add(pairs, Ordering::SeqCst) + pairs
    }

    pub fn record_pacing_delay(&self) {
        self.pacing_delays.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self) {
        self.completed_passes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.failed_passes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_pairs: self.total_pairs.load(Ordering::SeqCst),
            processed_pairs: self.processed_pairs.load(Ordering::SeqCst),
            pacing_delays: self.pacing_delays.load(Ordering::SeqCst),
            completed_passes: self.completed_passes.load(Ordering::SeqCst),
            failed_passes: self.failed_passes.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resets_pass_counters_only() {
        let progress = PassProgress::new();
        progress.begin(5);
        assert_eq!(progress.advance(3), 3);
        assert_eq!(progress.advance(2), 5);
        progress.record_pacing_delay();
        progress.record_success();

        progress.begin(7);
        let snap = progress.snapshot();
        assert_eq!(snap.total_pairs, 7);
        assert_eq!(snap.processed_pairs, 0);
        assert_eq!(snap.pacing_delays, 0);
        assert_eq!(snap.completed_passes, 1);
        assert_eq!(snap.failed_passes, 0);
    }
}
