//! Store counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exact totals, no ordering guarantees between counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of an entity store
#[derive(Debug, Default)]
pub struct StoreMetrics {
    inserts: AtomicU64,
    updates: AtomicU64,
    transitions: AtomicU64,
    schema_rejections: AtomicU64,
    uniqueness_rejections: AtomicU64,
    lifecycle_rejections: AtomicU64,
    other_rejections: AtomicU64,
    dangling_references: AtomicU64,
    snapshots_saved: AtomicU64,
    snapshots_loaded: AtomicU64,
}

/// Which check refused a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Schema,
    Uniqueness,
    Lifecycle,
    Other,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_inserts(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transitions(&self) {
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a refused write
    pub fn increment_rejections(&self, kind: RejectionKind) {
        let counter = match kind {
            RejectionKind::Schema => &self.schema_rejections,
            RejectionKind::Uniqueness => &self.uniqueness_rejections,
            RejectionKind::Lifecycle => &self.lifecycle_rejections,
            RejectionKind::Other => &self.other_rejections,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_dangling_references(&self, count: u64) {
        self.dangling_references.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_snapshots_saved(&self) {
        self.snapshots_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshots_loaded(&self) {
        self.snapshots_loaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            schema_rejections: self.schema_rejections.load(Ordering::Relaxed),
            uniqueness_rejections: self.uniqueness_rejections.load(Ordering::Relaxed),
            lifecycle_rejections: self.lifecycle_rejections.load(Ordering::Relaxed),
            other_rejections: self.other_rejections.load(Ordering::Relaxed),
            dangling_references: self.dangling_references.load(Ordering::Relaxed),
            snapshots_saved: self.snapshots_saved.load(Ordering::Relaxed),
            snapshots_loaded: self.snapshots_loaded.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub inserts: u64,
    pub updates: u64,
    pub transitions: u64,
    pub schema_rejections: u64,
    pub uniqueness_rejections: u64,
    pub lifecycle_rejections: u64,
    pub other_rejections: u64,
    pub dangling_references: u64,
    pub snapshots_saved: u64,
    pub snapshots_loaded: u64,
}

impl MetricsSnapshot {
    /// Total refused writes of any kind
    pub fn rejections(&self) -> u64 {
        self.schema_rejections
            + self.uniqueness_rejections
            + self.lifecycle_rejections
            + self.other_rejections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(StoreMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_rejections_by_kind() {
        let metrics = StoreMetrics::new();
        metrics.increment_rejections(RejectionKind::Uniqueness);
        metrics.increment_rejections(RejectionKind::Uniqueness);
        metrics.increment_rejections(RejectionKind::Lifecycle);

        let snap = metrics.snapshot();
        assert_eq!(snap.uniqueness_rejections, 2);
        assert_eq!(snap.lifecycle_rejections, 1);
        assert_eq!(snap.rejections(), 3);
    }

    #[test]
    fn test_concurrent_increments_are_exact() {
        let metrics = Arc::new(StoreMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..250 {
                        metrics.increment_inserts();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().inserts, 1000);
    }
}
