use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::GroupMetricsSnapshot;
use crate::metrics::traits::{GroupMetricsRecorder, MetricsReset, MetricsSnapshotProvider};

/// Lock-free counters for one group.
#[derive(Debug, Default)]
pub struct GroupMetrics {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    loads: AtomicU64,
    loads_deduped: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_load_errors: AtomicU64,
}

#[inline]
fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl GroupMetricsRecorder for GroupMetrics {
    fn record_get(&self) {
        bump(&self.gets);
    }

    fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }

    fn record_load(&self) {
        bump(&self.loads);
    }

    fn record_load_deduped(&self) {
        bump(&self.loads_deduped);
    }

    fn record_peer_load(&self) {
        bump(&self.peer_loads);
    }

    fn record_peer_error(&self) {
        bump(&self.peer_errors);
    }

    fn record_local_load(&self) {
        bump(&self.local_loads);
    }

    fn record_local_load_error(&self) {
        bump(&self.local_load_errors);
    }
}

impl MetricsSnapshotProvider<GroupMetricsSnapshot> for GroupMetrics {
    fn snapshot(&self) -> GroupMetricsSnapshot {
        GroupMetricsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            loads_deduped: self.loads_deduped.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_load_errors: self.local_load_errors.load(Ordering::Relaxed),
        }
    }
}

impl MetricsReset for GroupMetrics {
    fn reset_metrics(&self) {
        for counter in [
            &self.gets,
            &self.cache_hits,
            &self.loads,
            &self.loads_deduped,
            &self.peer_loads,
            &self.peer_errors,
            &self.local_loads,
            &self.local_load_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_feed_snapshot() {
        let metrics = GroupMetrics::default();
        metrics.record_get();
        metrics.record_get();
        metrics.record_cache_hit();
        metrics.record_load();
        metrics.record_peer_error();
        metrics.record_local_load();

        let snap = metrics.snapshot();
        assert_eq!(snap.gets, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.loads, 1);
        assert_eq!(snap.peer_errors, 1);
        assert_eq!(snap.local_loads, 1);
        assert_eq!(snap.peer_loads, 0);
        assert!((snap.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let metrics = GroupMetrics::default();
        metrics.record_get();
        metrics.record_load_deduped();
        metrics.record_local_load_error();
        metrics.reset_metrics();
        assert_eq!(metrics.snapshot(), GroupMetricsSnapshot::default());
        assert_eq!(metrics.snapshot().hit_ratio(), 0.0);
    }
}
