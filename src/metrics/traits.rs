//! # Metrics Traits
//!
//! Recording, snapshotting and export are separate concerns:
//!
//! ```text
//!   Group ──record_*──► GroupMetricsRecorder (atomic counters)
//!                              │
//!                              ▼ snapshot()
//!                     MetricsSnapshotProvider<S> ──► S ──► MetricsExporter<S>
//!                        (tests, benches)                  (monitoring)
//! ```
//!
//! Recorders take `&self` so they can be bumped from any thread without
//! holding a group-level lock.

/// Counters a [`Group`](crate::Group) bumps on its request path.
pub trait GroupMetricsRecorder {
    /// Every `get`, including rejected and cached ones.
    fn record_get(&self);
    fn record_cache_hit(&self);
    /// A miss that executed the load path (not served by another caller).
    fn record_load(&self);
    /// A miss that was answered by another caller's in-flight load.
    fn record_load_deduped(&self);
    fn record_peer_load(&self);
    fn record_peer_error(&self);
    fn record_local_load(&self);
    fn record_local_load_error(&self);
}

/// Produce a point-in-time copy of metrics.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Publish a snapshot to a monitoring system.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
