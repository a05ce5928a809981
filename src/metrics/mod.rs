//! Group and store metrics (enabled by the `metrics` feature).

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::GroupMetrics;
pub use snapshot::GroupMetricsSnapshot;
pub use traits::{GroupMetricsRecorder, MetricsExporter, MetricsReset, MetricsSnapshotProvider};
