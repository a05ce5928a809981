use std::fmt::Write as _;
use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::GroupMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;
use crate::store::StoreMetrics;

/// Prometheus text exporter for group and store snapshots.
///
/// Writes the text exposition format, optionally tagging every sample with
/// fixed labels (typically `group="<name>"`).
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    labels: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            labels: String::new(),
            writer: Mutex::new(writer),
        }
    }

    /// Adds a label attached to every exported sample.
    pub fn with_label(mut self, name: &str, value: &str) -> Self {
        if !self.labels.is_empty() {
            self.labels.push(',');
        }
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        let _ = write!(self.labels, "{name}=\"{escaped}\"");
        self
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        if self.labels.is_empty() {
            let _ = writeln!(writer, "{name} {value}");
        } else {
            let _ = writeln!(writer, "{name}{{{}}} {value}", self.labels);
        }
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_sample("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_sample("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<GroupMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &GroupMetricsSnapshot) {
        self.write_counter("gets_total", snapshot.gets);
        self.write_counter("cache_hits_total", snapshot.cache_hits);
        self.write_counter("loads_total", snapshot.loads);
        self.write_counter("loads_deduped_total", snapshot.loads_deduped);
        self.write_counter("peer_loads_total", snapshot.peer_loads);
        self.write_counter("peer_errors_total", snapshot.peer_errors);
        self.write_counter("local_loads_total", snapshot.local_loads);
        self.write_counter("local_load_errors_total", snapshot.local_load_errors);
    }
}

impl<W: Write + Send> MetricsExporter<StoreMetrics> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &StoreMetrics) {
        self.write_counter("store_hits_total", snapshot.hits);
        self.write_counter("store_misses_total", snapshot.misses);
        self.write_counter("store_inserts_total", snapshot.inserts);
        self.write_counter("store_updates_total", snapshot.updates);
        self.write_counter("store_evictions_total", snapshot.evictions);
        self.write_gauge("store_entries", snapshot.entries as u64);
        self.write_gauge("store_bytes", snapshot.bytes);
        self.write_gauge("store_max_bytes", snapshot.max_bytes);
    }
}
