/// Point-in-time copy of a group's request counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupMetricsSnapshot {
    pub gets: u64,
    pub cache_hits: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub local_loads: u64,
    pub local_load_errors: u64,
}

impl GroupMetricsSnapshot {
    /// Fraction of gets answered from the local store, or 0 with no traffic.
    pub fn hit_ratio(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.gets as f64
        }
    }
}
