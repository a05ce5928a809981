pub use crate::builder::GroupBuilder;
pub use crate::error::{BoxError, ConfigError, GroupError};
pub use crate::flight::CallCoalescer;
pub use crate::group::Group;
pub use crate::loader::{Loader, LoaderFn};
pub use crate::peers::{NoPeers, PeerGetter, PeerPicker};
pub use crate::registry::GroupRegistry;
pub use crate::store::{ByteLen, ConcurrentEvictionStore, EvictionStore, StoreMetrics};
pub use crate::value::ValueView;

#[cfg(feature = "metrics")]
pub use crate::metrics::{GroupMetricsSnapshot, MetricsExporter, PrometheusTextExporter};
