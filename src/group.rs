//! # Groups
//!
//! A [`Group`] is a named cache namespace: one byte-budgeted LRU store, one
//! loader, one call coalescer and an optional peer picker.
//!
//! ## Get Path
//!
//! ```text
//!   get(key)
//!     │
//!     ├─ key empty ───────────────────────────────► Err(InvalidArgument)
//!     │
//!     ├─ main cache hit ──────────────────────────► Ok(value)
//!     │
//!     └─ miss ─► CallCoalescer::call(key, ...)       (one execution per key)
//!                  │
//!                  ├─ peer picked, peer Ok ───────► Ok(value)   not cached here
//!                  │
//!                  ├─ peer picked, peer Err ──┐     warn!, fall through
//!                  │                          ▼
//!                  └─ no peer ──────────► loader.get(key)
//!                                            ├─ Ok  ─► main cache add ─► Ok(value)
//!                                            └─ Err ──────────────────► Err(Load)
//! ```
//!
//! Only values produced by this node's own loader are written to the main
//! cache; a peer's answer is left to the peer that owns the key.
//!
//! ## Locking
//!
//! The store lock is held only for the O(1) lookup or insert. The loader and
//! peer calls run outside every lock, inside the coalescer's executor.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::error::GroupError;
use crate::flight::CallCoalescer;
use crate::loader::Loader;
#[cfg(feature = "metrics")]
use crate::metrics::{
    GroupMetrics, GroupMetricsRecorder, GroupMetricsSnapshot, MetricsSnapshotProvider,
};
use crate::peers::{PeerGetter, PeerPicker};
use crate::store::{ConcurrentEvictionStore, EvictionStore, StoreMetrics};
use crate::value::ValueView;

macro_rules! record {
    ($group:expr, $event:ident) => {
        #[cfg(feature = "metrics")]
        $group.metrics.$event();
    };
}

/// A cache namespace with its own loader, byte budget and peer view.
///
/// # Example
///
/// ```
/// use peercache::{Group, LoaderFn};
///
/// let group = Group::new(
///     "scores",
///     2 << 10,
///     LoaderFn::new(|key: &str| Ok(format!("score of {key}").into_bytes())),
/// );
///
/// let value = group.get("Tom").unwrap();
/// assert_eq!(value.as_text(), "score of Tom");
/// assert!(group.peek("Tom").is_some());
/// ```
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentEvictionStore<ValueView>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flights: CallCoalescer<ValueView, GroupError>,
    #[cfg(feature = "metrics")]
    metrics: GroupMetrics,
}

impl Group {
    /// Creates a standalone group with a `cache_bytes` budget (0 = unbounded).
    ///
    /// Use [`GroupRegistry`](crate::GroupRegistry) to make it discoverable by
    /// name.
    pub fn new(name: impl Into<String>, cache_bytes: u64, loader: impl Loader + 'static) -> Self {
        Self::from_parts(
            name.into(),
            Arc::new(loader),
            EvictionStore::new(cache_bytes),
            None,
        )
    }

    pub(crate) fn from_parts(
        name: String,
        loader: Arc<dyn Loader>,
        store: EvictionStore<ValueView>,
        peers: Option<Arc<dyn PeerPicker>>,
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(peers) = peers {
            let _ = cell.set(peers);
        }
        Self {
            name,
            loader,
            main_cache: ConcurrentEvictionStore::from_store(store),
            peers: cell,
            flights: CallCoalescer::new(),
            #[cfg(feature = "metrics")]
            metrics: GroupMetrics::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value for `key`, loading it on a miss.
    ///
    /// Concurrent misses for the same key share one load. Loader errors are
    /// returned to every caller that shared the load; peer errors are logged
    /// and answered by the local loader.
    pub fn get(&self, key: &str) -> Result<ValueView, GroupError> {
        record!(self, record_get);
        check_key(key)?;

        if let Some(value) = self.main_cache.get(key) {
            record!(self, record_cache_hit);
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }
        self.load(key)
    }

    /// Loads `key` from this node's loader and caches it, bypassing the
    /// cache lookup, peers and coalescing.
    ///
    /// Every call runs the loader. To answer a peer's request for a key this
    /// node owns, use [`get`](Self::get): the picker selects no peer for
    /// owned keys, so `get` serves from the cache, promotes the entry and
    /// shares one load between concurrent requests.
    pub fn get_locally(&self, key: &str) -> Result<ValueView, GroupError> {
        check_key(key)?;
        record!(self, record_local_load);

        let bytes = self.loader.get(key).map_err(|err| {
            record!(self, record_local_load_error);
            GroupError::load(err)
        })?;
        let value = ValueView::from(bytes);
        self.main_cache.add(key, value.clone());
        Ok(value)
    }

    /// Attaches the peer picker. A group accepts exactly one picker; a second
    /// call returns [`GroupError::PeersAlreadyRegistered`], a wiring bug the
    /// host should treat as fatal.
    pub fn register_peers(&self, peers: impl PeerPicker + 'static) -> Result<(), GroupError> {
        self.peers
            .set(Arc::new(peers))
            .map_err(|_| GroupError::PeersAlreadyRegistered {
                group: self.name.clone(),
            })?;
        debug!(group = %self.name, "registered peer picker");
        Ok(())
    }

    pub fn has_peers(&self) -> bool {
        self.peers.get().is_some()
    }

    /// Inspects the main cache without loading or promoting.
    pub fn peek(&self, key: &str) -> Option<ValueView> {
        self.main_cache.peek(key)
    }

    /// Number of entries in the main cache.
    pub fn cached_len(&self) -> usize {
        self.main_cache.len()
    }

    /// Bytes charged against the main cache budget.
    pub fn cached_bytes(&self) -> u64 {
        self.main_cache.bytes()
    }

    pub fn cache_metrics(&self) -> StoreMetrics {
        self.main_cache.metrics()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> GroupMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn load(&self, key: &str) -> Result<ValueView, GroupError> {
        let (result, shared) = self.flights.call_shared(key, || {
            record!(self, record_load);
            self.resolve_miss(key)
        });
        if shared {
            record!(self, record_load_deduped);
            debug!(group = %self.name, key, "served by in-flight load");
        }
        result
    }

    fn resolve_miss(&self, key: &str) -> Result<ValueView, GroupError> {
        if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key) {
                Ok(value) => {
                    record!(self, record_peer_load);
                    return Ok(value);
                },
                Err(err) => {
                    record!(self, record_peer_error);
                    warn!(
                        group = %self.name,
                        key,
                        error = %err,
                        "peer fetch failed, loading locally"
                    );
                },
            }
        }
        self.get_locally(key)
    }

    fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ValueView, GroupError> {
        peer.get(&self.name, key)
            .map(ValueView::from)
            .map_err(|err| GroupError::peer(&self.name, err))
    }
}

fn check_key(key: &str) -> Result<(), GroupError> {
    if key.is_empty() {
        return Err(GroupError::InvalidArgument("key is required".to_string()));
    }
    Ok(())
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.has_peers())
            .finish_non_exhaustive()
    }
}
