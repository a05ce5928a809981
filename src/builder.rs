//! Group configuration.
//!
//! [`GroupBuilder`] collects everything a [`Group`] needs and validates it in
//! one place, so a forgotten loader surfaces as a [`ConfigError`] instead of
//! a crash at first use.
//!
//! ## Example
//!
//! ```rust
//! use peercache::{GroupBuilder, GroupRegistry};
//!
//! let registry = GroupRegistry::new();
//! let group = GroupBuilder::new("scores")
//!     .cache_bytes(64 << 20)
//!     .loader_fn(|key| Ok(key.as_bytes().to_vec()))
//!     .register(&registry)
//!     .unwrap();
//!
//! assert_eq!(group.get("Tom").unwrap().as_text(), "Tom");
//! assert!(registry.lookup("scores").is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, ConfigError};
use crate::group::Group;
use crate::loader::{Loader, LoaderFn};
use crate::peers::PeerPicker;
use crate::registry::GroupRegistry;
use crate::store::{EvictionCallback, EvictionStore};
use crate::value::ValueView;

/// Builder for [`Group`].
pub struct GroupBuilder {
    name: String,
    cache_bytes: u64,
    loader: Option<Arc<dyn Loader>>,
    peers: Option<Arc<dyn PeerPicker>>,
    on_evicted: Option<EvictionCallback<ValueView>>,
}

impl GroupBuilder {
    /// Starts a group named `name` with an unbounded cache and no loader.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_bytes: 0,
            loader: None,
            peers: None,
            on_evicted: None,
        }
    }

    /// Byte budget of the main cache. Zero disables eviction.
    pub fn cache_bytes(mut self, cache_bytes: u64) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Uses a closure as the loader (see [`LoaderFn`]).
    pub fn loader_fn<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.loader(LoaderFn::new(f))
    }

    /// Attaches the peer picker up front. [`Group::register_peers`] will then
    /// report the group as already wired.
    pub fn peers(mut self, peers: impl PeerPicker + 'static) -> Self {
        self.peers = Some(Arc::new(peers));
        self
    }

    /// Observes entries evicted from the main cache. The callback runs under
    /// the cache lock and must not call back into the group.
    pub fn on_evicted<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str, &ValueView) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Box::new(f));
        self
    }

    pub fn try_build(self) -> Result<Group, ConfigError> {
        let Some(loader) = self.loader else {
            return Err(ConfigError::new(format!(
                "group {:?}: a loader is required",
                self.name
            )));
        };
        let store = match self.on_evicted {
            Some(on_evicted) => {
                EvictionStore::with_eviction_callback(self.cache_bytes, on_evicted)
            },
            None => EvictionStore::new(self.cache_bytes),
        };
        Ok(Group::from_parts(self.name, loader, store, self.peers))
    }

    /// Builds the group and registers it, replacing any group of the same
    /// name.
    pub fn register(self, registry: &GroupRegistry) -> Result<Arc<Group>, ConfigError> {
        let group = self.try_build()?;
        Ok(registry.register(group))
    }
}

impl fmt::Debug for GroupBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("name", &self.name)
            .field("cache_bytes", &self.cache_bytes)
            .field("has_loader", &self.loader.is_some())
            .field("has_peers", &self.peers.is_some())
            .finish_non_exhaustive()
    }
}
