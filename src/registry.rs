//! Name → [`Group`] lookup owned by the host program.
//!
//! The registry is an ordinary value: create one at startup and pass it (or
//! an `Arc` of it) to whatever needs to resolve groups by name, such as the
//! server that answers peer requests.
//!
//! ```
//! use peercache::{GroupRegistry, LoaderFn};
//!
//! let registry = GroupRegistry::new();
//! registry.create("scores", 2 << 10, LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec())));
//!
//! let group = registry.lookup("scores").unwrap();
//! assert_eq!(group.name(), "scores");
//! assert!(registry.lookup("missing").is_none());
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::group::Group;
use crate::loader::Loader;

/// Thread-safe map of group name to group.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<FxHashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group with a fresh cache and coalescer and registers it.
    ///
    /// A group already registered under `name` is replaced; holders of the
    /// old `Arc<Group>` keep a working but unregistered group.
    pub fn create(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        loader: impl Loader + 'static,
    ) -> Arc<Group> {
        self.register(Group::new(name, cache_bytes, loader))
    }

    /// Registers an already built group under its own name (last writer
    /// wins).
    pub fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));
        if previous.is_some() {
            debug!(group = group.name(), "replaced registered group");
        } else {
            debug!(group = group.name(), "registered group");
        }
        group
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.groups.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.names())
            .finish()
    }
}
