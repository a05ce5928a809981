//! peercache: peer-aware in-process caching.
//!
//! A [`Group`] is a named cache namespace combining a byte-budgeted LRU
//! store, a [`Loader`] for the authoritative data, a [`CallCoalescer`] that
//! collapses concurrent misses into one load, and an optional
//! [`PeerPicker`] that lets the key's owner answer first.
//!
//! ```
//! use peercache::{GroupBuilder, GroupRegistry};
//!
//! let registry = GroupRegistry::new();
//! let scores = GroupBuilder::new("scores")
//!     .cache_bytes(2 << 10)
//!     .loader_fn(|key| match key {
//!         "Tom" => Ok(b"630".to_vec()),
//!         _ => Err(format!("{key} not exist").into()),
//!     })
//!     .register(&registry)
//!     .unwrap();
//!
//! assert_eq!(scores.get("Tom").unwrap().as_text(), "630");
//! assert!(scores.get("kkk").is_err());
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod flight;
pub mod group;
pub mod loader;
pub mod peers;
pub mod prelude;
pub mod registry;
pub mod store;
pub mod value;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use builder::GroupBuilder;
pub use error::{BoxError, ConfigError, GroupError, SharedError};
pub use flight::CallCoalescer;
pub use group::Group;
pub use loader::{Loader, LoaderFn};
pub use peers::{NoPeers, PeerGetter, PeerPicker};
pub use registry::GroupRegistry;
pub use value::ValueView;
