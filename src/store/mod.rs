//! Byte-budgeted storage for cached values.
//!
//! [`EvictionStore`] is the single-threaded core; [`ConcurrentEvictionStore`]
//! wraps it in a `parking_lot::RwLock` for use behind a [`Group`](crate::Group).

pub mod lru;
pub mod traits;

pub use lru::{ConcurrentEvictionStore, EvictionCallback, EvictionStore};
pub use traits::{ByteLen, StoreMetrics};
