//! Remote resolution capabilities.
//!
//! A [`PeerPicker`] maps a key to the peer that owns it (typically through a
//! consistent-hash ring); the returned [`PeerGetter`] fetches the value from
//! that peer. Transport and ring live outside this crate.
//!
//! ```text
//!   Group::get(key) miss
//!        │
//!        ▼
//!   PeerPicker::pick_peer(key) ── None ───────────────► Loader::get(key)
//!        │ Some(peer)                                        ▲
//!        ▼                                                   │
//!   PeerGetter::get(group, key) ── Err (logged) ─────────────┘
//!        │ Ok(bytes)
//!        ▼
//!   returned to caller, not cached locally
//! ```

use std::sync::Arc;

use crate::error::BoxError;

/// Selects the peer that owns `key`.
pub trait PeerPicker: Send + Sync {
    /// Returns `None` when the key should be resolved locally (including
    /// when this node is the owner).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value for `(group, key)` from one remote peer.
pub trait PeerGetter: Send + Sync {
    fn get(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError>;
}

impl<P: PeerPicker + ?Sized> PeerPicker for Arc<P> {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        (**self).pick_peer(key)
    }
}

/// Picker that never selects a peer; every key resolves locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeers;

impl PeerPicker for NoPeers {
    fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
        None
    }
}
