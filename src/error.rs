//! Error types for peercache.
//!
//! ## Key Components
//!
//! - [`GroupError`]: Returned from [`Group`](crate::Group) operations. It is
//!   `Clone`, so a single outcome can be handed to every caller coalesced
//!   onto the same in-flight load.
//! - [`ConfigError`]: Returned when a group is built from incomplete
//!   configuration (e.g. no loader).
//!
//! ## Example Usage
//!
//! ```
//! use peercache::{GroupBuilder, GroupError};
//!
//! let group = GroupBuilder::new("scores")
//!     .loader_fn(|key| Ok(key.as_bytes().to_vec()))
//!     .try_build()
//!     .unwrap();
//!
//! let err = group.get("").unwrap_err();
//! assert!(matches!(err, GroupError::InvalidArgument(_)));
//! assert!(!err.is_fatal());
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error type returned by [`Loader`](crate::Loader) and
/// [`PeerGetter`](crate::PeerGetter) implementations.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shared, cloneable form of a [`BoxError`].
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// GroupError
// ---------------------------------------------------------------------------

/// Error returned by group lookups and wiring calls.
#[derive(Debug, Clone)]
pub enum GroupError {
    /// The request was malformed (e.g. an empty key). Never looked up.
    InvalidArgument(String),
    /// The group's loader failed. The cause is preserved as-is.
    Load(SharedError),
    /// A peer fetch failed. Logged and answered by the local loader instead;
    /// never returned from [`Group::get`](crate::Group::get).
    Peer { group: String, cause: SharedError },
    /// [`Group::register_peers`](crate::Group::register_peers) was called on a
    /// group that already has a peer picker. This is a wiring bug in the host.
    PeersAlreadyRegistered { group: String },
}

impl GroupError {
    pub(crate) fn load(cause: BoxError) -> Self {
        GroupError::Load(Arc::from(cause))
    }

    pub(crate) fn peer(group: &str, cause: BoxError) -> Self {
        GroupError::Peer {
            group: group.to_string(),
            cause: Arc::from(cause),
        }
    }

    /// Returns `true` for programmer errors the host should not retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GroupError::PeersAlreadyRegistered { .. })
    }
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            GroupError::Load(cause) => write!(f, "load failed: {cause}"),
            GroupError::Peer { group, cause } => {
                write!(f, "peer fetch for group {group:?} failed: {cause}")
            },
            GroupError::PeersAlreadyRegistered { group } => {
                write!(f, "peers already registered for group {group:?}")
            },
        }
    }
}

impl Error for GroupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GroupError::Load(cause) | GroupError::Peer { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when group configuration is incomplete or invalid.
///
/// Produced by [`GroupBuilder::try_build`](crate::GroupBuilder::try_build)
/// and [`GroupBuilder::register`](crate::GroupBuilder::register).
///
/// # Example
///
/// ```
/// use peercache::GroupBuilder;
///
/// let err = GroupBuilder::new("scores").try_build().unwrap_err();
/// assert!(err.to_string().contains("loader"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Backend;

    impl fmt::Display for Backend {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("backend unavailable")
        }
    }

    impl Error for Backend {}

    // -- GroupError -------------------------------------------------------

    #[test]
    fn load_error_preserves_cause() {
        let err = GroupError::load(Box::new(Backend));
        assert_eq!(err.to_string(), "load failed: backend unavailable");
        let source = err.source().expect("cause");
        assert!(source.downcast_ref::<Backend>().is_some());
    }

    #[test]
    fn clones_share_the_cause() {
        let err = GroupError::load("boom".into());
        let copy = err.clone();
        match (&err, &copy) {
            (GroupError::Load(a), GroupError::Load(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected load errors"),
        }
    }

    #[test]
    fn peer_error_names_group() {
        let err = GroupError::peer("scores", "timeout".into());
        assert!(err.to_string().contains("\"scores\""));
        assert!(err.source().is_some());
    }

    #[test]
    fn only_double_registration_is_fatal() {
        assert!(GroupError::PeersAlreadyRegistered {
            group: "g".into()
        }
        .is_fatal());
        assert!(!GroupError::InvalidArgument("key required".into()).is_fatal());
        assert!(!GroupError::load("x".into()).is_fatal());
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("loader is required");
        assert_eq!(err.to_string(), "loader is required");
        assert_eq!(err.message(), "loader is required");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync>() {}
        assert_error::<ConfigError>();
        assert_error::<GroupError>();
    }
}
