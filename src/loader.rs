//! Data-loading capability consulted on a true cache miss.
//!
//! Anything that can turn a key into bytes implements [`Loader`]. Plain
//! closures are adapted with [`LoaderFn`], so a group can be wired up without
//! declaring a type:
//!
//! ```
//! use peercache::{Loader, LoaderFn};
//!
//! let loader = LoaderFn::new(|key: &str| Ok(key.to_uppercase().into_bytes()));
//! assert_eq!(loader.get("tom").unwrap(), b"TOM");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

/// Loads the authoritative bytes for a key.
///
/// Called outside of every cache lock, at most once per key at a time per
/// group. Errors are returned to callers unchanged; retries and deadlines
/// belong to the implementation.
pub trait Loader: Send + Sync {
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

/// Adapter turning a function into a [`Loader`].
#[derive(Clone)]
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (self.0)(key)
    }
}

impl<F> fmt::Debug for LoaderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoaderFn")
    }
}

impl<L: Loader + ?Sized> Loader for Arc<L> {
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (**self).get(key)
    }
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (**self).get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLoader(HashMap<&'static str, &'static str>);

    impl Loader for MapLoader {
        fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
            self.0
                .get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| format!("{key} not exist").into())
        }
    }

    #[test]
    fn loader_fn_calls_through() {
        let loader = LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec()));
        assert_eq!(loader.get("key").unwrap(), b"key");
    }

    #[test]
    fn shared_and_boxed_loaders() {
        let db = MapLoader(HashMap::from([("Tom", "630")]));
        let shared: Arc<dyn Loader> = Arc::new(db);
        assert_eq!(shared.get("Tom").unwrap(), b"630");

        let boxed: Box<dyn Loader> = Box::new(Arc::clone(&shared));
        assert_eq!(boxed.get("Sam").unwrap_err().to_string(), "Sam not exist");
    }
}
