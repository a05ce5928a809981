//! Immutable byte payload handed out by the cache.
//!
//! A [`ValueView`] owns its bytes behind an `Arc<[u8]>`: cloning a view is a
//! reference-count bump, while every accessor that hands bytes to the caller
//! by value returns a fresh copy. The cached payload can therefore never be
//! mutated through a view.
//!
//! ## Example
//!
//! ```
//! use peercache::ValueView;
//!
//! let view = ValueView::copy_from_slice(b"hello");
//! let mut bytes = view.to_vec();
//! bytes[0] = b'j';
//!
//! assert_eq!(view.as_text(), "hello");
//! assert_eq!(view.len(), 5);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::store::ByteLen;

/// Read-only view over a cached byte payload.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ValueView {
    bytes: Arc<[u8]>,
}

impl ValueView {
    /// Creates a view holding a private copy of `bytes`.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    /// Returns the payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns an independent copy of the payload.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Alias of [`to_vec`](Self::to_vec).
    pub fn bytes(&self) -> Vec<u8> {
        self.to_vec()
    }

    /// Borrows the payload. The borrow is shared, so it cannot alter the
    /// cached copy.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reinterprets the payload as text. Invalid UTF-8 sequences are replaced
    /// rather than rejected.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<Vec<u8>> for ValueView {
    /// Takes ownership of `bytes`; the caller keeps no alias to the buffer.
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<&[u8]> for ValueView {
    fn from(bytes: &[u8]) -> Self {
        Self::copy_from_slice(bytes)
    }
}

impl From<&str> for ValueView {
    fn from(text: &str) -> Self {
        Self::copy_from_slice(text.as_bytes())
    }
}

impl From<String> for ValueView {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}

impl AsRef<[u8]> for ValueView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl ByteLen for ValueView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl fmt::Display for ValueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl fmt::Debug for ValueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueView")
            .field("len", &self.len())
            .field("text", &self.as_text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_vec_is_detached_from_view() {
        let view = ValueView::from("abc");
        let mut copy = view.to_vec();
        copy[0] = b'z';
        copy.push(b'!');
        assert_eq!(view.as_slice(), b"abc");
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn copy_from_slice_does_not_alias_source() {
        let mut source = vec![1u8, 2, 3];
        let view = ValueView::copy_from_slice(&source);
        source[0] = 9;
        assert_eq!(view.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn clones_share_the_payload() {
        let view = ValueView::from(vec![7u8; 16]);
        let other = view.clone();
        assert_eq!(view, other);
        assert_eq!(other.byte_len(), 16);
    }

    #[test]
    fn as_text_replaces_invalid_utf8() {
        let view = ValueView::from(vec![b'o', b'k', 0xff]);
        assert_eq!(view.as_text(), "ok\u{fffd}");
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn empty_view() {
        let view = ValueView::from(Vec::new());
        assert!(view.is_empty());
        assert_eq!(view.to_string(), "");
    }
}
