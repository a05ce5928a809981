//! # Byte-Budgeted LRU Eviction Store
//!
//! String-keyed store that charges every entry `key.len() + value.byte_len()`
//! bytes against a fixed budget and evicts least recently used entries until
//! the budget holds again.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                       EvictionStore<V>                           │
//!   │                                                                  │
//!   │   index: FxHashMap<String, NodeId>                               │
//!   │   ┌─────────┬──────────┐                                         │
//!   │   │  "a"    │  id_2  ──┼──────────────────────┐                  │
//!   │   │  "b"    │  id_0  ──┼──────┐               │                  │
//!   │   └─────────┴──────────┘      ▼               ▼                  │
//!   │   order: RecencyList<Entry<V>>                                   │
//!   │     front ──► [id_0: b] ◄──► [id_2: a] ◄── back                  │
//!   │               (MRU)          (LRU, evicted first)                │
//!   │                                                                  │
//!   │   bytes = Σ key.len() + value.byte_len()      max_bytes (0 = ∞)  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Add Flow
//!
//! ```text
//!   add(k, v)
//!     ├─ k resident:  bytes += new_len - old_len, replace, move to front
//!     └─ k new:       bytes += k.len() + new_len, push front
//!   then, while max_bytes > 0 && bytes > max_bytes: remove_oldest()
//! ```
//!
//! An entry larger than the whole budget is linked and then evicted by the
//! same loop, together with everything older than it, so oversized values
//! never stay resident.
//!
//! ## Concurrency
//!
//! `EvictionStore` needs `&mut self` for `get` because a hit reorders the
//! list. [`ConcurrentEvictionStore`] serializes access with a
//! `parking_lot::RwLock`; only `peek`-style reads share the lock.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::recency_list::{NodeId, RecencyList};
use crate::store::traits::{ByteLen, StoreCounters, StoreMetrics};

/// Callback invoked with each evicted entry.
///
/// Runs while the store is mutably borrowed (and, for the concurrent store,
/// while its lock is held); it must not call back into the same store.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send + Sync>;

struct Entry<V> {
    key: String,
    value: V,
}

impl<V: ByteLen> Entry<V> {
    fn charge(&self) -> u64 {
        (self.key.len() + self.value.byte_len()) as u64
    }
}

/// Single-threaded LRU store bounded by total bytes.
///
/// # Example
///
/// ```
/// use peercache::store::EvictionStore;
///
/// let mut store: EvictionStore<String> = EvictionStore::new(10);
/// store.add("a", "12345".to_string());
/// store.add("b", "12345".to_string());
///
/// // 12 bytes would exceed the budget, so "a" went first.
/// assert!(store.get("a").is_none());
/// assert!(store.get("b").is_some());
/// assert_eq!(store.bytes(), 6);
/// ```
pub struct EvictionStore<V> {
    index: FxHashMap<String, NodeId>,
    order: RecencyList<Entry<V>>,
    max_bytes: u64,
    bytes: u64,
    on_evicted: Option<EvictionCallback<V>>,
    counters: StoreCounters,
}

impl<V: ByteLen> EvictionStore<V> {
    /// Creates a store with a `max_bytes` budget. Zero disables eviction.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            index: FxHashMap::default(),
            order: RecencyList::new(),
            max_bytes,
            bytes: 0,
            on_evicted: None,
            counters: StoreCounters::default(),
        }
    }

    /// Creates a store that reports every eviction to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: u64, on_evicted: EvictionCallback<V>) -> Self {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(on_evicted);
        store
    }

    /// Looks up `key` and promotes it to most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            self.counters.inc_miss();
            return None;
        };
        self.counters.inc_hit();
        self.order.move_to_front(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without touching recency order or hit counters.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or replaces `key`, then evicts until the byte budget holds.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let resident = self.index.get(&key).copied();
        match resident {
            Some(id) => {
                if let Some(entry) = self.order.get_mut(id) {
                    let old_len = entry.value.byte_len() as u64;
                    self.bytes = self.bytes - old_len + value.byte_len() as u64;
                    entry.value = value;
                }
                self.order.move_to_front(id);
                self.counters.inc_update();
            },
            None => {
                let entry = Entry {
                    key: key.clone(),
                    value,
                };
                self.bytes += entry.charge();
                let id = self.order.push_front(entry);
                self.index.insert(key, id);
                self.counters.inc_insert();
            },
        }

        while self.max_bytes != 0 && self.bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }

        debug_assert!(self.max_bytes == 0 || self.bytes <= self.max_bytes);
    }

    /// Evicts the least recently used entry, firing the eviction callback.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        let charge = entry.charge();
        self.bytes -= charge;
        self.counters.inc_eviction();
        trace!(key = %entry.key, bytes = charge, "evicted cache entry");

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&entry.key, &entry.value);
        }
        Some((entry.key, entry.value))
    }

    /// Removes `key` without reporting it as an eviction.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.order.remove(id)?;
        self.bytes -= entry.charge();
        Some(entry.value)
    }

    /// Drops every entry without reporting evictions.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        self.bytes = 0;
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Resident keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|entry| entry.key.as_str())
    }

    pub fn metrics(&self) -> StoreMetrics {
        self.counters.snapshot(self.len(), self.bytes, self.max_bytes)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.order.debug_validate_invariants();
        assert_eq!(self.index.len(), self.order.len());

        let mut total = 0u64;
        for entry in self.order.iter() {
            let id = self.index.get(&entry.key).expect("linked entry missing from index");
            assert_eq!(self.order.get(*id).map(|e| e.key.as_str()), Some(entry.key.as_str()));
            total += entry.charge();
        }
        assert_eq!(total, self.bytes, "byte accounting drifted");
        if self.max_bytes != 0 {
            assert!(self.bytes <= self.max_bytes, "byte budget exceeded");
        }
    }
}

impl<V> fmt::Debug for EvictionStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionStore")
            .field("len", &self.index.len())
            .field("bytes", &self.bytes)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

/// Thread-safe [`EvictionStore`] guarded by a `parking_lot::RwLock`.
///
/// Values are returned by clone, so `V` is expected to be cheap to clone
/// (e.g. [`ValueView`](crate::ValueView)).
pub struct ConcurrentEvictionStore<V> {
    inner: RwLock<EvictionStore<V>>,
}

impl<V> ConcurrentEvictionStore<V>
where
    V: ByteLen + Clone,
{
    pub fn new(max_bytes: u64) -> Self {
        Self::from_store(EvictionStore::new(max_bytes))
    }

    pub fn from_store(store: EvictionStore<V>) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    /// Looks up `key` and promotes it. Takes the write lock.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut store = self.inner.write();
        store.get(key).cloned()
    }

    /// Looks up `key` without reordering. Takes the read lock.
    pub fn peek(&self, key: &str) -> Option<V> {
        let store = self.inner.read();
        store.peek(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        let store = self.inner.read();
        store.contains(key)
    }

    pub fn add(&self, key: impl Into<String>, value: V) {
        let mut store = self.inner.write();
        store.add(key, value);
    }

    pub fn remove_oldest(&self) -> Option<(String, V)> {
        let mut store = self.inner.write();
        store.remove_oldest()
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let mut store = self.inner.write();
        store.remove(key)
    }

    pub fn clear(&self) {
        let mut store = self.inner.write();
        store.clear();
    }

    pub fn len(&self) -> usize {
        let store = self.inner.read();
        store.len()
    }

    pub fn is_empty(&self) -> bool {
        let store = self.inner.read();
        store.is_empty()
    }

    pub fn bytes(&self) -> u64 {
        let store = self.inner.read();
        store.bytes()
    }

    pub fn max_bytes(&self) -> u64 {
        let store = self.inner.read();
        store.max_bytes()
    }

    pub fn metrics(&self) -> StoreMetrics {
        let store = self.inner.read();
        store.metrics()
    }
}

impl<V> fmt::Debug for ConcurrentEvictionStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.read();
        f.debug_struct("ConcurrentEvictionStore")
            .field("len", &store.index.len())
            .field("bytes", &store.bytes)
            .field("max_bytes", &store.max_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn store(max_bytes: u64) -> EvictionStore<String> {
        EvictionStore::new(max_bytes)
    }

    fn keys(store: &EvictionStore<String>) -> Vec<&str> {
        store.keys().collect()
    }

    #[test]
    fn get_hit_and_miss() {
        let mut store = store(0);
        store.add("key1", "1234".to_string());
        assert_eq!(store.get("key1").map(String::as_str), Some("1234"));
        assert!(store.get("key2").is_none());

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.inserts, 1);
    }

    #[test]
    fn budget_of_ten_evicts_first_entry() {
        let mut store = store(10);
        store.add("a", "12345".to_string());
        assert_eq!(store.bytes(), 6);
        store.add("b", "12345".to_string());

        assert!(store.get("a").is_none());
        assert!(store.get("b").is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.bytes(), 6);
    }

    #[test]
    fn remove_oldest_follows_recency() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = (k1.len() + k2.len() + v1.len() + v2.len()) as u64;

        let mut store = store(cap);
        store.add(k1, v1.to_string());
        store.add(k2, v2.to_string());
        store.add(k3, v3.to_string());

        assert!(store.get(k1).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn get_protects_entry_from_next_eviction() {
        let mut store = store(6);
        store.add("a", "1".to_string());
        store.add("b", "2".to_string());
        store.add("c", "3".to_string());
        assert_eq!(keys(&store), vec!["c", "b", "a"]);

        assert!(store.get("a").is_some());
        store.add("d", "4".to_string());

        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert_eq!(keys(&store), vec!["d", "a", "c"]);
    }

    #[test]
    fn update_adjusts_bytes_and_promotes() {
        let mut store = store(0);
        store.add("a", "xx".to_string());
        store.add("b", "yy".to_string());
        assert_eq!(store.bytes(), 6);

        store.add("a", "xxxxx".to_string());
        assert_eq!(store.bytes(), 9);
        assert_eq!(store.len(), 2);
        assert_eq!(keys(&store), vec!["a", "b"]);
        assert_eq!(store.metrics().updates, 1);
    }

    #[test]
    fn growing_update_evicts_older_entries() {
        let mut store = store(8);
        store.add("a", "1".to_string());
        store.add("b", "1".to_string());
        store.add("c", "1".to_string());
        store.add("c", "12345".to_string());

        assert_eq!(keys(&store), vec!["c", "b"]);
        assert_eq!(store.bytes(), 8);
    }

    #[test]
    fn oversized_entry_is_not_retained() {
        let mut store = store(10);
        store.add("a", "1".to_string());
        store.add("big", "0123456789".to_string());

        assert!(store.is_empty());
        assert_eq!(store.bytes(), 0);
        assert_eq!(store.metrics().evictions, 2);
    }

    #[test]
    fn zero_budget_never_evicts() {
        let mut store = store(0);
        for i in 0..1000 {
            store.add(format!("key{i}"), "x".repeat(100));
        }
        assert_eq!(store.len(), 1000);
        assert_eq!(store.metrics().evictions, 0);
    }

    #[test]
    fn eviction_callback_sees_evicted_keys() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut store: EvictionStore<String> = EvictionStore::with_eviction_callback(
            10,
            Box::new(move |key, _value| sink.lock().unwrap().push(key.to_string())),
        );
        store.add("key1", "123456".to_string());
        store.add("k2", "k2".to_string());
        store.add("k3", "k3".to_string());
        store.add("k4", "k4".to_string());

        assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
    }

    #[test]
    fn remove_and_clear_are_not_evictions() {
        let mut store = store(0);
        store.add("a", "1".to_string());
        store.add("b", "2".to_string());
        assert_eq!(store.remove("a").as_deref(), Some("1"));
        assert_eq!(store.bytes(), 2);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.bytes(), 0);
        assert_eq!(store.metrics().evictions, 0);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut store = store(4);
        store.add("a", "1".to_string());
        store.add("b", "2".to_string());
        assert_eq!(store.peek("a").map(String::as_str), Some("1"));
        store.add("c", "3".to_string());
        assert!(!store.contains("a"));
    }

    #[test]
    fn concurrent_store_basic_ops() {
        let store: ConcurrentEvictionStore<String> = ConcurrentEvictionStore::new(10);
        store.add("a", "12345".to_string());
        assert_eq!(store.get("a").as_deref(), Some("12345"));
        assert_eq!(store.peek("a").as_deref(), Some("12345"));
        assert_eq!(store.bytes(), 6);
        store.add("b", "12345".to_string());
        assert!(!store.contains("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove_oldest().map(|(k, _)| k).as_deref(), Some("b"));
        assert!(store.is_empty());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8, usize),
        Get(u8),
        RemoveOldest,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..32, 0usize..40).prop_map(|(k, len)| Op::Add(k, len)),
            2 => (0u8..32).prop_map(Op::Get),
            1 => Just(Op::RemoveOldest),
        ]
    }

    proptest! {
        /// Resident bytes never exceed a non-zero budget.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_bytes_within_budget(
            max_bytes in 1u64..200,
            ops in prop::collection::vec(op_strategy(), 0..300)
        ) {
            let mut store: EvictionStore<Vec<u8>> = EvictionStore::new(max_bytes);
            for op in ops {
                match op {
                    Op::Add(k, len) => store.add(format!("k{k}"), vec![0u8; len]),
                    Op::Get(k) => { store.get(&format!("k{k}")); },
                    Op::RemoveOldest => { store.remove_oldest(); },
                }
                prop_assert!(store.bytes() <= max_bytes);
            }
        }

        /// Byte accounting always equals the sum over resident entries.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_accounting_matches_entries(
            max_bytes in 0u64..200,
            ops in prop::collection::vec(op_strategy(), 0..300)
        ) {
            let mut store: EvictionStore<Vec<u8>> = EvictionStore::new(max_bytes);
            for op in ops {
                match op {
                    Op::Add(k, len) => store.add(format!("k{k}"), vec![0u8; len]),
                    Op::Get(k) => { store.get(&format!("k{k}")); },
                    Op::RemoveOldest => { store.remove_oldest(); },
                }
                store.debug_validate_invariants();
            }
        }

        /// With room for exactly N equal entries, adding one more evicts the
        /// least recently used key and nothing else.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_evicts_exactly_lru(n in 1usize..20, touched in 0usize..20) {
            // keys "k00".."k19" and 5-byte values: 8 bytes each
            let mut store: EvictionStore<Vec<u8>> = EvictionStore::new((n * 8) as u64);
            for i in 0..n {
                store.add(format!("k{i:02}"), vec![0u8; 5]);
            }
            let touched = touched % n;
            store.get(&format!("k{touched:02}"));

            store.add("new", vec![0u8; 5]);
            let expected_victim = if n == 1 { touched } else if touched == 0 { 1 } else { 0 };

            let victim = format!("k{expected_victim:02}");
            let survivor = format!("k{touched:02}");
            prop_assert!(!store.contains(&victim));
            prop_assert_eq!(store.len(), n);
            if n > 1 {
                prop_assert!(store.contains(&survivor));
            }
        }
    }
}
