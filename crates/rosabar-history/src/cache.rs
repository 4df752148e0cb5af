//! Bounded caches owned by an update run.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use rosabar_codec::HistoryStart;
use rosabar_types::Timeframe;
use tracing::debug;

/// Default number of entries a cache holds before evicting.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// An insertion-ordered map with a fixed capacity.
///
/// Once an insert pushes the cache past its capacity, the oldest half of the
/// entries is evicted.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// Creates an empty cache holding up to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached value for a key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns true if the key is cached.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts a value, returning the previous value of the key.
    ///
    /// Replacing a value keeps the key's original insertion position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.map.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        if self.map.len() > self.capacity {
            self.evict_oldest_half();
        }
        None
    }

    /// Returns the cached value or inserts the one produced by `f`.
    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> &V {
        if !self.map.contains_key(&key) {
            self.insert(key.clone(), f());
        }
        // an insert never evicts the entry it just added
        &self.map[&key]
    }

    fn evict_oldest_half(&mut self) {
        let count = self.order.len() / 2;
        for key in self.order.drain(..count) {
            self.map.remove(&key);
        }
        debug!(evicted = count, remaining = self.map.len(), "cache eviction");
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

impl<K: Eq + Hash + Clone, V> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// History starts per symbol, as fetched from the vendor.
///
/// History starts only ever move into the past, so entries are never
/// invalidated. Symbol keys are upper-case.
#[derive(Debug, Default, Clone)]
pub struct HistoryStartCache {
    inner: BoundedCache<String, Vec<HistoryStart>>,
}

impl HistoryStartCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached history starts of a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&[HistoryStart]> {
        self.inner.get(&symbol.to_uppercase()).map(Vec::as_slice)
    }

    /// Caches the history starts of a symbol.
    pub fn insert(&mut self, symbol: &str, starts: Vec<HistoryStart>) {
        self.inner.insert(symbol.to_uppercase(), starts);
    }

    /// Returns the cached M1 history start of a symbol in FXT seconds.
    #[must_use]
    pub fn m1_start(&self, symbol: &str) -> Option<i64> {
        self.get(symbol)?
            .iter()
            .find(|s| s.timeframe == Timeframe::Minute1)
            .map(HistoryStart::start_seconds)
    }

    /// Returns the number of cached symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no symbol is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
