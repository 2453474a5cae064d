//! Cache Store Module
//!
//! Main cache engine combining a HashMap lookup with the ordered registry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::cache::{CacheEntry, CacheStats, Handle, OrderedRegistry};

// == Cache State ==
/// Lookup table, recency order and counters, always mutated together.
struct CacheState<K, V> {
    /// Key -> registry handle
    lookup: HashMap<K, Handle>,
    /// Entries ordered most to least recently used
    registry: OrderedRegistry<CacheEntry<K, V>>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Hash + Eq, V> CacheState<K, V> {
    fn new() -> Self {
        Self {
            lookup: HashMap::new(),
            registry: OrderedRegistry::new(),
            stats: CacheStats::new(),
        }
    }

    // == Evict Oldest ==
    /// Drops the back entry and its lookup slot.
    fn evict_oldest(&mut self) {
        if let Some(entry) = self.registry.pop_back() {
            self.lookup.remove(&entry.key);
            self.stats.record_eviction();
            trace!("Evicted least recently used entry, {} remain", self.registry.len());
        }
    }
}

// == LRU Cache ==
/// Fixed-capacity, thread-safe LRU cache.
///
/// All methods take `&self`; share it between threads by reference or in an
/// `Arc`. One lock guards the lookup table and the registry together, so
/// every call observes them in a consistent state.
pub struct LruCache<K, V> {
    /// Maximum number of entries, fixed at construction
    capacity: usize,
    state: RwLock<CacheState<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 is accepted: every `set` is discarded at once and
    /// nothing is ever retrievable.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("LRU cache created with capacity 0, every set will be discarded");
        } else {
            debug!("LRU cache created with capacity {}", capacity);
        }

        Self {
            capacity,
            state: RwLock::new(CacheState::new()),
        }
    }

    // == Set ==
    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// Returns `true` if the key already existed and its value was replaced,
    /// `false` if it was newly inserted. Inserting into a full cache evicts
    /// the least recently used entry first.
    pub fn set(&self, key: K, value: V) -> bool {
        let mut guard = self.state.write();
        let state = &mut *guard;

        if let Some(&handle) = state.lookup.get(&key) {
            state.registry.get_mut(handle).replace(value);
            state.registry.move_to_front(handle);
            state.stats.record_update();
            return true;
        }

        state.stats.record_insert();
        if self.capacity == 0 {
            state.stats.record_eviction();
            trace!("Discarded insert into zero-capacity cache");
            return false;
        }

        if state.registry.len() >= self.capacity {
            state.evict_oldest();
        }

        let handle = state.registry.push_front(CacheEntry::new(key.clone(), value));
        state.lookup.insert(key, handle);
        false
    }

    // == Get ==
    /// Returns a copy of the value under `key` and marks it most recently used.
    ///
    /// Takes the write lock: a lookup reorders the registry, so two
    /// concurrent `get` calls must not both hold the lock.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut guard = self.state.write();
        let state = &mut *guard;

        match state.lookup.get(key) {
            Some(&handle) => {
                state.registry.move_to_front(handle);
                state.stats.record_hit();
                Some(state.registry.get(handle).value.clone())
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Returns a copy of the value under `key` without touching recency or stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let state = self.state.read();
        state
            .lookup
            .get(key)
            .map(|&handle| state.registry.get(handle).value.clone())
    }

    // == Contains ==
    /// Checks whether `key` is cached, without touching recency or stats.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().lookup.contains_key(key)
    }

    // == Clear ==
    /// Drops every entry. Lifetime counters in [`CacheStats`] are kept.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let dropped = state.registry.len();
        state.lookup.clear();
        state.registry.clear();
        debug!("LRU cache cleared, dropped {} entries", dropped);
    }

    // == Keys ==
    /// Returns the cached keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        let state = self.state.read();
        state.registry.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.registry.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.state.read().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panics if the lookup table and the registry disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let state = self.state.read();
        state.registry.assert_invariants();
        assert_eq!(state.lookup.len(), state.registry.len(), "lookup/registry size");
        assert!(state.registry.len() <= self.capacity, "over capacity");
        for (key, &handle) in &state.lookup {
            assert!(state.registry.get(handle).key == *key, "handle filed under wrong key");
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.state.read().registry.len())
            .finish()
    }
}
