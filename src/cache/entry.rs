//! Cache Entry Module
//!
//! Defines the payload stored in the ordered registry for each cached key.

// == Cache Entry ==
/// One stored key/value pair.
///
/// The key is kept next to the value so that evicting the back entry of the
/// registry tells the cache which lookup slot to erase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// The key this entry is filed under
    pub key: K,
    /// The stored value, never inspected by the cache
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    // == Replace ==
    /// Swaps in a new value and returns the old one.
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}
