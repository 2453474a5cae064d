//! Cache Module
//!
//! Provides a fixed-capacity LRU cache built on an arena-backed ordered registry.

mod entry;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use registry::{Handle, Iter, OrderedRegistry};
pub use stats::CacheStats;
pub use store::LruCache;
