//! Mini LRU - A fixed-capacity, thread-safe LRU cache
//!
//! Keys are looked up through a HashMap of handles into an arena-backed
//! doubly linked list, so `get` and `set` run in O(1).

pub mod cache;
pub mod command;
pub mod config;
pub mod error;

pub use cache::{CacheStats, LruCache};
pub use config::Config;
