//! Cache Module
//!
//! Process-local item cache with TTL expiration and an optional LRU bound.

mod entry;
mod lru;
mod stats;
mod store;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyTracker;
pub use stats::CacheStats;
pub use store::{Cache, CacheError, ItemCache};

// == Public Constants ==
/// Maximum allowed cache key length in bytes
pub const MAX_KEY_LENGTH: usize = 2048;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
