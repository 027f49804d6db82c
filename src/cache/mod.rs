//! Cache Module
//!
//! Provides the bounded cache engine with TTL expiration and LRU eviction.

mod clock;
mod entry;
mod eviction;
mod options;
mod shared;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use entry::{CacheEntry, EntryMeta};
pub use options::{CacheOptions, EvictFn, SizeFn};
pub use shared::SharedCache;
pub use store::Cache;

// == Public Constants ==
/// Size charged to an entry when no size function is configured
pub const DEFAULT_ENTRY_SIZE: u64 = 1;
