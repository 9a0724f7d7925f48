//! Cache module for short-lived API responses
//!
//! This module provides an in-memory response cache with a fixed 60 second
//! time-to-live. Entries expire lazily when read and can be swept manually.
//! Time and logging are injected so the cache can be tested deterministically.

mod clock;
mod events;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{CacheEvent, CacheObserver, RecordingObserver, TracingObserver};
pub use store::{
    CacheEntry, CacheEntryStats, CacheStats, ResponseCache, CACHE_DURATION_MS,
    CACHE_DURATION_SECS,
};
