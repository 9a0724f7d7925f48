//! Structured cache events
//!
//! Every state change or lookup outcome in [`ResponseCache`](super::ResponseCache)
//! is reported as a [`CacheEvent`] to a [`CacheObserver`]. The default observer
//! forwards events to `tracing`; tests can swap in a [`RecordingObserver`] and
//! assert on exactly what happened.

use parking_lot::Mutex;

/// Something the cache did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Lookup found a fresh entry
    Hit { key: String },
    /// Lookup found nothing
    Miss { key: String },
    /// Lookup found a stale entry and removed it
    Expired { key: String },
    /// An entry was written or overwritten
    Stored { key: String },
    /// An entry was removed on request
    Removed { key: String },
    /// The whole store was emptied
    Cleared { entries: usize },
    /// An expiry sweep finished
    CleanedUp { removed: usize },
}

/// Receives cache events
pub trait CacheObserver: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}

/// Forwards cache events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_event(&self, event: &CacheEvent) {
        match event {
            CacheEvent::Hit { key } => tracing::debug!(key = %key, "cache hit"),
            CacheEvent::Miss { key } => tracing::debug!(key = %key, "cache miss"),
            CacheEvent::Expired { key } => tracing::debug!(key = %key, "cache entry expired"),
            CacheEvent::Stored { key } => tracing::debug!(key = %key, "cache set"),
            CacheEvent::Removed { key } => tracing::debug!(key = %key, "cache entry cleared"),
            CacheEvent::Cleared { entries } => {
                tracing::info!(entries = *entries, "all cache entries cleared")
            }
            CacheEvent::CleanedUp { removed } => {
                tracing::info!(removed = *removed, "cleaned expired cache entries")
            }
        }
    }
}

/// Keeps every event it receives, in order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CacheEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.lock().clone()
    }

    /// Drops all recorded events
    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

impl CacheObserver for RecordingObserver {
    fn on_event(&self, event: &CacheEvent) {
        self.events.lock().push(event.clone());
    }
}
