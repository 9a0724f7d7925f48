//! In-memory response cache with a fixed time-to-live
//!
//! Provides a `ResponseCache` that keeps decoded API responses for
//! [`CACHE_DURATION_MS`] after they were written. Staleness is checked lazily
//! when an entry is read; expired entries can also be swept in bulk with
//! [`ResponseCache::cleanup_expired`].

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::events::{CacheEvent, CacheObserver, TracingObserver};

/// How long an entry stays fresh, in milliseconds
pub const CACHE_DURATION_MS: i64 = 60_000;

/// How long an entry stays fresh, in whole seconds
pub const CACHE_DURATION_SECS: u64 = (CACHE_DURATION_MS / 1000) as u64;

/// A single cached payload
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached data
    pub data: T,
    /// When the entry was written (milliseconds since epoch)
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Milliseconds elapsed since the entry was written, never negative
    fn age_millis(&self, now: i64) -> i64 {
        (now - self.timestamp).max(0)
    }

    /// Whether the entry has outlived the cache duration
    fn is_expired(&self, now: i64) -> bool {
        self.age_millis(now) > CACHE_DURATION_MS
    }
}

/// Per-entry line of a [`CacheStats`] snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryStats {
    /// Cache key
    pub key: String,
    /// Age in whole seconds, rounded to nearest
    pub age_secs: u64,
    /// Whether the entry is past its time-to-live
    pub expired: bool,
}

/// Point-in-time view of the cache contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently stored, expired or not
    pub total_entries: usize,
    /// One line per entry, sorted by key
    pub entries: Vec<CacheEntryStats>,
}

impl CacheStats {
    /// Number of entries still within their time-to-live
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.expired).count()
    }

    /// Number of entries past their time-to-live
    pub fn expired_count(&self) -> usize {
        self.entries.iter().filter(|e| e.expired).count()
    }
}

/// Rounds a non-negative millisecond count to the nearest whole second
fn round_to_secs(millis: i64) -> u64 {
    ((millis.max(0) + 500) / 1000) as u64
}

/// Time-bounded key/value store for API responses
///
/// Keys are opaque, case-sensitive strings; callers normalize them. Every
/// operation takes `&self` and completes under a short internal lock, so a
/// single instance can be shared via `Arc` between the data-fetch layer and
/// the status poller.
pub struct ResponseCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn CacheObserver>,
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResponseCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone> ResponseCache<T> {
    /// Creates an empty cache on the system clock that logs through `tracing`
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock), Arc::new(TracingObserver))
    }

    /// Creates an empty cache with a custom clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_parts(clock, Arc::new(TracingObserver))
    }

    /// Creates an empty cache with a custom clock and event observer
    pub fn with_parts(clock: Arc<dyn Clock>, observer: Arc<dyn CacheObserver>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            observer,
        }
    }

    /// Looks up `key`
    ///
    /// Returns `None` on a miss. An entry older than the cache duration is
    /// removed and also reported as a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();

        let (result, event) = {
            let mut entries = self.entries.lock();
            let lookup = entries
                .get(key)
                .map(|entry| (!entry.is_expired(now)).then(|| entry.data.clone()));

            match lookup {
                None => (None, CacheEvent::Miss { key: key.to_string() }),
                Some(None) => {
                    entries.remove(key);
                    (None, CacheEvent::Expired { key: key.to_string() })
                }
                Some(Some(data)) => (Some(data), CacheEvent::Hit { key: key.to_string() }),
            }
        };

        self.observer.on_event(&event);
        result
    }

    /// Stores `data` under `key`, replacing any previous entry and its age
    pub fn set(&self, key: &str, data: T) {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
        };
        self.entries.lock().insert(key.to_string(), entry);
        self.observer.on_event(&CacheEvent::Stored { key: key.to_string() });
    }

    /// Seconds until `key` expires, floored at zero
    ///
    /// Returns `None` if there is no entry for `key`. Does not remove
    /// expired entries.
    pub fn remaining_ttl(&self, key: &str) -> Option<u64> {
        let now = self.clock.now_millis();
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        Some(round_to_secs(CACHE_DURATION_MS - entry.age_millis(now)))
    }

    /// Removes the entry for `key`, if any
    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
        self.observer.on_event(&CacheEvent::Removed { key: key.to_string() });
    }

    /// Removes every entry
    pub fn clear(&self) {
        let entries = {
            let mut map = self.entries.lock();
            let count = map.len();
            map.clear();
            count
        };
        self.observer.on_event(&CacheEvent::Cleared { entries });
    }

    /// Number of stored entries, including expired ones not yet removed
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry's age and expiry state
    ///
    /// Expired entries are reported, not removed.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_millis();
        let entries = self.entries.lock();

        let mut lines: Vec<CacheEntryStats> = entries
            .iter()
            .map(|(key, entry)| CacheEntryStats {
                key: key.clone(),
                age_secs: round_to_secs(entry.age_millis(now)),
                expired: entry.is_expired(now),
            })
            .collect();
        lines.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            total_entries: entries.len(),
            entries: lines,
        }
    }

    /// Removes every expired entry and returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let removed = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(now));
            before - entries.len()
        };
        self.observer.on_event(&CacheEvent::CleanedUp { removed });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::events::RecordingObserver;

    #[derive(Debug, Clone, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (ResponseCache<TestData>, ManualClock, Arc<RecordingObserver>) {
        let clock = ManualClock::new(1_700_000_000_000);
        let observer = Arc::new(RecordingObserver::new());
        let cache = ResponseCache::with_parts(Arc::new(clock.clone()), observer.clone());
        (cache, clock, observer)
    }

    fn data(name: &str, value: i32) -> TestData {
        TestData {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _clock, observer) = create_test_cache();

        assert!(cache.get("nonexistent_key").is_none());
        assert_eq!(
            observer.events(),
            vec![CacheEvent::Miss {
                key: "nonexistent_key".into()
            }]
        );
    }

    #[test]
    fn test_get_returns_fresh_data() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("fresh_key", data("fresh", 100));
        clock.advance_secs(59);

        assert_eq!(cache.get("fresh_key"), Some(data("fresh", 100)));
    }

    #[test]
    fn test_entry_at_exact_ttl_is_still_fresh() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("edge", data("edge", 1));
        clock.advance(CACHE_DURATION_MS);

        assert!(cache.get("edge").is_some());
        assert_eq!(cache.remaining_ttl("edge"), Some(0));
    }

    #[test]
    fn test_get_removes_expired_entry() {
        let (cache, clock, observer) = create_test_cache();
        cache.set("expired_key", data("expired", 0));
        clock.advance(CACHE_DURATION_MS + 1);
        observer.reset();

        assert!(cache.get("expired_key").is_none());
        assert!(cache.is_empty());
        assert_eq!(
            observer.events(),
            vec![CacheEvent::Expired {
                key: "expired_key".into()
            }]
        );
    }

    #[test]
    fn test_overwrite_replaces_data_and_resets_age() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("overwrite_key", data("first", 1));
        clock.advance_secs(40);
        cache.set("overwrite_key", data("second", 2));
        clock.advance_secs(30);

        assert_eq!(cache.get("overwrite_key"), Some(data("second", 2)));
        assert_eq!(cache.remaining_ttl("overwrite_key"), Some(30));
    }

    #[test]
    fn test_remaining_ttl_rounds_to_nearest_second() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("k", data("k", 0));

        assert_eq!(cache.remaining_ttl("k"), Some(60));
        clock.advance(10_400);
        assert_eq!(cache.remaining_ttl("k"), Some(50));
        clock.advance(100);
        // 49.5 seconds left rounds up
        assert_eq!(cache.remaining_ttl("k"), Some(50));
        clock.advance(1);
        assert_eq!(cache.remaining_ttl("k"), Some(49));
    }

    #[test]
    fn test_remaining_ttl_floors_at_zero_and_keeps_entry() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("k", data("k", 0));
        clock.advance_secs(300);

        assert_eq!(cache.remaining_ttl("k"), Some(0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remaining_ttl("missing"), None);
    }

    #[test]
    fn test_delete_is_noop_for_missing_key() {
        let (cache, _clock, _observer) = create_test_cache();
        cache.set("a", data("a", 1));

        cache.delete("b");
        assert_eq!(cache.len(), 1);

        cache.delete("a");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_reports_entry_count() {
        let (cache, _clock, observer) = create_test_cache();
        cache.set("a", data("a", 1));
        cache.set("b", data("b", 2));
        observer.reset();

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(observer.events(), vec![CacheEvent::Cleared { entries: 2 }]);
    }

    #[test]
    fn test_stats_reports_age_and_expiry_without_removing() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("old", data("old", 1));
        clock.advance_secs(45);
        cache.set("new", data("new", 2));
        clock.advance(20_600);

        let stats = cache.stats();

        assert_eq!(stats.total_entries, 2);
        assert_eq!(
            stats.entries,
            vec![
                CacheEntryStats {
                    key: "new".into(),
                    age_secs: 21,
                    expired: false,
                },
                CacheEntryStats {
                    key: "old".into(),
                    age_secs: 66,
                    expired: true,
                },
            ]
        );
        assert_eq!(stats.valid_count(), 1);
        assert_eq!(stats.expired_count(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let (cache, clock, observer) = create_test_cache();
        cache.set("a", data("a", 1));
        cache.set("b", data("b", 2));
        clock.advance_secs(61);
        cache.set("c", data("c", 3));
        observer.reset();

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c").is_some());
        assert_eq!(observer.events()[0], CacheEvent::CleanedUp { removed: 2 });
    }

    #[test]
    fn test_clock_moving_backwards_reads_as_zero_age() {
        let (cache, clock, _observer) = create_test_cache();
        cache.set("k", data("k", 0));
        clock.advance(-5_000);

        assert_eq!(cache.stats().entries[0].age_secs, 0);
        assert_eq!(cache.remaining_ttl("k"), Some(60));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_round_to_secs() {
        assert_eq!(round_to_secs(0), 0);
        assert_eq!(round_to_secs(499), 0);
        assert_eq!(round_to_secs(500), 1);
        assert_eq!(round_to_secs(60_000), 60);
        assert_eq!(round_to_secs(-10), 0);
    }
}
