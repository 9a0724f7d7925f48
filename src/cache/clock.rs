//! Millisecond clocks used to timestamp cache entries
//!
//! The cache never reads the system time directly. Production code uses
//! [`SystemClock`]; tests drive time forward with [`ManualClock`].

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of "now" in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the cache.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start_millis`
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Moves the clock forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by whole seconds
    pub fn advance_secs(&self, secs: i64) {
        self.advance(secs * 1000);
    }

    /// Jumps the clock to an absolute time
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_given_time() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(0);
        let other = clock.clone();

        clock.advance_secs(5);
        assert_eq!(other.now_millis(), 5_000);

        other.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
