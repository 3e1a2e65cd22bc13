//! Time abstraction for testability
//!
//! Trait-based time source so that cache expiry and health bookkeeping can be
//! tested deterministically, without sleeping through real TTLs.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use inkflow_common::time::{Clock, MockClock, SystemClock};
//!
//! // Use system clock in production
//! let clock = SystemClock;
//! let now = clock.now();
//!
//! // Use mock clock in tests
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::from_secs(5));
//! let end = mock.now();
//! assert_eq!(end.duration_since(start), Duration::from_secs(5));
//! ```

// MockClock methods can panic on a poisoned mutex; callers are tests.
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable testing
///
/// Abstraction over monotonic and wall-clock time, allowing code to run
/// against either the real system clock or a mocked one.
pub trait Clock: Send + Sync {
    /// Current monotonic instant, suitable for measuring durations.
    fn now(&self) -> Instant;

    /// Current wall-clock time.
    fn system_time(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch, for timestamps persisted alongside
    /// cached or recorded entries.
    fn millis_since_epoch(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Real system clock implementation
///
/// Production implementation backed by the actual system clock.
///
/// # Examples
///
/// ```
/// use inkflow_common::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// println!("Current time: {:?}", now);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock clock for deterministic testing
///
/// Time only moves when the test advances it, so TTL and probe-interval
/// behavior can be exercised instantly.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use inkflow_common::time::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let start = clock.now();
///
/// // Simulate 5 seconds passing
/// clock.advance(Duration::from_secs(5));
///
/// let end = clock.now();
/// assert_eq!(end.duration_since(start), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
    base_system_time: SystemTime,
}

impl MockClock {
    /// Create a mock clock anchored at the current real time.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            base_system_time: SystemTime::now(),
        }
    }

    /// Advance the simulated time. Clones of this clock observe the advance
    /// too.
    pub fn advance(&self, duration: Duration) {
        // Test utility: a poisoned mutex should fail the test immediately
        let mut elapsed = self.elapsed.lock().expect("mock clock mutex poisoned");
        *elapsed += duration;
    }

    /// Set the simulated elapsed time to an absolute value, replacing any
    /// previously accumulated advances.
    pub fn set_elapsed(&self, duration: Duration) {
        // Test utility: a poisoned mutex should fail the test immediately
        let mut elapsed = self.elapsed.lock().expect("mock clock mutex poisoned");
        *elapsed = duration;
    }

    /// Simulated time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        // Test utility: a poisoned mutex should fail the test immediately
        *self.elapsed.lock().expect("mock clock mutex poisoned")
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base_system_time + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the clock abstraction.
    use super::*;

    /// Validates `SystemClock::now` never runs backwards.
    ///
    /// Assertions:
    /// - Ensures the second reading is not earlier than the first.
    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();

        assert!(second >= first);
    }

    /// Validates `Clock::millis_since_epoch` yields a plausible timestamp on
    /// the real clock.
    ///
    /// Assertions:
    /// - Ensures the epoch-millis value is non-zero.
    #[test]
    fn test_system_clock_millis() {
        let clock = SystemClock;
        assert!(clock.millis_since_epoch() > 0);
    }

    /// Validates `MockClock::advance` moves simulated time without waiting.
    ///
    /// Assertions:
    /// - Confirms the monotonic reading moved by exactly the advanced amount.
    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(7));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(7));
    }

    /// Validates `MockClock::set_elapsed` overwrites rather than accumulates.
    ///
    /// Assertions:
    /// - Confirms the second `set_elapsed` replaces the first outright.
    #[test]
    fn test_mock_clock_set_elapsed() {
        let clock = MockClock::new();

        clock.set_elapsed(Duration::from_secs(90));
        clock.set_elapsed(Duration::from_secs(30));

        assert_eq!(clock.elapsed(), Duration::from_secs(30));
    }

    /// Validates `MockClock::system_time` tracks simulated elapsed time.
    ///
    /// Assertions:
    /// - Confirms the epoch-millis delta matches the simulated advance.
    #[test]
    fn test_mock_clock_millis_since_epoch() {
        let clock = MockClock::new();
        let before = clock.millis_since_epoch();

        clock.set_elapsed(Duration::from_millis(2500));

        assert_eq!(clock.millis_since_epoch().saturating_sub(before), 2500);
    }

    /// Validates cloned mock clocks share one elapsed counter.
    ///
    /// Assertions:
    /// - Confirms a clone sees time accumulated before the clone.
    /// - Confirms an advance on the original is visible through the clone.
    #[test]
    fn test_mock_clock_clone_shares_time() {
        let original = MockClock::new();
        original.advance(Duration::from_secs(12));

        let clone = original.clone();
        assert_eq!(clone.elapsed(), Duration::from_secs(12));

        original.advance(Duration::from_secs(3));
        assert_eq!(clone.elapsed(), Duration::from_secs(15));
    }
}
