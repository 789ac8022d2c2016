//! Time source abstraction for testability.
//!
//! Both services read time through a `TimeSource` so the debounce window and
//! the dismissal cooldown can be driven by a logical clock in tests instead of
//! real waits.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Abstraction over time-related operations.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    /// Get the current instant for measuring elapsed time (debounce deadlines).
    fn now(&self) -> Instant;

    /// Wall-clock time in milliseconds since the Unix epoch.
    ///
    /// Used for anything that is persisted: snapshot timestamps and
    /// dismissal records.
    fn now_millis(&self) -> i64;

    /// Sleep for the specified duration.
    ///
    /// In tests, this is a no-op that advances logical time.
    fn sleep(&self, duration: Duration);

    /// Calculate elapsed time since an earlier instant.
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// Type alias for shared time source.
pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Production implementation using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeSource;

impl RealTimeSource {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> SharedTimeSource {
        Arc::new(Self)
    }
}

impl TimeSource for RealTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Test implementation with controllable time.
///
/// - `now()` returns a logical instant based on an internal counter
/// - `now_millis()` returns the base epoch plus the same logical offset
/// - `sleep()` advances logical time (no actual sleeping)
///
/// # Example
///
/// ```
/// use mirror::services::time_source::{TimeSource, TestTimeSource};
/// use std::time::Duration;
///
/// let time = TestTimeSource::with_epoch_millis(1_000);
/// time.sleep(Duration::from_millis(250));
///
/// assert_eq!(time.now_millis(), 1_250);
/// ```
#[derive(Debug)]
pub struct TestTimeSource {
    /// Logical time in nanoseconds since creation.
    logical_nanos: AtomicU64,
    /// Base instant (real time at creation, used for Instant arithmetic).
    base_instant: Instant,
    /// Wall-clock epoch milliseconds corresponding to logical zero.
    base_epoch_millis: i64,
}

impl Default for TestTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTimeSource {
    /// Create a new TestTimeSource anchored at the current wall-clock time.
    pub fn new() -> Self {
        Self::with_epoch_millis(Utc::now().timestamp_millis())
    }

    /// Create a TestTimeSource whose logical zero is a fixed epoch timestamp.
    pub fn with_epoch_millis(epoch_millis: i64) -> Self {
        Self {
            logical_nanos: AtomicU64::new(0),
            base_instant: Instant::now(),
            base_epoch_millis: epoch_millis,
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advance logical time by the given duration.
    pub fn advance(&self, duration: Duration) {
        self.logical_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Get the logical elapsed time since creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.logical_nanos.load(Ordering::SeqCst))
    }

    /// Reset logical time to zero.
    pub fn reset(&self) {
        self.logical_nanos.store(0, Ordering::SeqCst);
    }
}

impl TimeSource for TestTimeSource {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }

    fn now_millis(&self) -> i64 {
        self.base_epoch_millis + self.elapsed().as_millis() as i64
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
