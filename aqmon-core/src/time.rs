//! Time management for the monitor
//!
//! Every cycle takes the current time as an argument instead of reading a
//! clock itself, which keeps the alert and buzzer state machines
//! deterministic under test. The runtime reads a [`TimeSource`] once per
//! cycle and passes the value down.

use core::cell::Cell;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Clock the runtime samples once per cycle
pub trait TimeSource {
    /// Milliseconds since the clock's epoch, never decreasing
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Milliseconds since construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Clock moved by hand, shared by reference between a test and the code
/// under test
///
/// Not `Sync`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    /// Clock reading `start`
    pub const fn new(start: Timestamp) -> Self {
        Self { now: Cell::new(start) }
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Milliseconds from `earlier` to `later`, zero if the clock went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
