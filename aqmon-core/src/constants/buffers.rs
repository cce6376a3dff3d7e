//! Buffer Sizes and Fixed Capacities
//!
//! Everything here is sized at compile time; the monitor never allocates.

/// Number of samples in each smoothing window.
///
/// At the 200 ms sampling cadence this averages the last second of data.
pub const SMOOTHING_WINDOW: usize = 5;

/// Capacity of the arm-command channel between inputs and the controller.
pub const ARM_QUEUE_CAPACITY: usize = 10;

/// Character width of the text display.
pub const DISPLAY_COLUMNS: usize = 16;

/// Capacity of one formatted display line.
pub const LINE_CAPACITY: usize = 32;

/// Capacity of an alert notification message.
pub const ALERT_MESSAGE_CAPACITY: usize = 96;
