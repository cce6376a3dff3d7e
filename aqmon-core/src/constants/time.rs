//! Time-Related Constants
//!
//! Cadences and windows for the sampling and reporting cycles.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

// ===== CYCLE CADENCE =====

/// Sampling cycle period (ms).
///
/// 5 Hz keeps the 5-slot smoothing window about one report interval long.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 200;

/// Reporting cycle period (ms).
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;

/// How often the runtime polls the buzzer between reports (ms).
pub const BUZZER_POLL_INTERVAL_MS: u64 = 50;

// ===== ALERTING =====

/// Minimum spacing between two alert notifications during sustained danger (ms).
pub const DEFAULT_ALERT_COOLDOWN_MS: u64 = 5000;

/// Length of one buzzer pulse (ms).
pub const DEFAULT_BUZZER_PULSE_MS: u64 = 500;

/// Minimum spacing between two accepted button toggles (ms).
///
/// Suppresses mechanical contact bounce on the arm button.
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

// ===== BOOTSTRAP =====

/// Warm-up pause shown with the "Calibrating..." banner (ms).
pub const CALIBRATION_WARMUP_MS: u64 = 2000;

/// How long the "System ready" banner stays up (ms).
pub const READY_BANNER_MS: u64 = 1000;
