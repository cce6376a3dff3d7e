//! Constants for the air-quality monitor core
//!
//! Centralized, documented constants used throughout the crate. Values that
//! come from a sensor datasheet or an empirical curve fit are carried verbatim
//! and say where they come from.
//!
//! ## Organization
//!
//! - **Sensors**: ADC scaling, MQ-2 divider and curve, GP2Y1010 timing
//! - **Thresholds**: severity bands, status phrases, PWM duty table
//! - **Time**: cycle cadences, cooldowns, debounce windows
//! - **Buffers**: smoothing window and fixed text capacities
//!
//! Tunable values (cadences, tolerances) are only defaults here; the live
//! values come from [`crate::config::MonitorConfig`].

/// ADC scaling and sensor front-end constants from datasheets.
pub mod sensors;

/// Severity band edges, status phrases and the alert LED duty table.
pub mod thresholds;

/// Cadences, cooldowns and debounce windows.
pub mod time;

/// Buffer sizes and fixed-capacity string limits.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use sensors::{
    ADC_MAX_CODE, ADC_REFERENCE_V, LOAD_RESISTANCE_OHMS, CLEAN_AIR_RATIO,
};

pub use thresholds::{CO_BANDS_PPM, PM25_BANDS_UG_M3, ALERT_DUTY_TABLE};

pub use time::{
    MS_PER_SECOND, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_REPORT_INTERVAL_MS,
    DEFAULT_ALERT_COOLDOWN_MS, DEFAULT_DEBOUNCE_MS,
};

pub use buffers::{SMOOTHING_WINDOW, ARM_QUEUE_CAPACITY};
