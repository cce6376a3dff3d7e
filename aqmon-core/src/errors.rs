//! Error Types for Monitor Setup
//!
//! The sampling and reporting cycles never fail: bad arithmetic is guarded
//! and collaborator calls are fire-and-forget, so a faulty sensor or a
//! dropped cloud write degrades the reading instead of stopping the device.
//! Errors therefore only surface where a caller can still act on them, when
//! a configuration is validated or a component is built.
//!
//! Like every public type of this crate, errors are small, `Copy`, and carry
//! `&'static str` reasons instead of owned strings.
//!
//! ```rust
//! use aqmon_core::{MonitorConfig, MonitorError};
//!
//! let config = MonitorConfig::default().with_report_interval_ms(0);
//! match config.validate() {
//!     Err(MonitorError::InvalidConfig { field, .. }) => assert_eq!(field, "report_interval_ms"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for monitor setup operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Setup errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MonitorError {
    /// A configuration field holds an unusable value
    #[error("Invalid config field {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The CO baseline resistance is missing or implausible
    #[error("CO sensor not calibrated (baseline {baseline_ohms} ohm)")]
    NotCalibrated {
        /// Baseline the calibration produced
        baseline_ohms: f32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidConfig { field, reason } =>
                defmt::write!(fmt, "Config {}: {}", field, reason),
            Self::NotCalibrated { baseline_ohms } =>
                defmt::write!(fmt, "Not calibrated ({} ohm)", baseline_ohms),
        }
    }
}
