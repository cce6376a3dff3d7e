//! Core logic for a two-sensor air-quality monitor
//!
//! Reads an MQ-2 gas sensor (CO) and a GP2Y1010 optical dust sensor (PM2.5),
//! smooths the readings, grades them into five severity levels, drives an
//! alert LED and buzzer, and mirrors the state to a cloud shadow without
//! flooding it.
//!
//! Key constraints:
//! - Runs on an ESP32-class MCU (`no_std`, no heap)
//! - Sampling and reporting run as two independent cycles sharing only
//!   lock-free buffers
//! - Nothing in the steady-state cycles can fail; bad readings degrade
//!
//! ```no_run
//! use aqmon_core::{Assessment, Severity};
//!
//! let assessment = Assessment::evaluate(4.0, 40.0);
//! assert_eq!(assessment.danger, Severity::Moderate);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

pub mod actuation;
pub mod alert;
pub mod buffer;
pub mod calibration;
pub mod classify;
pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod hal;
pub mod monitor;
pub mod report;
pub mod sensor;
pub mod time;

// Public API
pub use actuation::{duty_for, AlertLed, Buzzer, PulseTimer};
pub use alert::{alert_message, AlertDecision, AlertState};
pub use buffer::{SampleBuffer, Samples};
pub use calibration::Calibration;
pub use classify::{Assessment, Pollutant, Severity};
pub use config::MonitorConfig;
pub use control::{ArmCommand, ArmController, ArmEvent, ArmedFlag};
pub use errors::{MonitorError, MonitorResult};
pub use hal::{AnalogChannel, ShadowParam, ShadowSink, ShadowValue, TextDisplay};
pub use monitor::{CycleReport, Reporter, Sampler};
pub use report::{Report, ReportGate};
pub use time::{TimeSource, Timestamp};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
