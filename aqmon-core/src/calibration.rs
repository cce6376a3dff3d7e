//! Clean-air baseline for the MQ-2 sensor
//!
//! At startup the sensor is assumed to sit in clean air. Fifty reads, 10 ms
//! apart, are averaged and converted to a sensor resistance; dividing by the
//! datasheet clean-air ratio gives `R0`, the reference every later CO reading
//! is expressed against.
//!
//! Calibration is best effort. A dead channel (zero voltage) leaves the
//! baseline at zero, which is logged, and CO then reads as 0 ppm until the
//! device is restarted in working order.

use crate::constants::sensors::{CALIBRATION_DELAY_MS, CALIBRATION_SAMPLES, CLEAN_AIR_RATIO};
use crate::constants::time::US_PER_MS;
use crate::errors::{MonitorError, MonitorResult};
use crate::hal::{AnalogChannel, DelayNs};
use crate::sensor::{burst_average, raw_to_voltage, sensor_resistance};

/// Baseline resistance `R0` of the gas sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    baseline_ohms: f32,
}

impl Calibration {
    /// No baseline; every ratio reads as 0
    pub const fn uncalibrated() -> Self {
        Self { baseline_ohms: 0.0 }
    }

    /// Use a known baseline, e.g. one restored from a previous run
    pub const fn from_baseline(baseline_ohms: f32) -> Self {
        Self { baseline_ohms }
    }

    /// Derive the baseline from an averaged clean-air raw code
    pub fn from_raw(raw: u16) -> Self {
        match sensor_resistance(raw_to_voltage(raw)) {
            Some(rs) => Self::from_baseline(rs / CLEAN_AIR_RATIO),
            None => Self::uncalibrated(),
        }
    }

    /// Run the startup calibration against a live channel
    ///
    /// Blocks for roughly half a second.
    pub fn measure<A, D>(adc: &mut A, delay: &mut D) -> Self
    where
        A: AnalogChannel,
        D: DelayNs,
    {
        let raw = burst_average(
            adc,
            delay,
            CALIBRATION_SAMPLES,
            CALIBRATION_DELAY_MS * US_PER_MS as u32,
        );
        let calibration = Self::from_raw(raw);

        if calibration.is_calibrated() {
            log_info!("Calibrated R0 = {} ohm (raw {})", calibration.baseline_ohms, raw);
        } else {
            log_warn!("Calibration failed (raw {}), CO will read 0 ppm", raw);
        }

        calibration
    }

    /// Clean-air resistance R0 (ohms)
    pub fn baseline_ohms(&self) -> f32 {
        self.baseline_ohms
    }

    /// Whether the baseline can be divided by
    pub fn is_calibrated(&self) -> bool {
        self.baseline_ohms.is_finite() && self.baseline_ohms > 0.0
    }

    /// Same as [`is_calibrated`](Self::is_calibrated), as a result
    pub fn check(&self) -> MonitorResult<()> {
        if self.is_calibrated() {
            Ok(())
        } else {
            Err(MonitorError::NotCalibrated {
                baseline_ohms: self.baseline_ohms,
            })
        }
    }

    /// Rs/R0 for a measured sensor resistance, 0 without a baseline
    pub fn ratio(&self, rs: f32) -> f32 {
        if !self.is_calibrated() || !rs.is_finite() {
            return 0.0;
        }
        rs / self.baseline_ohms
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::uncalibrated()
    }
}
