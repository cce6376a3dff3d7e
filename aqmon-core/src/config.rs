//! Runtime configuration for the monitor
//!
//! Physical sensor constants are fixed in [`crate::constants`]; this struct
//! holds what a deployment may reasonably tune: cycle cadences, alert
//! pacing, and how much a reading must move before the cloud hears about it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{buffers, thresholds, time};
use crate::errors::{MonitorError, MonitorResult};

/// Tunable monitor parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Sampling cycle period (ms)
    pub sample_interval_ms: u64,
    /// Reporting cycle period (ms)
    pub report_interval_ms: u64,
    /// Minimum spacing between alerts during sustained danger (ms)
    pub alert_cooldown_ms: u64,
    /// Buzzer pulse length (ms)
    pub buzzer_pulse_ms: u64,
    /// Minimum spacing between accepted button toggles (ms)
    pub debounce_ms: u64,
    /// CO change (ppm) that forces a cloud update
    pub co_tolerance_ppm: f32,
    /// PM2.5 change (µg/m³) that forces a cloud update
    pub pm25_tolerance: f32,
    /// Rs/R0 change that forces a cloud update
    pub ratio_tolerance: f32,
    /// Width of the text display in characters
    pub display_columns: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: time::DEFAULT_SAMPLE_INTERVAL_MS,
            report_interval_ms: time::DEFAULT_REPORT_INTERVAL_MS,
            alert_cooldown_ms: time::DEFAULT_ALERT_COOLDOWN_MS,
            buzzer_pulse_ms: time::DEFAULT_BUZZER_PULSE_MS,
            debounce_ms: time::DEFAULT_DEBOUNCE_MS,
            co_tolerance_ppm: thresholds::CO_REPORT_TOLERANCE_PPM,
            pm25_tolerance: thresholds::PM25_REPORT_TOLERANCE,
            ratio_tolerance: thresholds::RATIO_REPORT_TOLERANCE,
            display_columns: buffers::DISPLAY_COLUMNS,
        }
    }
}

impl MonitorConfig {
    /// Set the sampling period
    pub fn with_sample_interval_ms(mut self, ms: u64) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Set the reporting period
    pub fn with_report_interval_ms(mut self, ms: u64) -> Self {
        self.report_interval_ms = ms;
        self
    }

    /// Set the minimum gap between repeated alerts
    pub fn with_alert_cooldown_ms(mut self, ms: u64) -> Self {
        self.alert_cooldown_ms = ms;
        self
    }

    /// Set the buzzer pulse length
    pub fn with_buzzer_pulse_ms(mut self, ms: u64) -> Self {
        self.buzzer_pulse_ms = ms;
        self
    }

    /// Set the button debounce window
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set all three report-gate tolerances at once
    pub fn with_tolerances(mut self, co_ppm: f32, pm25: f32, ratio: f32) -> Self {
        self.co_tolerance_ppm = co_ppm;
        self.pm25_tolerance = pm25;
        self.ratio_tolerance = ratio;
        self
    }

    /// Set the display width
    pub fn with_display_columns(mut self, columns: usize) -> Self {
        self.display_columns = columns;
        self
    }

    /// Check the configuration for values the cycles cannot work with
    pub fn validate(&self) -> MonitorResult<()> {
        if self.sample_interval_ms == 0 {
            return Err(invalid("sample_interval_ms", "must be non-zero"));
        }
        if self.report_interval_ms == 0 {
            return Err(invalid("report_interval_ms", "must be non-zero"));
        }
        if self.report_interval_ms < self.sample_interval_ms {
            return Err(invalid(
                "report_interval_ms",
                "must not be shorter than sample_interval_ms",
            ));
        }
        if self.buzzer_pulse_ms == 0 {
            return Err(invalid("buzzer_pulse_ms", "must be non-zero"));
        }

        for (field, value) in [
            ("co_tolerance_ppm", self.co_tolerance_ppm),
            ("pm25_tolerance", self.pm25_tolerance),
            ("ratio_tolerance", self.ratio_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite, non-negative number"));
            }
        }

        // "PM2.5: " plus at least one digit group
        if self.display_columns < 8 {
            return Err(invalid("display_columns", "must be at least 8"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> MonitorError {
    MonitorError::InvalidConfig { field, reason }
}
