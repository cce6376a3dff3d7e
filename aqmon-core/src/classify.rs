//! Severity grading for CO and PM2.5
//!
//! Each pollutant has four band edges splitting its range into five levels.
//! A reading exactly on an edge belongs to the higher level. The overall
//! danger is the worse of the two levels; on a tie CO is reported as the
//! most polluting.
//!
//! ```rust
//! use aqmon_core::{Assessment, Pollutant, Severity};
//!
//! let assessment = Assessment::evaluate(4.0, 40.0);
//! assert_eq!(assessment.co, Severity::Good);
//! assert_eq!(assessment.pm25, Severity::Moderate);
//! assert_eq!(assessment.worst, Pollutant::Pm25);
//! ```

use crate::constants::thresholds::{
    CO_BANDS_PPM, CO_STATUS, DANGER_ALERT_LEVEL, PM25_BANDS_UG_M3, PM25_STATUS,
};

/// Five-step severity scale shared by both pollutants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Severity {
    /// Level 0
    Good = 0,
    /// Level 1
    Fair = 1,
    /// Level 2
    Moderate = 2,
    /// Level 3, first dangerous level
    Poor = 3,
    /// Level 4
    Hazardous = 4,
}

impl Severity {
    /// Level for a 0-4 index, saturating at `Hazardous`
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => Severity::Good,
            1 => Severity::Fair,
            2 => Severity::Moderate,
            3 => Severity::Poor,
            _ => Severity::Hazardous,
        }
    }

    /// Numeric level, 0-4
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Poor or worse: sounds the buzzer and raises alerts when armed
    pub const fn is_dangerous(self) -> bool {
        self.level() >= DANGER_ALERT_LEVEL
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Severity {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "L{}", self.level())
    }
}

/// The two monitored pollutants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pollutant {
    /// Carbon monoxide (MQ-2)
    Co,
    /// Fine particulate matter (GP2Y1010)
    Pm25,
}

impl Pollutant {
    /// Display label, also sent as the `most_polluted` shadow value
    pub const fn label(self) -> &'static str {
        match self {
            Pollutant::Co => "CO",
            Pollutant::Pm25 => "PM2.5",
        }
    }

    /// Unit shown next to values
    pub const fn unit(self) -> &'static str {
        match self {
            Pollutant::Co => "ppm",
            Pollutant::Pm25 => "ug/m3",
        }
    }

    /// Upper edges of levels 0-3
    pub const fn bands(self) -> &'static [f32; 4] {
        match self {
            Pollutant::Co => &CO_BANDS_PPM,
            Pollutant::Pm25 => &PM25_BANDS_UG_M3,
        }
    }

    /// Grade a reading of this pollutant
    ///
    /// Anything that is not below an edge, including NaN, falls through to
    /// `Hazardous`.
    pub fn classify(self, value: f32) -> Severity {
        let level = self
            .bands()
            .iter()
            .position(|&edge| value < edge)
            .unwrap_or(self.bands().len());

        Severity::from_level(level as u8)
    }

    /// Status phrase shown for a level of this pollutant
    pub const fn status(self, severity: Severity) -> &'static str {
        let index = severity.level() as usize;
        match self {
            Pollutant::Co => CO_STATUS[index],
            Pollutant::Pm25 => PM25_STATUS[index],
        }
    }
}

/// Grade CO concentration in ppm
pub fn classify_co(ppm: f32) -> Severity {
    Pollutant::Co.classify(ppm)
}

/// Grade PM2.5 density in µg/m³
pub fn classify_pm25(density: f32) -> Severity {
    Pollutant::Pm25.classify(density)
}

/// Both grades for one pair of averaged readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Averaged CO (ppm) that was graded
    pub co_ppm: f32,
    /// Averaged PM2.5 (µg/m³) that was graded
    pub pm25_ug_m3: f32,
    /// CO level
    pub co: Severity,
    /// PM2.5 level
    pub pm25: Severity,
    /// Worse of the two levels
    pub danger: Severity,
    /// Pollutant responsible for `danger`
    pub worst: Pollutant,
}

impl Assessment {
    /// Grade both averages
    pub fn evaluate(co_ppm: f32, pm25_ug_m3: f32) -> Self {
        let co = classify_co(co_ppm);
        let pm25 = classify_pm25(pm25_ug_m3);

        let worst = if co >= pm25 {
            Pollutant::Co
        } else {
            Pollutant::Pm25
        };

        Self {
            co_ppm,
            pm25_ug_m3,
            co,
            pm25,
            danger: co.max(pm25),
            worst,
        }
    }

    /// Level of one pollutant
    pub fn level_of(&self, pollutant: Pollutant) -> Severity {
        match pollutant {
            Pollutant::Co => self.co,
            Pollutant::Pm25 => self.pm25,
        }
    }

    /// Graded value of one pollutant
    pub fn value_of(&self, pollutant: Pollutant) -> f32 {
        match pollutant {
            Pollutant::Co => self.co_ppm,
            Pollutant::Pm25 => self.pm25_ug_m3,
        }
    }

    /// Status phrase for the CO level
    pub fn co_status(&self) -> &'static str {
        Pollutant::Co.status(self.co)
    }

    /// Status phrase for the PM2.5 level
    pub fn pm25_status(&self) -> &'static str {
        Pollutant::Pm25.status(self.pm25)
    }
}
