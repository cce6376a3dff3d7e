//! Change-gated cloud reporting
//!
//! Sensor values jitter in the last digit, and pushing every jitter to the
//! cloud shadow wastes bandwidth and quota. The gate remembers the last
//! report it let through and only trips again when a value moved beyond its
//! tolerance, a level changed, or a status phrase changed.

use crate::classify::{Assessment, Pollutant, Severity};
use crate::config::MonitorConfig;
use crate::hal::{ShadowParam, ShadowSink, ShadowValue};

/// Snapshot of everything the gated shadow parameters carry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Averaged CO (ppm)
    pub co_ppm: f32,
    /// Averaged PM2.5 (µg/m³)
    pub pm25: f32,
    /// Latest Rs/R0 of the gas sensor
    pub ratio: f32,
    /// CO level
    pub co_level: Severity,
    /// PM2.5 level
    pub pm25_level: Severity,
    /// CO status phrase
    pub co_status: &'static str,
    /// PM2.5 status phrase
    pub pm25_status: &'static str,
    /// Pollutant named as most polluted
    pub worst: Pollutant,
}

impl Report {
    /// Snapshot an assessment with the latest ratio
    pub fn new(assessment: &Assessment, ratio: f32) -> Self {
        Self {
            co_ppm: assessment.co_ppm,
            pm25: assessment.pm25_ug_m3,
            ratio,
            co_level: assessment.co,
            pm25_level: assessment.pm25,
            co_status: assessment.co_status(),
            pm25_status: assessment.pm25_status(),
            worst: assessment.worst,
        }
    }

    /// Whether this report differs enough from `previous` to be sent
    pub fn differs_from(&self, previous: &Report, config: &MonitorConfig) -> bool {
        moved(self.co_ppm, previous.co_ppm, config.co_tolerance_ppm)
            || moved(self.pm25, previous.pm25, config.pm25_tolerance)
            || moved(self.ratio, previous.ratio, config.ratio_tolerance)
            || self.co_level != previous.co_level
            || self.pm25_level != previous.pm25_level
            || self.co_status != previous.co_status
            || self.pm25_status != previous.pm25_status
    }

    /// Push every gated parameter to the shadow
    pub fn publish<S: ShadowSink + ?Sized>(&self, sink: &mut S) {
        sink.update(ShadowParam::CoPpm, ShadowValue::Float(self.co_ppm));
        sink.update(ShadowParam::Pm25, ShadowValue::Float(self.pm25));
        sink.update(ShadowParam::Ratio, ShadowValue::Float(self.ratio));
        sink.update(ShadowParam::CoStatus, ShadowValue::Str(self.co_status));
        sink.update(ShadowParam::Pm25Status, ShadowValue::Str(self.pm25_status));
        sink.update(ShadowParam::MostPolluted, ShadowValue::Str(self.worst.label()));
    }
}

// A NaN on either side counts as moved so the gate cannot get stuck.
// Equal values (a saturated infinity included) never move.
fn moved(current: f32, previous: f32, tolerance: f32) -> bool {
    current != previous && !((current - previous).abs() <= tolerance)
}

/// Last report that was sent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportGate {
    last: Option<Report>,
}

impl ReportGate {
    /// Empty gate; the first report always goes out
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// True when nothing was sent yet or `report` differs from the last one
    pub fn should_push(&self, report: &Report, config: &MonitorConfig) -> bool {
        match &self.last {
            None => true,
            Some(previous) => report.differs_from(previous, config),
        }
    }

    /// Remember `report` as sent
    pub fn commit(&mut self, report: Report) {
        self.last = Some(report);
    }

    /// Report last sent, if any
    pub fn last(&self) -> Option<&Report> {
        self.last.as_ref()
    }
}
