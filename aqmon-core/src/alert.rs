//! Alert state machine
//!
//! Decides, once per reporting cycle, what the outputs should do for the
//! current assessment:
//!
//! ```text
//!            disarmed                     armed
//!   ┌──────────────────────┐   ┌─────────────────────────────────┐
//!   │ duty 0, buzzer off,  │   │ duty = table[danger]            │
//!   │ no alert, forget the │   │ danger >= Poor → buzz           │
//!   │ previous danger      │   │ danger >= Poor and (entering    │
//!   └──────────────────────┘   │   danger or cooldown elapsed)   │
//!                              │   → raise alert                 │
//!                              └─────────────────────────────────┘
//! ```
//!
//! Entering danger means the previous cycle was below Poor, there was no
//! previous cycle, or the monitor was disarmed in between. While danger
//! persists, alerts repeat at most once per cooldown.

use core::fmt::Write;

use heapless::String;

use crate::actuation::duty_for;
use crate::classify::{Assessment, Severity};
use crate::config::MonitorConfig;
use crate::constants::buffers::ALERT_MESSAGE_CAPACITY;
use crate::time::{elapsed_ms, Timestamp};

/// What the outputs should do this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    /// Alert LED duty (0-255)
    pub duty: u8,
    /// Sound a buzzer pulse
    pub buzz: bool,
    /// Raise a cloud alert notification
    pub raise_alert: bool,
}

impl AlertDecision {
    /// Everything off
    pub const QUIET: Self = Self {
        duty: 0,
        buzz: false,
        raise_alert: false,
    };
}

/// Memory carried between reporting cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertState {
    last_danger: Option<Severity>,
    last_alert: Option<Timestamp>,
}

impl AlertState {
    /// Nothing raised yet, no danger seen
    pub const fn new() -> Self {
        Self {
            last_danger: None,
            last_alert: None,
        }
    }

    /// Run one step of the state machine
    pub fn evaluate(
        &mut self,
        armed: bool,
        assessment: &Assessment,
        now: Timestamp,
        config: &MonitorConfig,
    ) -> AlertDecision {
        if !armed {
            self.last_danger = None;
            return AlertDecision::QUIET;
        }

        let danger = assessment.danger;
        let dangerous = danger.is_dangerous();

        let entering = !matches!(self.last_danger, Some(previous) if previous.is_dangerous());
        let cooled_down = match self.last_alert {
            None => true,
            Some(at) => elapsed_ms(at, now) >= config.alert_cooldown_ms,
        };

        let raise_alert = dangerous && (entering || cooled_down);
        if raise_alert {
            self.last_alert = Some(now);
        }
        self.last_danger = Some(danger);

        AlertDecision {
            duty: duty_for(danger),
            buzz: dangerous,
            raise_alert,
        }
    }

    /// Danger seen on the last armed cycle
    pub fn last_danger(&self) -> Option<Severity> {
        self.last_danger
    }

    /// When the last alert was raised
    pub fn last_alert(&self) -> Option<Timestamp> {
        self.last_alert
    }
}

/// Alert text naming the worst pollutant
///
/// e.g. `Cảnh báo CO: 13.20 ppm - CO xấu. Cẩn thận!`. Text that does not fit
/// the fixed capacity is truncated.
pub fn alert_message(assessment: &Assessment) -> String<ALERT_MESSAGE_CAPACITY> {
    let pollutant = assessment.worst;
    let status = pollutant.status(assessment.level_of(pollutant));

    let mut message = String::new();
    let formatted = write!(
        message,
        "Cảnh báo {}: {:.2} {} - {}",
        pollutant.label(),
        assessment.value_of(pollutant),
        pollutant.unit(),
        status
    );
    if formatted.is_err() {
        log_warn!("alert message truncated");
    }
    message
}
