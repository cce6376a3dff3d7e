//! Alert LED brightness and buzzer pulses
//!
//! The LED duty follows the danger level through a fixed table. The buzzer
//! sounds in single pulses: a [`PulseTimer`] records when the current pulse
//! ends, and whoever drives the cycles polls it so the pin goes low on time
//! without a dedicated timer task.

use crate::classify::Severity;
use crate::constants::thresholds::{ALERT_DUTY_MAX, ALERT_DUTY_TABLE};
use crate::hal::{OutputPin, SetDutyCycle};
use crate::time::Timestamp;

/// Alert LED duty (0-255) for a danger level
pub fn duty_for(severity: Severity) -> u8 {
    ALERT_DUTY_TABLE[severity.level() as usize]
}

/// PWM-driven alert LED
pub struct AlertLed<P> {
    pwm: P,
    duty: u8,
}

impl<P: SetDutyCycle> AlertLed<P> {
    /// Take the channel and switch it off
    pub fn new(pwm: P) -> Self {
        let mut led = Self { pwm, duty: 0 };
        led.write(0);
        led
    }

    /// Apply an 8-bit duty
    pub fn set(&mut self, duty: u8) {
        self.duty = duty;
        self.write(duty);
    }

    /// Duty most recently applied
    pub fn duty(&self) -> u8 {
        self.duty
    }

    fn write(&mut self, duty: u8) {
        if self
            .pwm
            .set_duty_cycle_fraction(u16::from(duty), u16::from(ALERT_DUTY_MAX))
            .is_err()
        {
            log_warn!("alert LED rejected duty {}", duty);
        }
    }

    /// Give the PWM channel back
    pub fn release(self) -> P {
        self.pwm
    }
}

/// One-shot deadline for a timed output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseTimer {
    /// No pulse running
    #[default]
    Idle,
    /// Pulse running
    Active {
        /// When the pulse ends
        until: Timestamp,
    },
}

impl PulseTimer {
    /// Start a pulse; false (and no change) if one is already running
    pub fn trigger(&mut self, now: Timestamp, duration_ms: u64) -> bool {
        match self {
            PulseTimer::Active { .. } => false,
            PulseTimer::Idle => {
                *self = PulseTimer::Active {
                    until: now.saturating_add(duration_ms),
                };
                true
            }
        }
    }

    /// True exactly once, on the first poll at or after the deadline
    pub fn poll(&mut self, now: Timestamp) -> bool {
        match *self {
            PulseTimer::Active { until } if now >= until => {
                *self = PulseTimer::Idle;
                true
            }
            _ => false,
        }
    }

    /// Stop early; true if a pulse was running
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        *self = PulseTimer::Idle;
        was_active
    }

    /// Whether a pulse is running
    pub fn is_active(&self) -> bool {
        matches!(self, PulseTimer::Active { .. })
    }

    /// End of the running pulse
    pub fn deadline(&self) -> Option<Timestamp> {
        match self {
            PulseTimer::Active { until } => Some(*until),
            PulseTimer::Idle => None,
        }
    }
}

/// Buzzer on a digital pin, sounding fixed-length pulses
pub struct Buzzer<P> {
    pin: P,
    timer: PulseTimer,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take the pin and drive it low
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            log_warn!("buzzer pin did not go low");
        }
        Self {
            pin,
            timer: PulseTimer::Idle,
        }
    }

    /// Start a pulse unless one is already sounding
    ///
    /// Returns whether a new pulse started.
    pub fn trigger(&mut self, now: Timestamp, duration_ms: u64) -> bool {
        if !self.timer.trigger(now, duration_ms) {
            return false;
        }
        if self.pin.set_high().is_err() {
            log_warn!("buzzer pin did not go high");
        }
        log_debug!("buzzer on until {}", now.saturating_add(duration_ms));
        true
    }

    /// End the pulse if its deadline has passed
    ///
    /// Returns true on the poll that switched the buzzer off.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if !self.timer.poll(now) {
            return false;
        }
        self.drive_low();
        true
    }

    /// Force the buzzer off and forget any pending pulse
    pub fn silence(&mut self) {
        if self.timer.cancel() {
            log_debug!("buzzer silenced");
        }
        self.drive_low();
    }

    /// Whether the pin is driven high
    pub fn is_sounding(&self) -> bool {
        self.timer.is_active()
    }

    /// Pulse state
    pub fn timer(&self) -> PulseTimer {
        self.timer
    }

    fn drive_low(&mut self) {
        if self.pin.set_low().is_err() {
            log_warn!("buzzer pin did not go low");
        }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
