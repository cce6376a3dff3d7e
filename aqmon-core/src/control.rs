//! Arming and disarming the alert outputs
//!
//! Two inputs change the armed flag: a push button that toggles it and a
//! remote write that sets it to an explicit value. Both arrive as
//! [`ArmEvent`]s on a bounded channel and are applied by one consumer, the
//! [`ArmController`], so the flag has a single writer. The reporting cycle
//! only reads it.
//!
//! Button presses bounce. A toggle that follows the last accepted toggle by
//! less than the debounce window is dropped. Remote writes carry an explicit
//! value and are never debounced.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::MonitorConfig;
use crate::hal::OutputPin;
use crate::time::{elapsed_ms, Timestamp};

/// Requested change to the armed flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmCommand {
    /// Flip the flag (button press)
    Toggle,
    /// Force the flag (remote write)
    Set(bool),
}

/// An [`ArmCommand`] stamped with the time it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmEvent {
    /// What was requested
    pub command: ArmCommand,
    /// When it was observed
    pub at: Timestamp,
}

impl ArmEvent {
    /// Button press
    pub const fn toggle(at: Timestamp) -> Self {
        Self {
            command: ArmCommand::Toggle,
            at,
        }
    }

    /// Remote write of the power parameter
    pub const fn set(armed: bool, at: Timestamp) -> Self {
        Self {
            command: ArmCommand::Set(armed),
            at,
        }
    }
}

/// Whether alert outputs are enabled
///
/// Written by the arm controller, read by the reporting cycle.
#[derive(Debug, Default)]
pub struct ArmedFlag(AtomicBool);

impl ArmedFlag {
    /// Flag starting at `armed`
    pub const fn new(armed: bool) -> Self {
        Self(AtomicBool::new(armed))
    }

    /// Whether alert outputs are enabled
    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Store a new armed state
    pub fn set(&self, armed: bool) {
        self.0.store(armed, Ordering::Release);
    }

    /// Flip the flag and return the new value
    ///
    /// Load then store: only valid with a single writer.
    pub fn toggle(&self) -> bool {
        let armed = !self.is_armed();
        self.set(armed);
        armed
    }
}

/// Single consumer of arm events, owning the mode indicator LED
pub struct ArmController<P> {
    led: P,
    debounce_ms: u64,
    last_toggle: Option<Timestamp>,
}

impl<P: OutputPin> ArmController<P> {
    /// Build the controller and show the current flag on the LED
    pub fn new(led: P, flag: &ArmedFlag, config: &MonitorConfig) -> Self {
        let mut controller = Self {
            led,
            debounce_ms: config.debounce_ms,
            last_toggle: None,
        };
        controller.show(flag.is_armed());
        controller
    }

    /// Apply one event
    ///
    /// Returns the new armed value, or `None` when the event was debounced.
    pub fn handle(&mut self, event: ArmEvent, flag: &ArmedFlag) -> Option<bool> {
        let armed = match event.command {
            ArmCommand::Toggle => {
                if let Some(last) = self.last_toggle {
                    if elapsed_ms(last, event.at) <= self.debounce_ms {
                        log_debug!("toggle at {} debounced", event.at);
                        return None;
                    }
                }
                self.last_toggle = Some(event.at);
                flag.toggle()
            }
            ArmCommand::Set(armed) => {
                flag.set(armed);
                armed
            }
        };

        self.show(armed);
        log_info!("Alert mode {}", if armed { "ON" } else { "OFF" });
        Some(armed)
    }

    fn show(&mut self, armed: bool) {
        let result = if armed {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        if result.is_err() {
            log_warn!("mode LED write failed");
        }
    }

    /// Give the mode LED back
    pub fn release(self) -> P {
        self.led
    }
}
