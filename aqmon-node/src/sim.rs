//! Simulated hardware
//!
//! Stand-ins for the ADC channels, GPIO pins, PWM channel and the 16x2
//! character display. Outputs log their changes; the ADC replays a base
//! code with a little deterministic noise so the smoothing is visible.

use std::convert::Infallible;
use std::time::Duration;

use aqmon_core::constants::sensors::ADC_MAX_CODE;
use aqmon_core::hal::{AnalogChannel, DelayNs, OutputPin, SetDutyCycle, TextDisplay};

/// ADC channel returning `base ± jitter`
#[derive(Debug, Clone)]
pub struct SimAdc {
    base: u16,
    jitter: u16,
    state: u32,
}

impl SimAdc {
    pub fn new(base: u16, jitter: u16, seed: u32) -> Self {
        Self {
            base: base.min(ADC_MAX_CODE),
            jitter,
            // xorshift cannot leave zero
            state: seed.max(1),
        }
    }

    fn next_random(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl AnalogChannel for SimAdc {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        if self.jitter == 0 {
            return Ok(self.base);
        }

        let span = u32::from(self.jitter) * 2 + 1;
        let offset = (self.next_random() % span) as i32 - i32::from(self.jitter);
        let code = (i32::from(self.base) + offset).clamp(0, i32::from(ADC_MAX_CODE));
        Ok(code as u16)
    }
}

/// Digital output that logs level changes
#[derive(Debug)]
pub struct LogPin {
    name: &'static str,
    high: bool,
    quiet: bool,
}

impl LogPin {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            high: false,
            quiet: false,
        }
    }

    /// Log at trace level only (for pins that flip every sample)
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    fn write(&mut self, high: bool) {
        if self.high == high {
            return;
        }
        self.high = high;

        let level = if high { "HIGH" } else { "LOW" };
        if self.quiet {
            log::trace!("{} -> {}", self.name, level);
        } else {
            log::info!("{} -> {}", self.name, level);
        }
    }
}

impl embedded_hal::digital::ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// 8-bit PWM channel that logs duty changes
#[derive(Debug)]
pub struct LogPwm {
    name: &'static str,
    duty: u16,
}

impl LogPwm {
    pub fn new(name: &'static str) -> Self {
        Self { name, duty: 0 }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl embedded_hal::pwm::ErrorType for LogPwm {
    type Error = Infallible;
}

impl SetDutyCycle for LogPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if duty != self.duty {
            log::info!("{} duty {}/255", self.name, duty);
        }
        self.duty = duty;
        Ok(())
    }
}

/// Character display kept in memory and logged after each row write
#[derive(Debug)]
pub struct LogDisplay {
    rows: Vec<Vec<char>>,
    columns: usize,
    cursor: (usize, usize),
}

impl LogDisplay {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec![' '; columns]; rows],
            columns,
            cursor: (0, 0),
        }
    }

    pub fn row(&self, index: usize) -> String {
        self.rows
            .get(index)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }
}

impl TextDisplay for LogDisplay {
    fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, row: u8, col: u8) {
        self.cursor = (usize::from(row), usize::from(col));
    }

    fn write_str(&mut self, text: &str) {
        let (row, col) = self.cursor;
        let Some(cells) = self.rows.get_mut(row) else {
            return;
        };

        // Characters past the last column are lost, as on the real panel
        let mut written = 0;
        for (cell, ch) in cells.iter_mut().skip(col).zip(text.chars()) {
            *cell = ch;
            written += 1;
        }
        self.cursor.1 = (col + written).min(self.columns);

        log::debug!("LCD[{}] |{}|", row, self.row(row));
    }
}

/// Delay backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
