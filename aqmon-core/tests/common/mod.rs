//! Mock hardware for integration tests
//!
//! Every mock that ends up owned by a monitor component hands out a cloneable
//! probe, so a test can keep one handle and inspect what the component did
//! to the "pins" after giving the other handle away.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use aqmon_core::hal::{
    AnalogChannel, DelayNs, OutputPin, SetDutyCycle, ShadowParam, ShadowSink, ShadowValue,
    TextDisplay,
};
use aqmon_core::{MonitorConfig, Reporter};

/// ADC channel replaying a fixed list of codes forever
pub struct ScriptedAdc {
    codes: Vec<u16>,
    next: usize,
    reads: Rc<Cell<u32>>,
}

impl ScriptedAdc {
    pub fn new(codes: &[u16]) -> Self {
        Self {
            codes: codes.to_vec(),
            next: 0,
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn constant(code: u16) -> Self {
        Self::new(&[code])
    }

    /// Shared read counter
    pub fn reads(&self) -> Rc<Cell<u32>> {
        self.reads.clone()
    }
}

impl AnalogChannel for ScriptedAdc {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        let code = self.codes[self.next % self.codes.len()];
        self.next += 1;
        self.reads.set(self.reads.get() + 1);
        Ok(code)
    }
}

#[derive(Debug, Default)]
pub struct PinState {
    pub high: bool,
    pub rises: u32,
    pub falls: u32,
}

/// Digital output recording its level and edges
#[derive(Clone, Default)]
pub struct MockPin(Rc<RefCell<PinState>>);

impl MockPin {
    pub fn is_high(&self) -> bool {
        self.0.borrow().high
    }

    pub fn rises(&self) -> u32 {
        self.0.borrow().rises
    }

    pub fn falls(&self) -> u32 {
        self.0.borrow().falls
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if state.high {
            state.falls += 1;
        }
        state.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if !state.high {
            state.rises += 1;
        }
        state.high = true;
        Ok(())
    }
}

/// 8-bit PWM channel remembering the last duty
#[derive(Clone, Default)]
pub struct MockPwm(Rc<Cell<u16>>);

impl MockPwm {
    pub fn duty(&self) -> u16 {
        self.0.get()
    }
}

impl embedded_hal::pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.0.set(duty);
        Ok(())
    }
}

/// Two-row character display kept as strings
#[derive(Debug, Default)]
pub struct MockDisplay {
    rows: [String; 2],
    cursor: (usize, usize),
    pub clears: u32,
}

impl MockDisplay {
    pub fn row(&self, index: usize) -> &str {
        &self.rows[index]
    }
}

impl TextDisplay for MockDisplay {
    fn clear(&mut self) {
        self.rows = Default::default();
        self.cursor = (0, 0);
        self.clears += 1;
    }

    fn set_cursor(&mut self, row: u8, col: u8) {
        self.cursor = (row as usize, col as usize);
    }

    fn write_str(&mut self, text: &str) {
        let (row, col) = self.cursor;
        let mut chars: Vec<char> = self.rows[row].chars().collect();
        if chars.len() < col {
            chars.resize(col, ' ');
        }
        for (offset, ch) in text.chars().enumerate() {
            match chars.get_mut(col + offset) {
                Some(slot) => *slot = ch,
                None => chars.push(ch),
            }
        }
        self.rows[row] = chars.into_iter().collect();
        self.cursor.1 = col + text.chars().count();
    }
}

/// Owned copy of a pushed shadow value
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Float(f32),
    Bool(bool),
    Str(String),
}

/// Shadow sink recording every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<(ShadowParam, Recorded)>,
    pub alerts: Vec<String>,
}

impl RecordingSink {
    /// Number of updates of one parameter
    pub fn count(&self, param: ShadowParam) -> usize {
        self.updates.iter().filter(|(p, _)| *p == param).count()
    }

    /// Most recent value pushed for one parameter
    pub fn last(&self, param: ShadowParam) -> Option<&Recorded> {
        self.updates
            .iter()
            .rev()
            .find(|(p, _)| *p == param)
            .map(|(_, value)| value)
    }

    pub fn clear(&mut self) {
        self.updates.clear();
        self.alerts.clear();
    }
}

impl ShadowSink for RecordingSink {
    fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>) {
        let recorded = match value {
            ShadowValue::Float(v) => Recorded::Float(v),
            ShadowValue::Bool(v) => Recorded::Bool(v),
            ShadowValue::Str(v) => Recorded::Str(v.to_string()),
        };
        self.updates.push((param, recorded));
    }

    fn raise_alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Delay that returns immediately, counting requested time
#[derive(Clone, Default)]
pub struct NoDelay(Rc<Cell<u64>>);

impl NoDelay {
    pub fn total_ns(&self) -> u64 {
        self.0.get()
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }
}

pub type TestReporter = Reporter<MockPwm, MockPin, MockDisplay, RecordingSink>;

/// Reporter on mock hardware plus probes for its PWM and buzzer pin
pub fn reporter() -> (TestReporter, MockPwm, MockPin) {
    reporter_with(MonitorConfig::default())
}

pub fn reporter_with(config: MonitorConfig) -> (TestReporter, MockPwm, MockPin) {
    let pwm = MockPwm::default();
    let buzzer = MockPin::default();
    let reporter = Reporter::new(
        config,
        pwm.clone(),
        buzzer.clone(),
        MockDisplay::default(),
        RecordingSink::default(),
    )
    .expect("default config is valid");

    (reporter, pwm, buzzer)
}
