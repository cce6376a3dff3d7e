//! The two monitor cycles
//!
//! ## Overview
//!
//! ```text
//!   Sampler (every 200 ms)              Reporter (every 1000 ms)
//!   ┌─────────────────────┐             ┌──────────────────────────────┐
//!   │ CO burst  → ppm,    │             │ averages → display           │
//!   │            Rs/R0    │──Samples──► │ assess   → alert state       │
//!   │ dust burst → µg/m³  │  (atomic)   │          → LED, buzzer, alert│
//!   └─────────────────────┘             │ power    → shadow (always)   │
//!                                       │ report   → shadow (gated)    │
//!                          ArmedFlag ──►└──────────────────────────────┘
//! ```
//!
//! Each cycle owns its hardware outright. They share nothing but the
//! [`Samples`] buffers and the armed flag, so they can run on different
//! threads or tasks without locks. Neither cycle can fail: sensor faults
//! read as zero and collaborator calls are fire-and-forget.
//!
//! ## Cadence
//!
//! Cycles do not sleep between runs; the caller invokes them on its own
//! timer and passes the current time in. The buzzer should be polled more
//! often than the report cadence (see [`Reporter::poll_buzzer`]) so pulses
//! end on time.

use core::fmt::Write;

use heapless::String;

use crate::actuation::{AlertLed, Buzzer};
use crate::alert::{alert_message, AlertDecision, AlertState};
use crate::buffer::Samples;
use crate::calibration::Calibration;
use crate::classify::Assessment;
use crate::config::MonitorConfig;
use crate::constants::buffers::LINE_CAPACITY;
use crate::errors::MonitorResult;
use crate::hal::{
    AnalogChannel, DelayNs, OutputPin, SetDutyCycle, ShadowParam, ShadowSink, ShadowValue,
    TextDisplay,
};
use crate::report::{Report, ReportGate};
use crate::sensor::{CoReading, DustSensor, GasSensor};
use crate::time::Timestamp;

/// One pass of the sampling cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleReading {
    /// CO burst result
    pub co: CoReading,
    /// PM2.5 density (µg/m³)
    pub pm25: f32,
}

/// Short cycle: reads both sensors and feeds the smoothing buffers
pub struct Sampler<G, A, L, D> {
    gas: GasSensor<G>,
    dust: DustSensor<A, L>,
    delay: D,
    calibration: Calibration,
}

impl<G, A, L, D> Sampler<G, A, L, D>
where
    G: AnalogChannel,
    A: AnalogChannel,
    L: OutputPin,
    D: DelayNs,
{
    /// Build an uncalibrated sampler
    pub fn new(gas_adc: G, dust_adc: A, dust_led: L, delay: D) -> Self {
        Self {
            gas: GasSensor::new(gas_adc),
            dust: DustSensor::new(dust_adc, dust_led),
            delay,
            calibration: Calibration::uncalibrated(),
        }
    }

    /// Skip startup calibration and use a known baseline
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Run the clean-air calibration; must precede the first report
    pub fn calibrate(&mut self) -> Calibration {
        self.calibration = self.gas.calibrate(&mut self.delay);
        self.calibration
    }

    /// Baseline in use
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Read both sensors once and record the results
    pub fn sample(&mut self, samples: &Samples) -> SampleReading {
        let co = self.gas.read_co(&mut self.delay, &self.calibration);
        samples.record_co(co.ppm, co.ratio);

        let pm25 = self.dust.read_pm25(&mut self.delay);
        samples.record_pm25(pm25);

        log_debug!("sample: CO {} ppm (ratio {}), PM2.5 {}", co.ppm, co.ratio, pm25);

        SampleReading { co, pm25 }
    }

    /// Borrow the delay provider, e.g. for bootstrap pauses
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}

/// What one reporting cycle did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Grades of the averaged readings
    pub assessment: Assessment,
    /// Outputs chosen for this cycle
    pub decision: AlertDecision,
    /// A new buzzer pulse started this cycle
    pub buzzer_started: bool,
    /// The gated report went out to the shadow
    pub pushed: bool,
}

/// Long cycle: display, alerting and cloud reporting
pub struct Reporter<W, B, T, S> {
    config: MonitorConfig,
    alert: AlertState,
    gate: ReportGate,
    led: AlertLed<W>,
    buzzer: Buzzer<B>,
    display: T,
    sink: S,
}

impl<W, B, T, S> Reporter<W, B, T, S>
where
    W: SetDutyCycle,
    B: OutputPin,
    T: TextDisplay,
    S: ShadowSink,
{
    /// Build a reporter; the LED and buzzer start switched off
    pub fn new(config: MonitorConfig, pwm: W, buzzer: B, display: T, sink: S) -> MonitorResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            alert: AlertState::new(),
            gate: ReportGate::new(),
            led: AlertLed::new(pwm),
            buzzer: Buzzer::new(buzzer),
            display,
            sink,
        })
    }

    /// Run one reporting cycle
    ///
    /// Does nothing and returns `None` until the first CO sample exists.
    pub fn report(&mut self, samples: &Samples, armed: bool, now: Timestamp) -> Option<CycleReport> {
        if samples.co.is_empty() {
            return None;
        }

        self.buzzer.poll(now);

        let co_ppm = samples.co.average();
        let pm25 = samples.pm25.average();
        self.render(co_ppm, pm25);

        let assessment = Assessment::evaluate(co_ppm, pm25);
        let decision = self.alert.evaluate(armed, &assessment, now, &self.config);

        self.led.set(decision.duty);
        let buzzer_started = if decision.buzz {
            self.buzzer.trigger(now, self.config.buzzer_pulse_ms)
        } else {
            self.buzzer.silence();
            false
        };

        if decision.raise_alert {
            let message = alert_message(&assessment);
            log_warn!("{}", message.as_str());
            self.sink.raise_alert(&message);
        }

        self.sink.update(ShadowParam::Power, ShadowValue::Bool(armed));

        let report = Report::new(&assessment, samples.latest_ratio());
        let pushed = self.gate.should_push(&report, &self.config);
        if pushed {
            report.publish(&mut self.sink);
            self.gate.commit(report);
        }

        Some(CycleReport {
            assessment,
            decision,
            buzzer_started,
            pushed,
        })
    }

    /// End an expired buzzer pulse; true when it was switched off
    pub fn poll_buzzer(&mut self, now: Timestamp) -> bool {
        self.buzzer.poll(now)
    }

    /// Replace the display content with one line of text
    pub fn show_banner(&mut self, text: &str) {
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.write_str(text);
    }

    fn render(&mut self, co_ppm: f32, pm25: f32) {
        let columns = self.config.display_columns.min(LINE_CAPACITY);
        let mut line: String<LINE_CAPACITY> = String::new();

        if format_line(&mut line, format_args!("CO: {:.2}", co_ppm), columns).is_err() {
            log_warn!("CO row truncated: {}", co_ppm);
        }
        self.display.set_cursor(0, 0);
        self.display.write_str(&line);

        if format_line(&mut line, format_args!("PM2.5: {:.3}", pm25), columns).is_err() {
            log_warn!("PM2.5 row truncated: {}", pm25);
        }
        self.display.set_cursor(1, 0);
        self.display.write_str(&line);
    }

    /// Configuration in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Alert memory carried between cycles
    pub fn alert_state(&self) -> &AlertState {
        &self.alert
    }

    /// Current alert LED duty (0-255)
    pub fn led_duty(&self) -> u8 {
        self.led.duty()
    }

    /// Whether a buzzer pulse is running
    pub fn buzzer_sounding(&self) -> bool {
        self.buzzer.is_sounding()
    }

    /// The display
    pub fn display(&self) -> &T {
        &self.display
    }

    /// The shadow sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The shadow sink, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

// Replace `line` with `args` fitted to `columns`. The line is always
// usable; the error only reports that the text did not fit the buffer.
fn format_line(
    line: &mut String<LINE_CAPACITY>,
    args: core::fmt::Arguments<'_>,
    columns: usize,
) -> core::fmt::Result {
    line.clear();
    let written = line.write_fmt(args);
    pad_line(line, columns);
    written
}

// Pad with spaces so a shorter value erases the previous digits. Lines are
// ASCII, so truncating at a byte index is safe.
fn pad_line(line: &mut String<LINE_CAPACITY>, columns: usize) {
    line.truncate(columns);
    while line.len() < columns {
        if line.push(' ').is_err() {
            break;
        }
    }
}
