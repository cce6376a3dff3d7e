//! Sensor Adapter: raw ADC codes to calibrated concentrations
//!
//! ## CO (MQ-2 on a voltage divider)
//!
//! ```text
//!   Vref ── Rs (sensor) ──┬── RL ── GND
//!                         └── ADC
//!
//!   V   = raw / 4095 * 3.3
//!   Rs  = RL * (Vref - V) / V
//!   ppm = A * (Rs / R0)^B - offset      (clamped at 0)
//! ```
//!
//! `R0` is the clean-air baseline established by
//! [`Calibration::measure`](crate::calibration::Calibration::measure).
//!
//! ## PM2.5 (GP2Y1010AU0F)
//!
//! The optical sensor only produces a valid output while its IR LED is lit,
//! so every read is bracketed by LED on / settle / burst / LED off. Density
//! is linear in the output voltage.
//!
//! ## Failure handling
//!
//! Nothing here fails. A zero voltage (which would divide by zero in the
//! divider formula) reads as 0 ppm, a missing baseline reads as 0 ppm, and a
//! failed ADC conversion counts as a zero code for that sample.
//!
//! A full-scale code is the opposite case: Rs collapses to 0, the curve has
//! no finite value there, and the reading saturates at [`CO_SATURATED_PPM`]
//! so it classifies in the top band.

use crate::calibration::Calibration;
use crate::constants::sensors::{
    ADC_MAX_CODE, ADC_REFERENCE_V, CO_BURST_DELAY_US, CO_BURST_SAMPLES, CO_CURVE_A,
    CO_CURVE_B, CO_OFFSET_PPM, DUST_BURST_DELAY_US, DUST_BURST_SAMPLES,
    DUST_DENSITY_PER_MV, DUST_LED_SETTLE_US, LOAD_RESISTANCE_OHMS,
};
use crate::hal::{AnalogChannel, DelayNs, OutputPin};

/// CO concentration reported while the divider sits at full scale
pub const CO_SATURATED_PPM: f32 = f32::INFINITY;

/// Conversion attempts per sample before a channel that keeps answering
/// `WouldBlock` is treated as failed
pub const ADC_MAX_POLLS: u32 = 1_000;

/// Convert a raw ADC code to volts
pub fn raw_to_voltage(raw: u16) -> f32 {
    f32::from(raw.min(ADC_MAX_CODE)) / f32::from(ADC_MAX_CODE) * ADC_REFERENCE_V
}

/// Sensor resistance from the divider output voltage
///
/// Returns `None` for a non-positive voltage, where the divider formula
/// would divide by zero.
pub fn sensor_resistance(voltage: f32) -> Option<f32> {
    // Written so NaN also takes the guard
    if !(voltage > 0.0) {
        return None;
    }

    Some((LOAD_RESISTANCE_OHMS * (ADC_REFERENCE_V - voltage) / voltage).max(0.0))
}

/// Apply the MQ-2 CO curve to an Rs/R0 ratio
///
/// A non-positive ratio (no baseline, or no usable voltage) reads as 0 ppm.
pub fn co_ppm_from_ratio(ratio: f32) -> f32 {
    if !(ratio > 0.0) {
        return 0.0;
    }

    let ppm = CO_CURVE_A * libm::powf(ratio, CO_CURVE_B);
    if ppm > CO_OFFSET_PPM {
        ppm - CO_OFFSET_PPM
    } else {
        0.0
    }
}

/// Dust density (µg/m³) from the GP2Y1010 output voltage
pub fn dust_density(voltage: f32) -> f32 {
    let density = DUST_DENSITY_PER_MV * voltage * 1000.0;
    if density > 0.0 {
        density
    } else {
        0.0
    }
}

/// Average `samples` raw reads taken `delay_us` apart
///
/// A failed conversion contributes a zero code.
pub(crate) fn burst_average<A, D>(adc: &mut A, delay: &mut D, samples: u32, delay_us: u32) -> u16
where
    A: AnalogChannel,
    D: DelayNs,
{
    if samples == 0 {
        return 0;
    }

    let mut sum: u32 = 0;
    for i in 0..samples {
        if i > 0 {
            delay.delay_us(delay_us);
        }

        if let Some(raw) = read_bounded(adc) {
            sum += u32::from(raw.min(ADC_MAX_CODE));
        }
    }

    (sum / samples) as u16
}

/// One conversion, giving up after [`ADC_MAX_POLLS`] `WouldBlock` answers
fn read_bounded<A: AnalogChannel>(adc: &mut A) -> Option<u16> {
    for _ in 0..ADC_MAX_POLLS {
        match adc.read() {
            Ok(raw) => return Some(raw),
            Err(nb::Error::WouldBlock) => continue,
            Err(nb::Error::Other(_e)) => {
                log_warn!("ADC read failed, counting as zero: {:?}", _e);
                return None;
            }
        }
    }

    log_warn!("ADC conversion never completed, counting as zero");
    None
}

/// One CO measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoReading {
    /// Averaged raw code of the burst
    pub raw: u16,
    /// Rs/R0 for the burst, 0 when not computable
    pub ratio: f32,
    /// CO concentration (ppm), never negative; [`CO_SATURATED_PPM`] at
    /// full scale
    pub ppm: f32,
}

impl CoReading {
    /// Convert an averaged raw code using the given baseline
    pub fn from_raw(raw: u16, calibration: &Calibration) -> Self {
        let rs = sensor_resistance(raw_to_voltage(raw));
        let ratio = rs.map(|rs| calibration.ratio(rs)).unwrap_or(0.0);

        let saturated = calibration.is_calibrated() && matches!(rs, Some(rs) if rs <= 0.0);
        let ppm = if saturated {
            log_warn!("MQ-2 at full scale (raw {}), CO reading saturated", raw);
            CO_SATURATED_PPM
        } else {
            co_ppm_from_ratio(ratio)
        };

        Self { raw, ratio, ppm }
    }
}

/// MQ-2 gas sensor read through one ADC channel
pub struct GasSensor<A> {
    adc: A,
}

impl<A: AnalogChannel> GasSensor<A> {
    /// Take ownership of the channel
    pub fn new(adc: A) -> Self {
        Self { adc }
    }

    /// Averaged raw code over a burst of `samples` reads
    pub fn read_raw<D: DelayNs>(&mut self, delay: &mut D, samples: u32, delay_us: u32) -> u16 {
        burst_average(&mut self.adc, delay, samples, delay_us)
    }

    /// Measure CO with a 10-read burst
    pub fn read_co<D: DelayNs>(&mut self, delay: &mut D, calibration: &Calibration) -> CoReading {
        let raw = self.read_raw(delay, CO_BURST_SAMPLES, CO_BURST_DELAY_US);
        CoReading::from_raw(raw, calibration)
    }

    /// Establish the clean-air baseline on this sensor's channel
    pub fn calibrate<D: DelayNs>(&mut self, delay: &mut D) -> Calibration {
        Calibration::measure(&mut self.adc, delay)
    }

    /// Give the ADC channel back
    pub fn release(self) -> A {
        self.adc
    }
}

/// GP2Y1010 optical dust sensor: one ADC channel plus its IR LED
pub struct DustSensor<A, P> {
    adc: A,
    led: P,
}

impl<A: AnalogChannel, P: OutputPin> DustSensor<A, P> {
    /// Take ownership of the channel and LED; the LED is switched off
    pub fn new(adc: A, mut led: P) -> Self {
        if led.set_low().is_err() {
            log_warn!("dust sensor LED did not switch off");
        }
        Self { adc, led }
    }

    /// Measure PM2.5 density (µg/m³) with the LED bracketed around a burst
    pub fn read_pm25<D: DelayNs>(&mut self, delay: &mut D) -> f32 {
        if self.led.set_high().is_err() {
            log_warn!("dust sensor LED did not switch on");
        }
        delay.delay_us(DUST_LED_SETTLE_US);

        let raw = burst_average(&mut self.adc, delay, DUST_BURST_SAMPLES, DUST_BURST_DELAY_US);

        if self.led.set_low().is_err() {
            log_warn!("dust sensor LED did not switch off");
        }

        dust_density(raw_to_voltage(raw))
    }

    /// Give the channel and LED back
    pub fn release(self) -> (A, P) {
        (self.adc, self.led)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Scripted<'a> {
        codes: &'a [u16],
        next: usize,
    }

    impl AnalogChannel for Scripted<'_> {
        type Error = Infallible;

        fn read(&mut self) -> nb::Result<u16, Self::Error> {
            let code = self.codes[self.next % self.codes.len()];
            self.next += 1;
            Ok(code)
        }
    }

    struct Failing;

    impl AnalogChannel for Failing {
        type Error = ();

        fn read(&mut self) -> nb::Result<u16, Self::Error> {
            Err(nb::Error::Other(()))
        }
    }

    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[test]
    fn voltage_scaling() {
        assert_eq!(raw_to_voltage(0), 0.0);
        assert!((raw_to_voltage(4095) - 3.3).abs() < 1e-6);
        // Codes above full scale are clamped
        assert_eq!(raw_to_voltage(u16::MAX), raw_to_voltage(4095));
    }

    #[test]
    fn zero_voltage_is_guarded() {
        assert_eq!(sensor_resistance(0.0), None);
        assert_eq!(sensor_resistance(-1.0), None);
        assert_eq!(sensor_resistance(f32::NAN), None);

        let reading = CoReading::from_raw(0, &Calibration::from_baseline(1000.0));
        assert_eq!(reading.ppm, 0.0);
        assert_eq!(reading.ratio, 0.0);
    }

    #[test]
    fn divider_at_half_scale_equals_load() {
        // V = Vref / 2 means Rs == RL
        let rs = sensor_resistance(ADC_REFERENCE_V / 2.0).unwrap();
        assert!((rs - LOAD_RESISTANCE_OHMS).abs() < 1e-2);
    }

    #[test]
    fn co_curve_clamps_at_zero() {
        // Clean air: ratio 3.0 → 87.9 * 3^-1.29 ≈ 21.1, minus 17 ≈ 4.1 ppm
        let clean = co_ppm_from_ratio(3.0);
        assert!(clean > 3.5 && clean < 4.5, "clean air reads {}", clean);

        // Large ratios fall below the offset
        assert_eq!(co_ppm_from_ratio(10.0), 0.0);
        assert_eq!(co_ppm_from_ratio(0.0), 0.0);
        assert_eq!(co_ppm_from_ratio(f32::NAN), 0.0);

        // Smaller ratio means more gas
        assert!(co_ppm_from_ratio(1.0) > co_ppm_from_ratio(2.0));
    }

    #[test]
    fn dust_density_is_linear_and_clamped() {
        assert!((dust_density(0.5) - 85.0).abs() < 1e-3);
        assert_eq!(dust_density(0.0), 0.0);
        assert_eq!(dust_density(-0.2), 0.0);
    }

    #[test]
    fn burst_averages_and_spaces_reads() {
        let mut adc = Scripted { codes: &[100, 200, 300], next: 0 };
        let mut delay = CountingDelay { total_ns: 0 };

        let raw = burst_average(&mut adc, &mut delay, 3, 5_000);

        assert_eq!(raw, 200);
        assert_eq!(adc.next, 3);
        // Two gaps between three reads
        assert_eq!(delay.total_ns, 10_000_000);
    }

    struct NeverReady {
        polls: u32,
    }

    impl AnalogChannel for NeverReady {
        type Error = Infallible;

        fn read(&mut self) -> nb::Result<u16, Self::Error> {
            self.polls += 1;
            Err(nb::Error::WouldBlock)
        }
    }

    #[test]
    fn stalled_conversion_gives_up() {
        let mut adc = NeverReady { polls: 0 };
        let mut delay = CountingDelay { total_ns: 0 };

        assert_eq!(burst_average(&mut adc, &mut delay, 3, 1), 0);
        assert_eq!(adc.polls, 3 * ADC_MAX_POLLS);
    }

    #[test]
    fn full_scale_saturates_to_hazardous() {
        let calibration = Calibration::from_raw(2048);

        let near = CoReading::from_raw(4094, &calibration);
        let full = CoReading::from_raw(4095, &calibration);

        assert_eq!(crate::classify::classify_co(near.ppm), crate::classify::Severity::Hazardous);
        assert_eq!(full.ratio, 0.0);
        assert_eq!(full.ppm, CO_SATURATED_PPM);
        assert_eq!(crate::classify::classify_co(full.ppm), crate::classify::Severity::Hazardous);
        assert!(full.ppm >= near.ppm);

        // Without a baseline there is nothing to saturate against
        assert_eq!(CoReading::from_raw(4095, &Calibration::uncalibrated()).ppm, 0.0);
    }

    #[test]
    fn failed_reads_count_as_zero() {
        let mut delay = CountingDelay { total_ns: 0 };
        assert_eq!(burst_average(&mut Failing, &mut delay, 10, 1), 0);

        let mut sensor = GasSensor::new(Failing);
        let reading = sensor.read_co(&mut delay, &Calibration::from_baseline(1000.0));
        assert_eq!(reading.ppm, 0.0);
    }

    #[test]
    fn co_reading_uses_baseline() {
        let codes = [2048u16];
        let mut sensor = GasSensor::new(Scripted { codes: &codes, next: 0 });
        let mut delay = CountingDelay { total_ns: 0 };

        // Baseline equal to Rs at this code gives ratio 1.0
        let rs = sensor_resistance(raw_to_voltage(2048)).unwrap();
        let reading = sensor.read_co(&mut delay, &Calibration::from_baseline(rs));

        assert!((reading.ratio - 1.0).abs() < 1e-4);
        assert!((reading.ppm - (CO_CURVE_A - CO_OFFSET_PPM)).abs() < 1e-2);
    }
}
