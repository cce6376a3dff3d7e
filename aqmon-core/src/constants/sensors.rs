//! Sensor Front-End Constants
//!
//! Constants for the MQ-2 gas sensor (CO channel) and the Sharp GP2Y1010AU0F
//! optical dust sensor, both read through a 12-bit SAR ADC with 11 dB
//! attenuation.

// ===== ADC =====

/// Largest code the 12-bit ADC returns.
pub const ADC_MAX_CODE: u16 = 4095;

/// Full-scale voltage of the ADC input (V).
///
/// With 11 dB attenuation the ESP32 ADC spans roughly 0-3.3 V.
pub const ADC_REFERENCE_V: f32 = 3.3;

// ===== MQ-2 (CO) =====

/// Load resistor on the MQ-2 voltage divider (Ω).
pub const LOAD_RESISTANCE_OHMS: f32 = 5000.0;

/// Rs/R0 of the MQ-2 in clean air.
///
/// Source: MQ-2 datasheet sensitivity curve (flat "air" line).
pub const CLEAN_AIR_RATIO: f32 = 3.0;

/// Multiplier `A` of the CO curve `ppm = A * (Rs/R0)^B`.
///
/// Source: power-law fit of the MQ-2 CO sensitivity curve.
pub const CO_CURVE_A: f32 = 87.905_49;

/// Exponent `B` of the CO curve `ppm = A * (Rs/R0)^B`.
pub const CO_CURVE_B: f32 = -1.289_602_6;

/// Offset subtracted from the curve output (ppm).
///
/// The curve reads about 17 ppm in clean air on this board; readings at or
/// below the offset are reported as 0 ppm.
pub const CO_OFFSET_PPM: f32 = 17.0;

/// Raw reads averaged per CO measurement.
pub const CO_BURST_SAMPLES: u32 = 10;

/// Delay between raw CO reads (µs).
pub const CO_BURST_DELAY_US: u32 = 5_000;

// ===== CALIBRATION =====

/// Raw reads averaged while establishing the clean-air baseline.
pub const CALIBRATION_SAMPLES: u32 = 50;

/// Delay between calibration reads (ms).
pub const CALIBRATION_DELAY_MS: u32 = 10;

// ===== GP2Y1010 (PM2.5) =====

/// Time the IR LED must be on before the output is valid (µs).
///
/// Source: GP2Y1010AU0F datasheet, sampling 0.28 ms after LED pulse start.
pub const DUST_LED_SETTLE_US: u32 = 280;

/// Raw reads averaged per dust measurement.
pub const DUST_BURST_SAMPLES: u32 = 10;

/// Delay between raw dust reads (µs).
pub const DUST_BURST_DELAY_US: u32 = 2_000;

/// Dust density per output millivolt (µg/m³ per mV).
///
/// Linear approximation of the datasheet output-voltage curve.
pub const DUST_DENSITY_PER_MV: f32 = 0.17;
