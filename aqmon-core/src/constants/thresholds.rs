//! Severity Bands and Alert Output Levels
//!
//! Band edges are the upper bounds (exclusive) of levels 0-3; anything at or
//! above the last edge is level 4. A value exactly on an edge belongs to the
//! higher band.

/// Upper edges of the CO severity bands (ppm).
///
/// Source: carried from the firmware's CO breakpoints (EPA 8-hour CO AQI
/// breakpoints rounded to the next half ppm).
pub const CO_BANDS_PPM: [f32; 4] = [4.5, 9.5, 12.5, 15.5];

/// Upper edges of the PM2.5 severity bands (µg/m³).
///
/// Source: EPA 24-hour PM2.5 AQI breakpoints as used by the firmware.
pub const PM25_BANDS_UG_M3: [f32; 4] = [12.0, 35.4, 55.4, 150.4];

/// Status phrase for each CO level, as shown to users of the device.
pub const CO_STATUS: [&str; 5] = [
    "CO tốt.",
    "CO trung bình.",
    "CO không tốt.",
    "CO xấu. Cẩn thận!",
    "CO rất xấu! NGUY HIỂM!",
];

/// Status phrase for each PM2.5 level.
pub const PM25_STATUS: [&str; 5] = [
    "PM2.5 tốt.",
    "PM2.5 an toàn.",
    "PM2.5 trung bình.",
    "PM2.5 kém.",
    "PM2.5 rất xấu!",
];

/// Alert LED duty (0-255) per danger level.
///
/// Non-linear so the two lowest non-zero levels stay dim and the top level
/// is unmistakable.
pub const ALERT_DUTY_TABLE: [u8; 5] = [0, 255 / 16, 255 / 8, 255 / 4, 255];

/// Full-scale duty value the table is expressed in.
pub const ALERT_DUTY_MAX: u8 = 255;

/// Lowest danger level that sounds the buzzer and raises alerts.
pub const DANGER_ALERT_LEVEL: u8 = 3;

// ===== REPORT GATE =====

/// Smallest CO change (ppm) worth a cloud update.
pub const CO_REPORT_TOLERANCE_PPM: f32 = 0.1;

/// Smallest PM2.5 change (µg/m³) worth a cloud update.
pub const PM25_REPORT_TOLERANCE: f32 = 0.01;

/// Smallest Rs/R0 change worth a cloud update.
pub const RATIO_REPORT_TOLERANCE: f32 = 0.01;
