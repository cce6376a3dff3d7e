//! Collaborator Interfaces
//!
//! The monitor core only needs five things from the outside world: raw ADC
//! codes, digital outputs, one PWM channel, a character display and a cloud
//! parameter store. Digital outputs, PWM and delays use the `embedded-hal`
//! 1.0 traits directly so any HAL works unchanged. The remaining three have
//! no `embedded-hal` counterpart and are defined here.
//!
//! ## Failure model
//!
//! Display and shadow calls return nothing: the core never inspects their
//! outcome, and an implementation that can fail should log and drop.
//! ADC reads do return a result, but the sensor adapter turns a failed read
//! into a zero code rather than propagating it.

pub use embedded_hal::delay::DelayNs;
pub use embedded_hal::digital::OutputPin;
pub use embedded_hal::pwm::SetDutyCycle;

/// One analog input channel returning raw codes in `0..=ADC_MAX_CODE`
///
/// Follows the `nb` convention: an implementation whose conversion is still
/// running returns `Err(nb::Error::WouldBlock)` and is polled again.
///
/// ```rust
/// use aqmon_core::hal::AnalogChannel;
///
/// struct Fixed(u16);
///
/// impl AnalogChannel for Fixed {
///     type Error = core::convert::Infallible;
///
///     fn read(&mut self) -> nb::Result<u16, Self::Error> {
///         Ok(self.0)
///     }
/// }
/// ```
pub trait AnalogChannel {
    /// Error reported by the converter
    type Error: core::fmt::Debug;

    /// Start or poll one conversion
    fn read(&mut self) -> nb::Result<u16, Self::Error>;
}

/// Character display addressed by row and column
pub trait TextDisplay {
    /// Blank the whole display
    fn clear(&mut self);

    /// Move the cursor; subsequent writes start here
    fn set_cursor(&mut self, row: u8, col: u8);

    /// Write text at the cursor, advancing it
    fn write_str(&mut self, text: &str);
}

/// Named parameters mirrored to the cloud shadow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowParam {
    /// Averaged CO concentration (ppm)
    CoPpm,
    /// Averaged PM2.5 density (µg/m³)
    Pm25,
    /// Alerting armed flag
    Power,
    /// Latest Rs/R0 of the CO sensor
    Ratio,
    /// CO status phrase
    CoStatus,
    /// PM2.5 status phrase
    Pm25Status,
    /// Label of the pollutant driving the danger level
    MostPolluted,
}

impl ShadowParam {
    /// Every parameter, in report order
    pub const ALL: [ShadowParam; 7] = [
        ShadowParam::CoPpm,
        ShadowParam::Pm25,
        ShadowParam::Power,
        ShadowParam::Ratio,
        ShadowParam::CoStatus,
        ShadowParam::Pm25Status,
        ShadowParam::MostPolluted,
    ];

    /// Stable key used on the wire
    pub const fn key(&self) -> &'static str {
        match self {
            ShadowParam::CoPpm => "co_ppm",
            ShadowParam::Pm25 => "pm25",
            ShadowParam::Power => "power",
            ShadowParam::Ratio => "ratio",
            ShadowParam::CoStatus => "co_status",
            ShadowParam::Pm25Status => "pm25_status",
            ShadowParam::MostPolluted => "most_polluted",
        }
    }

    /// Look a parameter up by its wire key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|param| param.key() == key)
    }
}

/// Value pushed to a shadow parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadowValue<'a> {
    /// Concentration or ratio
    Float(f32),
    /// Armed state
    Bool(bool),
    /// Status phrase or pollutant label
    Str(&'a str),
}

/// Cloud mirror of the device state
pub trait ShadowSink {
    /// Report a new value for one parameter
    fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>);

    /// Raise an out-of-band alert notification
    fn raise_alert(&mut self, message: &str);
}

impl<T: ShadowSink + ?Sized> ShadowSink for &mut T {
    fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>) {
        (**self).update(param, value)
    }

    fn raise_alert(&mut self, message: &str) {
        (**self).raise_alert(message)
    }
}

impl<T: TextDisplay + ?Sized> TextDisplay for &mut T {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn set_cursor(&mut self, row: u8, col: u8) {
        (**self).set_cursor(row, col)
    }

    fn write_str(&mut self, text: &str) {
        (**self).write_str(text)
    }
}
