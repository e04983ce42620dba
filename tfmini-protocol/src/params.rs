//! Command parameters
//!
//! Enumerated settings map one-to-one onto the byte the sensor expects.
//! Numeric settings are range-checked here before any frame is touched.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output period granularity in milliseconds
pub const OUTPUT_PERIOD_STEP_MS: u16 = 10;

/// Smallest enabled range limit in millimetres
pub const RANGE_LIMIT_MIN_MM: u16 = 300;

/// Largest range limit in millimetres
pub const RANGE_LIMIT_MAX_MM: u16 = 12_000;

/// Largest accepted low signal-strength threshold
pub const STRENGTH_LOW_MAX: u8 = 80;

/// Largest accepted high signal-strength threshold
pub const STRENGTH_HIGH_MAX: u16 = 3_000;

/// Parameter rejected before anything was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// Output period is not a multiple of 10 ms
    InvalidPeriod(u16),
    /// Range limit is neither 0 nor within 300..=12000 mm
    InvalidRangeLimit(u16),
    /// Low signal-strength threshold above 80
    InvalidLowThreshold(u8),
    /// High signal-strength threshold above 3000
    InvalidHighThreshold(u16),
    /// Byte does not name a known setting
    UnknownCode(u8),
}

/// Check an output period in milliseconds
pub fn validate_output_period(period_ms: u16) -> Result<u16, ParamError> {
    if period_ms % OUTPUT_PERIOD_STEP_MS == 0 {
        Ok(period_ms)
    } else {
        Err(ParamError::InvalidPeriod(period_ms))
    }
}

/// Check a range limit in millimetres (0 disables the limit)
pub fn validate_range_limit(range_mm: u16) -> Result<u16, ParamError> {
    match range_mm {
        0 | RANGE_LIMIT_MIN_MM..=RANGE_LIMIT_MAX_MM => Ok(range_mm),
        _ => Err(ParamError::InvalidRangeLimit(range_mm)),
    }
}

/// Check a low signal-strength threshold
pub fn validate_strength_low(threshold: u8) -> Result<u8, ParamError> {
    if threshold <= STRENGTH_LOW_MAX {
        Ok(threshold)
    } else {
        Err(ParamError::InvalidLowThreshold(threshold))
    }
}

/// Check a high signal-strength threshold
pub fn validate_strength_high(threshold: u16) -> Result<u16, ParamError> {
    if threshold <= STRENGTH_HIGH_MAX {
        Ok(threshold)
    } else {
        Err(ParamError::InvalidHighThreshold(threshold))
    }
}

/// Defines a byte-coded setting with `code()` and `TryFrom<u8>`
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Byte sent to the sensor
            pub const fn code(self) -> u8 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ParamError;

            fn try_from(code: u8) -> Result<Self, ParamError> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    other => Err(ParamError::UnknownCode(other)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }
    };
}

wire_enum! {
    /// Layout of the measurement frames the sensor streams
    pub enum OutputDataFormat {
        /// 9-byte binary frame (`59 59 ...`)
        Standard = 0x01,
        /// Text output for Pixhawk flight controllers
        Pixhawk = 0x04,
    }
}

wire_enum! {
    /// Unit of the reported distance
    pub enum DistanceUnit {
        /// Millimetres
        Millimeter = 0x00,
        /// Centimetres (factory default)
        Centimeter = 0x01,
    }
}

wire_enum! {
    /// How the sensor picks its distance mode
    pub enum DetectionPattern {
        /// Sensor switches distance mode on its own
        Auto = 0x00,
        /// Distance mode is fixed by the host
        Fix = 0x01,
    }
}

wire_enum! {
    /// Distance mode, both as a setting and as reported in measurement frames
    pub enum DistanceMode {
        /// Short range, 16x integration
        Short16x = 0x00,
        /// Short range, 15x integration
        Short15x = 0x02,
        /// Middle range, 16x integration
        Middle16x = 0x03,
        /// Long range
        Long = 0x07,
    }
}

wire_enum! {
    /// Serial baud rate
    pub enum BaudRate {
        /// 9600 bps
        B9600 = 0x00,
        /// 14400 bps
        B14400 = 0x01,
        /// 19200 bps
        B19200 = 0x02,
        /// 38400 bps
        B38400 = 0x03,
        /// 56000 bps
        B56000 = 0x04,
        /// 57600 bps
        B57600 = 0x05,
        /// 115200 bps (factory default)
        B115200 = 0x06,
        /// 128000 bps
        B128000 = 0x07,
        /// 230400 bps
        B230400 = 0x08,
        /// 256000 bps
        B256000 = 0x09,
        /// 460800 bps
        B460800 = 0x0A,
        /// 500000 bps
        B500000 = 0x0B,
        /// 512000 bps
        B512000 = 0x0C,
    }
}

wire_enum! {
    /// What starts a measurement
    pub enum TriggerSource {
        /// Sensor measures continuously at the output period
        Internal = 0x01,
        /// Sensor measures only when triggered by the host
        External = 0x00,
    }
}

impl DistanceMode {
    /// Whether this mode is one of the short-range encodings
    pub const fn is_short(self) -> bool {
        matches!(self, DistanceMode::Short16x | DistanceMode::Short15x)
    }
}

impl BaudRate {
    /// Line speed in bits per second
    pub const fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B14400 => 14_400,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B56000 => 56_000,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
            BaudRate::B128000 => 128_000,
            BaudRate::B230400 => 230_400,
            BaudRate::B256000 => 256_000,
            BaudRate::B460800 => 460_800,
            BaudRate::B500000 => 500_000,
            BaudRate::B512000 => 512_000,
        }
    }

    /// Find the setting for a line speed, if the sensor supports it
    pub fn from_bits_per_second(bps: u32) -> Option<Self> {
        BaudRate::ALL
            .iter()
            .copied()
            .find(|b| b.bits_per_second() == bps)
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::B115200
    }
}

impl DistanceUnit {
    /// Millimetres per reported unit
    pub const fn millimeters_per_unit(self) -> u16 {
        match self {
            DistanceUnit::Millimeter => 1,
            DistanceUnit::Centimeter => 10,
        }
    }
}
