//! Measurement frame decoding
//!
//! Decodes the 7 bytes that follow the `59 59` prefix:
//! `[d_lo, d_hi, s_lo, s_hi, mode, reserved, checksum]`.

use crate::params::{DistanceMode, DistanceUnit};
use crate::{MEASUREMENT_MAGIC, MEASUREMENT_PAYLOAD_LEN};

/// Reading reported when the target is out of range
pub const INVALID_DISTANCE: u16 = 0xFFFF;

/// One decoded measurement frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Distance in the unit last configured on the sensor
    pub reading: u16,
    /// Signal strength
    pub strength: u16,
    /// Sensor was in one of the short-range modes
    pub short_distance: bool,
    /// Frame checksum matched
    pub checksum_ok: bool,
}

/// Frame could not be turned into a [`Measurement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Mode byte is not one of the four known distance modes
    UnknownMode(u8),
}

/// Additive checksum over the magic prefix and the first six payload bytes
pub fn checksum(payload: &[u8; MEASUREMENT_PAYLOAD_LEN]) -> u8 {
    MEASUREMENT_MAGIC
        .iter()
        .chain(&payload[..MEASUREMENT_PAYLOAD_LEN - 1])
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

impl Measurement {
    /// Decode a frame body
    ///
    /// A frame with a bad checksum still decodes; check [`is_valid`](Self::is_valid)
    /// before using the values.
    pub fn decode(payload: &[u8; MEASUREMENT_PAYLOAD_LEN]) -> Result<Self, DecodeError> {
        let [d_lo, d_hi, s_lo, s_hi, mode, _reserved, expected] = *payload;

        let short_distance = DistanceMode::try_from(mode)
            .map_err(|_| DecodeError::UnknownMode(mode))?
            .is_short();

        // 0xFFFF is also what d_lo = d_hi = 0xFF decodes to, so the sentinel
        // needs no special case
        let reading = u16::from_le_bytes([d_lo, d_hi]);

        Ok(Self {
            reading,
            strength: u16::from_le_bytes([s_lo, s_hi]),
            short_distance,
            checksum_ok: checksum(payload) == expected,
        })
    }

    /// Checksum matched and the reading is not the out-of-range sentinel
    pub fn is_valid(&self) -> bool {
        self.checksum_ok && self.reading != INVALID_DISTANCE
    }

    /// Reading converted to millimetres
    ///
    /// `unit` must be the unit the sensor was configured with. Returns
    /// `None` for the out-of-range sentinel.
    pub fn distance_mm(&self, unit: DistanceUnit) -> Option<u32> {
        if self.reading == INVALID_DISTANCE {
            return None;
        }
        Some(u32::from(self.reading) * u32::from(unit.millimeters_per_unit()))
    }

    /// Reading converted to metres
    pub fn distance_m(&self, unit: DistanceUnit) -> Option<f32> {
        self.distance_mm(unit).map(|mm| mm as f32 / 1000.0)
    }
}
