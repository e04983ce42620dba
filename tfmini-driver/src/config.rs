//! Session and sensor configuration
//!
//! [`SessionConfig`] tunes how the host talks to a sensor.
//! [`SensorProfile`] describes what the sensor itself should be set to and
//! is applied with [`Tfmini::apply_profile`](crate::Tfmini::apply_profile).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tfmini_protocol::params::{
    validate_output_period, validate_range_limit, validate_strength_high, validate_strength_low,
};
use tfmini_protocol::{
    DetectionPattern, DistanceMode, DistanceUnit, OutputDataFormat, ParamError, Status,
    DEFAULT_MAX_SEARCH_ATTEMPTS,
};

/// Default number of enter-command-mode frames sent before giving up
pub const DEFAULT_ENTER_ATTEMPTS: u8 = 3;

/// Link behaviour of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    /// Bytes scanned for a frame prefix before giving up (min 1)
    pub max_search_attempts: u16,
    /// Enter-command-mode frames tried per command (min 1)
    pub enter_attempts: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_search_attempts: DEFAULT_MAX_SEARCH_ATTEMPTS,
            enter_attempts: DEFAULT_ENTER_ATTEMPTS,
        }
    }
}

impl SessionConfig {
    /// Copy with both limits raised to at least 1
    pub fn normalized(self) -> Self {
        Self {
            max_search_attempts: self.max_search_attempts.max(1),
            enter_attempts: self.enter_attempts.max(1),
        }
    }
}

/// One step of a [`SensorProfile`], in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    Reset,
    OutputFormat,
    OutputPeriod,
    DistanceUnit,
    DistanceMode,
    DetectionPattern,
    RangeLimit,
    StrengthLow,
    StrengthHigh,
}

/// A profile setting the sensor rejected or never acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileError {
    /// Setting that failed; later settings were not attempted
    pub setting: Setting,
    /// Status it failed with
    pub status: Status,
}

/// Desired sensor configuration
///
/// `None` leaves a setting untouched. Settings are applied in [`Setting`]
/// order: distance mode before detection pattern, because changing the
/// distance mode switches the pattern to fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorProfile {
    /// Restore factory settings before anything else
    pub reset_first: bool,
    pub output_format: Option<OutputDataFormat>,
    /// Output period in milliseconds, multiple of 10
    pub output_period_ms: Option<u16>,
    pub distance_unit: Option<DistanceUnit>,
    pub distance_mode: Option<DistanceMode>,
    pub detection_pattern: Option<DetectionPattern>,
    /// Range limit in millimetres; 0 disables the limit
    pub range_limit_mm: Option<u16>,
    pub strength_low: Option<u8>,
    pub strength_high: Option<u16>,
}

impl SensorProfile {
    /// Check every numeric value without touching the sensor
    ///
    /// On failure, returns the first offending setting.
    pub fn validate(&self) -> Result<(), (Setting, ParamError)> {
        if let Some(period) = self.output_period_ms {
            validate_output_period(period).map_err(|e| (Setting::OutputPeriod, e))?;
        }
        if let Some(range) = self.range_limit_mm {
            validate_range_limit(range).map_err(|e| (Setting::RangeLimit, e))?;
        }
        if let Some(low) = self.strength_low {
            validate_strength_low(low).map_err(|e| (Setting::StrengthLow, e))?;
        }
        if let Some(high) = self.strength_high {
            validate_strength_high(high).map_err(|e| (Setting::StrengthHigh, e))?;
        }
        Ok(())
    }

    /// Number of commands applying this profile issues
    pub fn len(&self) -> usize {
        [
            self.reset_first,
            self.output_format.is_some(),
            self.output_period_ms.is_some(),
            self.distance_unit.is_some(),
            self.distance_mode.is_some(),
            self.detection_pattern.is_some(),
            self.range_limit_mm.is_some(),
            self.strength_low.is_some(),
            self.strength_high.is_some(),
        ]
        .iter()
        .filter(|&&present| present)
        .count()
    }

    /// Check if applying this profile is a no-op
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
