//! Per-sensor session

use tfmini_hal::{DeviceId, Transport};
use tfmini_protocol::{
    BaudRate, Command, CommandFrame, CommandTable, DetectionPattern, DistanceMode, DistanceUnit,
    Measurement, OutputDataFormat, ParamError, Status, TriggerSource,
};

use crate::config::{ProfileError, SensorProfile, SessionConfig, Setting};
use crate::executor;
use crate::link::{self, MeasureError};

/// A connection to one TFmini sensor
///
/// The session owns its command table, so parameter changes made through
/// one session are never visible to another. All operations block until
/// the exchange completes or the search budget runs out.
#[derive(Debug)]
pub struct Tfmini<T> {
    device: DeviceId,
    transport: T,
    table: CommandTable,
    config: SessionConfig,
}

impl<T: Transport> Tfmini<T> {
    /// Create a session with default link settings
    pub fn new(device: DeviceId, transport: T) -> Self {
        Self::with_config(device, transport, SessionConfig::default())
    }

    /// Create a session with explicit link settings
    pub fn with_config(device: DeviceId, transport: T, config: SessionConfig) -> Self {
        Self {
            device,
            transport,
            table: CommandTable::new(),
            config: config.normalized(),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current per-read search budget
    pub fn max_search_attempts(&self) -> u16 {
        self.config.max_search_attempts
    }

    /// Change the per-read search budget; 0 is treated as 1
    pub fn set_max_search_attempts(&mut self, attempts: u16) {
        self.config.max_search_attempts = attempts.max(1);
    }

    /// Frames as they will next be sent
    pub fn command_table(&self) -> &CommandTable {
        &self.table
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// End the session and hand back the transport
    pub fn release(self) -> T {
        self.transport
    }

    fn execute(&mut self, command: Command) -> Status {
        let frame: CommandFrame = *self.table.frame(command);
        self.dispatch(command, &frame)
    }

    fn dispatch(&mut self, command: Command, frame: &CommandFrame) -> Status {
        let status = executor::run(
            &mut self.transport,
            self.device,
            &self.table,
            command,
            frame,
            &self.config,
        );

        #[cfg(feature = "defmt")]
        match status {
            Status::Success => defmt::debug!("device {}: {} ok", self.device, command),
            other => defmt::warn!("device {}: {} -> {}", self.device, command, other),
        }

        status
    }

    fn dispatch_checked(
        &mut self,
        command: Command,
        frame: Result<CommandFrame, ParamError>,
    ) -> Status {
        match frame {
            Ok(frame) => self.dispatch(command, &frame),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("device {}: {} rejected locally: {}", self.device, command, _e);
                Status::ErrorParameter
            }
        }
    }

    /// Select standard (binary) or Pixhawk (text) output
    pub fn set_output_format(&mut self, format: OutputDataFormat) -> Status {
        let frame = *self.table.set_output_format(format);
        self.dispatch(Command::OutputDataFormat, &frame)
    }

    /// Set the streaming period, a multiple of 10 ms
    pub fn set_output_period(&mut self, period_ms: u16) -> Status {
        let frame = self.table.set_output_period(period_ms).copied();
        self.dispatch_checked(Command::OutputDataPeriod, frame)
    }

    pub fn set_distance_unit(&mut self, unit: DistanceUnit) -> Status {
        let frame = *self.table.set_distance_unit(unit);
        self.dispatch(Command::DistanceUnit, &frame)
    }

    pub fn set_detection_pattern(&mut self, pattern: DetectionPattern) -> Status {
        let frame = *self.table.set_detection_pattern(pattern);
        self.dispatch(Command::DetectionPattern, &frame)
    }

    /// Force a distance mode
    ///
    /// The sensor only honours a distance mode with the fixed detection
    /// pattern, so that is set first. If it fails, the mode is not sent and
    /// [`Status::ErrorTransmission`] is returned.
    pub fn set_distance_mode(&mut self, mode: DistanceMode) -> Status {
        if !self.set_detection_pattern(DetectionPattern::Fix).is_success() {
            return Status::ErrorTransmission;
        }
        let frame = *self.table.set_distance_mode(mode);
        self.dispatch(Command::DistanceMode, &frame)
    }

    /// Limit the reported range, 300..=12000 mm, or 0 to disable
    pub fn set_range_limit(&mut self, range_mm: u16) -> Status {
        let frame = self.table.set_range_limit(range_mm).copied();
        self.dispatch_checked(Command::RangeLimit, frame)
    }

    /// Lower signal strength threshold, 0..=80
    pub fn set_signal_strength_low(&mut self, threshold: u8) -> Status {
        let frame = self.table.set_strength_low(threshold).copied();
        self.dispatch_checked(Command::SignalStrengthLow, frame)
    }

    /// Upper signal strength threshold, 0..=3000
    pub fn set_signal_strength_high(&mut self, threshold: u16) -> Status {
        let frame = self.table.set_strength_high(threshold).copied();
        self.dispatch_checked(Command::SignalStrengthHigh, frame)
    }

    /// Change the sensor's baud rate
    ///
    /// The sensor switches immediately; the transport has to be
    /// reconfigured by the caller afterwards.
    pub fn set_baud_rate(&mut self, baud: BaudRate) -> Status {
        let frame = *self.table.set_baud_rate(baud);
        self.dispatch(Command::BaudRate, &frame)
    }

    pub fn set_trigger_source(&mut self, source: TriggerSource) -> Status {
        let frame = *self.table.set_trigger_source(source);
        self.dispatch(Command::TriggerSource, &frame)
    }

    /// Request a single measurement in external-trigger mode
    pub fn trigger_measurement(&mut self) -> Status {
        self.execute(Command::TriggerExternal)
    }

    /// Restore factory settings
    ///
    /// Only the sensor is reset; this session's command table keeps the
    /// last values written through it.
    pub fn reset(&mut self) -> Status {
        self.execute(Command::Reset)
    }

    /// Read the next valid measurement, if one arrives within budget
    pub fn read_measurement(&mut self) -> Option<Measurement> {
        self.try_read_measurement().ok()
    }

    /// Read the next measurement, reporting why none was produced
    pub fn try_read_measurement(&mut self) -> Result<Measurement, MeasureError<T::Error>> {
        let result = link::read_measurement(
            &mut self.transport,
            self.device,
            self.config.max_search_attempts,
        );

        #[cfg(feature = "defmt")]
        match &result {
            Ok(m) => defmt::trace!("device {}: {}", self.device, m),
            Err(MeasureError::NotSynchronized) => {
                defmt::debug!("device {}: no measurement frame", self.device)
            }
            Err(_) => defmt::debug!("device {}: measurement dropped", self.device),
        }

        result
    }

    /// Bring the sensor to `profile`
    ///
    /// All numeric values are checked before any frame is sent. Settings
    /// are then applied in [`Setting`] order and application stops at the
    /// first one that does not succeed.
    pub fn apply_profile(&mut self, profile: &SensorProfile) -> Result<(), ProfileError> {
        if let Err((setting, _e)) = profile.validate() {
            #[cfg(feature = "defmt")]
            defmt::warn!("device {}: profile {} invalid: {}", self.device, setting, _e);
            return Err(ProfileError {
                setting,
                status: Status::ErrorParameter,
            });
        }

        let check = |setting: Setting, status: Status| {
            status
                .into_result()
                .map_err(|status| ProfileError { setting, status })
        };

        if profile.reset_first {
            check(Setting::Reset, self.reset())?;
        }
        if let Some(format) = profile.output_format {
            check(Setting::OutputFormat, self.set_output_format(format))?;
        }
        if let Some(period) = profile.output_period_ms {
            check(Setting::OutputPeriod, self.set_output_period(period))?;
        }
        if let Some(unit) = profile.distance_unit {
            check(Setting::DistanceUnit, self.set_distance_unit(unit))?;
        }
        if let Some(mode) = profile.distance_mode {
            check(Setting::DistanceMode, self.set_distance_mode(mode))?;
        }
        if let Some(pattern) = profile.detection_pattern {
            check(Setting::DetectionPattern, self.set_detection_pattern(pattern))?;
        }
        if let Some(range) = profile.range_limit_mm {
            check(Setting::RangeLimit, self.set_range_limit(range))?;
        }
        if let Some(low) = profile.strength_low {
            check(Setting::StrengthLow, self.set_signal_strength_low(low))?;
        }
        if let Some(high) = profile.strength_high {
            check(Setting::StrengthHigh, self.set_signal_strength_high(high))?;
        }
        Ok(())
    }
}
