//! Command frames and the per-session command table
//!
//! Each command kind has a fixed 8-byte template
//! `[0x42, 0x57, 0x02, 0x00, p0, p1, payload, trailer]`. The trailer byte
//! names the command; the parameter bytes are overwritten in place before
//! every send. A [`CommandTable`] owns one copy of all templates and must
//! belong to exactly one session.

use crate::params::{
    validate_output_period, validate_range_limit, validate_strength_high, validate_strength_low,
    BaudRate, DetectionPattern, DistanceMode, DistanceUnit, OutputDataFormat, ParamError,
    TriggerSource,
};

/// Length of every command frame
pub const COMMAND_FRAME_LEN: usize = 8;

/// A complete command frame as sent on the wire
pub type CommandFrame = [u8; COMMAND_FRAME_LEN];

/// Offset of the low parameter byte
pub const PARAM_LO: usize = 4;
/// Offset of the high parameter byte
pub const PARAM_HI: usize = 5;
/// Offset of the single-byte payload
pub const PAYLOAD: usize = 6;

/// Command kinds understood by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    OutputDataFormat,
    OutputDataPeriod,
    DistanceUnit,
    DetectionPattern,
    DistanceMode,
    RangeLimit,
    SignalStrengthLow,
    SignalStrengthHigh,
    BaudRate,
    TriggerSource,
    TriggerExternal,
    Reset,
    EnterCommandMode,
    ExitCommandMode,
}

impl Command {
    /// Number of command kinds
    pub const COUNT: usize = 14;

    /// Every command kind, in table order
    pub const ALL: [Command; Command::COUNT] = [
        Command::OutputDataFormat,
        Command::OutputDataPeriod,
        Command::DistanceUnit,
        Command::DetectionPattern,
        Command::DistanceMode,
        Command::RangeLimit,
        Command::SignalStrengthLow,
        Command::SignalStrengthHigh,
        Command::BaudRate,
        Command::TriggerSource,
        Command::TriggerExternal,
        Command::Reset,
        Command::EnterCommandMode,
        Command::ExitCommandMode,
    ];

    /// Factory template for this command
    pub const fn template(self) -> CommandFrame {
        match self {
            Command::OutputDataFormat => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x01, 0x06],
            Command::OutputDataPeriod => [0x42, 0x57, 0x02, 0x00, 0x0A, 0x00, 0x00, 0x07],
            Command::DistanceUnit => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x01, 0x1A],
            Command::DetectionPattern => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x14],
            Command::DistanceMode => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x11],
            Command::RangeLimit => [0x42, 0x57, 0x02, 0x00, 0xE0, 0x2E, 0x01, 0x19],
            Command::SignalStrengthLow => [0x42, 0x57, 0x02, 0x00, 0x14, 0x00, 0x00, 0x20],
            Command::SignalStrengthHigh => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x21],
            Command::BaudRate => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x08],
            Command::TriggerSource => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x40],
            Command::TriggerExternal => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x41],
            Command::Reset => [0x42, 0x57, 0x02, 0x00, 0xFF, 0xFF, 0xFF, 0xFF],
            Command::EnterCommandMode => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x01, 0x02],
            Command::ExitCommandMode => [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02],
        }
    }

    /// Sensor leaves command mode by itself after this command
    ///
    /// No exit frame may follow these: the sensor is resetting, taking a
    /// triggered measurement, or already talking at a new baud rate.
    pub const fn leaves_command_mode(self) -> bool {
        matches!(
            self,
            Command::BaudRate | Command::TriggerExternal | Command::Reset | Command::TriggerSource
        )
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Mutable set of command frames owned by one session
///
/// Setters validate their argument first and leave the table untouched
/// when it is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    frames: [CommandFrame; Command::COUNT],
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    /// Table holding the factory templates
    pub const fn new() -> Self {
        let mut frames = [[0u8; COMMAND_FRAME_LEN]; Command::COUNT];
        let mut i = 0;
        while i < Command::COUNT {
            frames[i] = Command::ALL[i].template();
            i += 1;
        }
        Self { frames }
    }

    /// Current frame for a command
    pub fn frame(&self, cmd: Command) -> &CommandFrame {
        &self.frames[cmd.index()]
    }

    /// Restore every frame to its template
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn set_payload(&mut self, cmd: Command, value: u8) -> &CommandFrame {
        let frame = &mut self.frames[cmd.index()];
        frame[PAYLOAD] = value;
        &*frame
    }

    fn set_param(&mut self, cmd: Command, value: u16) -> &mut CommandFrame {
        let frame = &mut self.frames[cmd.index()];
        let [lo, hi] = value.to_le_bytes();
        frame[PARAM_LO] = lo;
        frame[PARAM_HI] = hi;
        frame
    }

    /// Encode the output data format
    pub fn set_output_format(&mut self, format: OutputDataFormat) -> &CommandFrame {
        self.set_payload(Command::OutputDataFormat, format.code())
    }

    /// Encode the output period (multiple of 10 ms)
    pub fn set_output_period(&mut self, period_ms: u16) -> Result<&CommandFrame, ParamError> {
        let period_ms = validate_output_period(period_ms)?;
        Ok(&*self.set_param(Command::OutputDataPeriod, period_ms))
    }

    /// Encode the distance unit
    pub fn set_distance_unit(&mut self, unit: DistanceUnit) -> &CommandFrame {
        self.set_payload(Command::DistanceUnit, unit.code())
    }

    /// Encode the detection pattern
    pub fn set_detection_pattern(&mut self, pattern: DetectionPattern) -> &CommandFrame {
        self.set_payload(Command::DetectionPattern, pattern.code())
    }

    /// Encode the distance mode
    pub fn set_distance_mode(&mut self, mode: DistanceMode) -> &CommandFrame {
        self.set_payload(Command::DistanceMode, mode.code())
    }

    /// Encode the range limit in millimetres; 0 disables the limit
    pub fn set_range_limit(&mut self, range_mm: u16) -> Result<&CommandFrame, ParamError> {
        let range_mm = validate_range_limit(range_mm)?;
        let frame = self.set_param(Command::RangeLimit, range_mm);
        frame[PAYLOAD] = u8::from(range_mm != 0);
        Ok(&*frame)
    }

    /// Encode the low signal-strength threshold
    pub fn set_strength_low(&mut self, threshold: u8) -> Result<&CommandFrame, ParamError> {
        let threshold = validate_strength_low(threshold)?;
        let frame = &mut self.frames[Command::SignalStrengthLow.index()];
        frame[PARAM_LO] = threshold;
        Ok(&*frame)
    }

    /// Encode the high signal-strength threshold
    pub fn set_strength_high(&mut self, threshold: u16) -> Result<&CommandFrame, ParamError> {
        let threshold = validate_strength_high(threshold)?;
        Ok(&*self.set_param(Command::SignalStrengthHigh, threshold))
    }

    /// Encode the baud rate
    pub fn set_baud_rate(&mut self, baud: BaudRate) -> &CommandFrame {
        self.set_payload(Command::BaudRate, baud.code())
    }

    /// Encode the trigger source
    pub fn set_trigger_source(&mut self, source: TriggerSource) -> &CommandFrame {
        self.set_payload(Command::TriggerSource, source.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes that differ between the current frame and the template
    fn changed(table: &CommandTable, cmd: Command) -> [bool; 8] {
        let template = cmd.template();
        let frame = table.frame(cmd);
        let mut out = [false; 8];
        for i in 0..8 {
            out[i] = frame[i] != template[i];
        }
        out
    }

    #[test]
    fn test_templates_share_header() {
        for cmd in Command::ALL {
            assert_eq!(&cmd.template()[..4], &[0x42, 0x57, 0x02, 0x00]);
        }
    }

    #[test]
    fn test_table_order_matches_index() {
        let table = CommandTable::new();
        for cmd in Command::ALL {
            assert_eq!(table.frame(cmd), &cmd.template());
        }
    }

    #[test]
    fn test_self_exiting_commands() {
        let exiting: usize = Command::ALL
            .iter()
            .filter(|c| c.leaves_command_mode())
            .count();
        assert_eq!(exiting, 4);
        assert!(Command::Reset.leaves_command_mode());
        assert!(!Command::DistanceMode.leaves_command_mode());
    }

    #[test]
    fn test_output_period_little_endian() {
        let mut table = CommandTable::new();
        let frame = *table.set_output_period(1000).unwrap();

        assert_eq!(frame[PARAM_LO], 0xE8);
        assert_eq!(frame[PARAM_HI], 0x03);
        assert_eq!(
            changed(&table, Command::OutputDataPeriod),
            [false, false, false, false, true, true, false, false]
        );
    }

    #[test]
    fn test_invalid_period_leaves_table_untouched() {
        let mut table = CommandTable::new();
        assert_eq!(
            table.set_output_period(15),
            Err(ParamError::InvalidPeriod(15))
        );
        assert_eq!(table, CommandTable::new());
    }

    #[test]
    fn test_range_limit_enable_flag() {
        let mut table = CommandTable::new();

        let frame = *table.set_range_limit(5000).unwrap();
        assert_eq!(&frame[4..7], &[0x88, 0x13, 0x01]);

        let frame = *table.set_range_limit(0).unwrap();
        assert_eq!(&frame[4..7], &[0x00, 0x00, 0x00]);
        assert_eq!(frame[7], 0x19);

        assert!(table.set_range_limit(200).is_err());
        assert_eq!(&table.frame(Command::RangeLimit)[4..7], &[0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_strength_thresholds() {
        let mut table = CommandTable::new();

        let frame = *table.set_strength_low(60).unwrap();
        assert_eq!(frame[PARAM_LO], 60);
        assert_eq!(frame[PARAM_HI], 0x00);

        let frame = *table.set_strength_high(3000).unwrap();
        assert_eq!(&frame[4..6], &[0xB8, 0x0B]);

        assert!(table.set_strength_low(81).is_err());
        assert!(table.set_strength_high(3001).is_err());
        assert_eq!(table.frame(Command::SignalStrengthLow)[PARAM_LO], 60);
    }

    #[test]
    fn test_payload_setters_touch_one_byte() {
        let mut table = CommandTable::new();
        table.set_distance_unit(DistanceUnit::Millimeter);
        table.set_baud_rate(BaudRate::B460800);

        assert_eq!(table.frame(Command::DistanceUnit)[PAYLOAD], 0x00);
        assert_eq!(table.frame(Command::BaudRate)[PAYLOAD], 0x0A);
        assert_eq!(
            changed(&table, Command::BaudRate),
            [false, false, false, false, false, false, true, false]
        );
    }

    #[test]
    fn test_reset_restores_templates() {
        let mut table = CommandTable::new();
        table.set_trigger_source(TriggerSource::External);
        table.set_output_format(OutputDataFormat::Pixhawk);
        table.reset();
        assert_eq!(table, CommandTable::new());
    }
}
