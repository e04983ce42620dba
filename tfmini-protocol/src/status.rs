//! Command outcome
//!
//! Every command-issuing operation ends in one [`Status`]. Three of them
//! are reported by the sensor in the fourth byte of an ack frame; the
//! fourth is produced locally when the exchange itself broke down.

/// Outcome of a command exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Sensor accepted the command
    Success,
    /// Sensor rejected the opcode
    ErrorInstruction,
    /// Sensor rejected the value, or it failed local validation
    ErrorParameter,
    /// No usable ack: sync failed, command mode never entered, or the link failed
    ErrorTransmission,
}

impl Status {
    /// Ack byte for success
    pub const ACK_SUCCESS: u8 = 0x01;
    /// Ack byte for a rejected opcode
    pub const ACK_ERROR_INSTRUCTION: u8 = 0xFF;
    /// Ack byte for a rejected value
    pub const ACK_ERROR_PARAMETER: u8 = 0x0F;

    /// Interpret the status byte of an ack frame
    ///
    /// Returns `None` for bytes the sensor never sends as a status.
    pub const fn from_ack(byte: u8) -> Option<Status> {
        match byte {
            Self::ACK_SUCCESS => Some(Status::Success),
            Self::ACK_ERROR_INSTRUCTION => Some(Status::ErrorInstruction),
            Self::ACK_ERROR_PARAMETER => Some(Status::ErrorParameter),
            _ => None,
        }
    }

    /// Check if the command went through
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// `Ok(())` on success, the failing status otherwise
    pub fn into_result(self) -> Result<(), Status> {
        match self {
            Status::Success => Ok(()),
            failure => Err(failure),
        }
    }
}
