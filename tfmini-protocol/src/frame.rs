//! Push-style measurement frame parser
//!
//! For callers that receive bytes from an interrupt handler or a DMA
//! buffer rather than through a blocking read. Bytes are fed one at a time;
//! the parser applies the same restart-on-mismatch prefix rule as
//! [`scan_prefix`](crate::scan::scan_prefix) and holds at most one partial
//! frame.

use crate::measurement::{DecodeError, Measurement};
use crate::{MEASUREMENT_MAGIC, MEASUREMENT_PAYLOAD_LEN};

/// A complete frame that did not yield a usable measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Checksum mismatch
    InvalidChecksum,
    /// Sensor reported the out-of-range sentinel
    OutOfRange,
    /// Mode byte is not a known distance mode
    UnknownMode(u8),
}

impl From<DecodeError> for ParseError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::UnknownMode(mode) => ParseError::UnknownMode(mode),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Matched this many magic bytes so far
    Syncing(usize),
    /// Prefix matched, collecting the body
    ReadingPayload,
}

/// State machine for parsing the measurement stream
#[derive(Debug, Clone)]
pub struct MeasurementParser {
    state: ParseState,
    payload: [u8; MEASUREMENT_PAYLOAD_LEN],
    filled: usize,
    discarded: u32,
}

impl Default for MeasurementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementParser {
    /// Create a new parser waiting for a prefix
    pub const fn new() -> Self {
        Self {
            state: ParseState::Syncing(0),
            payload: [0; MEASUREMENT_PAYLOAD_LEN],
            filled: 0,
            discarded: 0,
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::Syncing(0);
        self.filled = 0;
    }

    /// Bytes thrown away while looking for a prefix, since creation
    pub fn discarded(&self) -> u32 {
        self.discarded
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(measurement))` when a valid frame completes,
    /// `Ok(None)` when more bytes are needed, or `Err` when a frame completed
    /// but has to be rejected.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Measurement>, ParseError> {
        match self.state {
            ParseState::Syncing(matched) => {
                if byte == MEASUREMENT_MAGIC[matched] {
                    self.state = if matched + 1 == MEASUREMENT_MAGIC.len() {
                        self.filled = 0;
                        ParseState::ReadingPayload
                    } else {
                        ParseState::Syncing(matched + 1)
                    };
                } else {
                    self.discarded = self.discarded.wrapping_add(matched as u32 + 1);
                    self.state = ParseState::Syncing(0);
                }
                Ok(None)
            }
            ParseState::ReadingPayload => {
                self.payload[self.filled] = byte;
                self.filled += 1;
                if self.filled < MEASUREMENT_PAYLOAD_LEN {
                    return Ok(None);
                }

                self.reset();
                let measurement = Measurement::decode(&self.payload)?;
                if !measurement.checksum_ok {
                    Err(ParseError::InvalidChecksum)
                } else if !measurement.is_valid() {
                    Err(ParseError::OutOfRange)
                } else {
                    Ok(Some(measurement))
                }
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found together with the number of
    /// bytes consumed. Bytes after that frame are not consumed, so the
    /// caller can resume from `&bytes[consumed..]`.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (usize, Result<Option<Measurement>, ParseError>) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => continue,
                done => return (i + 1, done),
            }
        }
        (bytes.len(), Ok(None))
    }
}
