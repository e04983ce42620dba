//! TFmini Serial Protocol
//!
//! This crate describes the byte-level protocol spoken by Benewake TFmini
//! time-of-flight rangefinders, without doing any I/O itself.
//!
//! # Protocol Overview
//!
//! Configuration commands are fixed 8-byte frames, acknowledged by a 4-byte
//! frame that is embedded somewhere in the incoming byte stream:
//! ```text
//! command  ┌────┬────┬────┬────┬────┬────┬─────────┬─────────┐
//!          │ 42 │ 57 │ 02 │ 00 │ p0 │ p1 │ payload │ trailer │
//!          └────┴────┴────┴────┴────┴────┴─────────┴─────────┘
//! ack      ┌────┬────┬────┬────────┐
//!          │ 42 │ 57 │ 02 │ status │
//!          └────┴────┴────┴────────┘
//! ```
//!
//! In normal operation the sensor streams 9-byte measurement frames:
//! ```text
//! ┌────┬────┬──────┬──────┬──────┬──────┬──────┬──────────┬──────────┐
//! │ 59 │ 59 │ d_lo │ d_hi │ s_lo │ s_hi │ mode │ reserved │ checksum │
//! └────┴────┴──────┴──────┴──────┴──────┴──────┴──────────┴──────────┘
//! ```
//!
//! Frames are located by their magic prefix with a bounded,
//! restart-on-mismatch scan (see [`scan`]).

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod frame;
pub mod measurement;
pub mod params;
pub mod scan;
pub mod status;

pub use command::{Command, CommandFrame, CommandTable, COMMAND_FRAME_LEN};
pub use frame::{MeasurementParser, ParseError};
pub use measurement::{DecodeError, Measurement, INVALID_DISTANCE};
pub use params::{
    BaudRate, DetectionPattern, DistanceMode, DistanceUnit, OutputDataFormat, ParamError,
    TriggerSource,
};
pub use scan::{scan_prefix, SyncError, DEFAULT_MAX_SEARCH_ATTEMPTS};
pub use status::Status;

/// Magic prefix of a command acknowledgment
pub const ACK_MAGIC: [u8; 3] = [0x42, 0x57, 0x02];

/// Magic prefix of a measurement frame
pub const MEASUREMENT_MAGIC: [u8; 2] = [0x59, 0x59];

/// Bytes following [`MEASUREMENT_MAGIC`] in a measurement frame
pub const MEASUREMENT_PAYLOAD_LEN: usize = 7;

/// Complete measurement frame length
pub const MEASUREMENT_FRAME_LEN: usize = MEASUREMENT_MAGIC.len() + MEASUREMENT_PAYLOAD_LEN;
