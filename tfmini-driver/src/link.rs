//! Frame synchronization over a transport
//!
//! Feeds bytes from a [`Transport`] into the prefix scanner and reads the
//! frame body once the prefix is found. A short read is treated as a link
//! failure: the buffer is never used half-filled.

use tfmini_hal::{DeviceId, Transport};
use tfmini_protocol::{
    scan_prefix, CommandFrame, DecodeError, Measurement, Status, SyncError, ACK_MAGIC,
    INVALID_DISTANCE, MEASUREMENT_MAGIC, MEASUREMENT_PAYLOAD_LEN,
};

/// Why no measurement came out of a read cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasureError<E> {
    /// No `59 59` prefix within the search budget
    NotSynchronized,
    /// The transport failed
    Transport(E),
    /// The transport delivered fewer bytes than requested
    ShortRead,
    /// Frame checksum did not match
    ChecksumMismatch,
    /// Sensor reported the out-of-range sentinel
    OutOfRange,
    /// Mode byte is not a known distance mode
    UnknownMode(u8),
}

impl<E> From<DecodeError> for MeasureError<E> {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::UnknownMode(mode) => MeasureError::UnknownMode(mode),
        }
    }
}

/// Fill `buf` completely or fail
fn read_exact<T: Transport>(
    transport: &mut T,
    device: DeviceId,
    buf: &mut [u8],
) -> Result<(), MeasureError<T::Error>> {
    match transport.receive(device, buf) {
        Ok(n) if n == buf.len() => Ok(()),
        Ok(_) => Err(MeasureError::ShortRead),
        Err(e) => Err(MeasureError::Transport(e)),
    }
}

fn read_byte<T: Transport>(
    transport: &mut T,
    device: DeviceId,
) -> Result<u8, MeasureError<T::Error>> {
    let mut byte = [0u8; 1];
    read_exact(transport, device, &mut byte)?;
    Ok(byte[0])
}

/// Scan for `magic`, folding scanner failures into [`MeasureError`]
fn sync<T: Transport>(
    transport: &mut T,
    device: DeviceId,
    magic: &[u8],
    max_attempts: u16,
) -> Result<(), MeasureError<T::Error>> {
    match scan_prefix(magic, max_attempts, || read_byte(transport, device)) {
        Ok(_) => Ok(()),
        Err(SyncError::Exhausted) => Err(MeasureError::NotSynchronized),
        Err(SyncError::Source(e)) => Err(e),
    }
}

/// Wait for a command acknowledgment
///
/// Any failure to find `42 57 02` followed by a known status byte is
/// reported as [`Status::ErrorTransmission`]. An unknown status byte ends
/// the search instead of resuming the scan.
pub fn read_ack<T: Transport>(transport: &mut T, device: DeviceId, max_attempts: u16) -> Status {
    let status = sync(transport, device, &ACK_MAGIC, max_attempts)
        .and_then(|()| read_byte(transport, device));

    match status {
        Ok(byte) => match Status::from_ack(byte) {
            Some(status) => status,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("device {}: unknown ack status byte {=u8:#x}", device, byte);
                Status::ErrorTransmission
            }
        },
        Err(MeasureError::NotSynchronized) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("device {}: no ack within {} bytes", device, max_attempts);
            Status::ErrorTransmission
        }
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("device {}: link failed while waiting for ack", device);
            Status::ErrorTransmission
        }
    }
}

/// Send one command frame and wait for its acknowledgment
pub fn exchange<T: Transport>(
    transport: &mut T,
    device: DeviceId,
    frame: &CommandFrame,
    max_attempts: u16,
) -> Status {
    if transport.send(device, frame).is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("device {}: send failed", device);
        return Status::ErrorTransmission;
    }
    read_ack(transport, device, max_attempts)
}

/// Read and decode the next measurement frame
///
/// Returns the measurement only when its checksum matched and the reading
/// is not the out-of-range sentinel.
pub fn read_measurement<T: Transport>(
    transport: &mut T,
    device: DeviceId,
    max_attempts: u16,
) -> Result<Measurement, MeasureError<T::Error>> {
    sync(transport, device, &MEASUREMENT_MAGIC, max_attempts)?;

    let mut payload = [0u8; MEASUREMENT_PAYLOAD_LEN];
    read_exact(transport, device, &mut payload)?;

    let measurement = Measurement::decode(&payload)?;
    if !measurement.checksum_ok {
        return Err(MeasureError::ChecksumMismatch);
    }
    if measurement.reading == INVALID_DISTANCE {
        return Err(MeasureError::OutOfRange);
    }
    Ok(measurement)
}
