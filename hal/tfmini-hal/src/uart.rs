//! UART serial communication abstractions
//!
//! Provides traits for blocking serial communication over a single port,
//! plus an adapter for anything implementing the `embedded-io` traits.

use embedded_io::{Read, Write};

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled, the port stops delivering bytes,
    /// or an error occurs. Returns the number of bytes actually written
    /// into `buf`, which is less than `buf.len()` only when the port ran dry.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// UART over any `embedded-io` byte stream
///
/// Host serial ports and most chip HALs expose `embedded_io::Read + Write`;
/// this wraps one so it can back a [`Dedicated`](crate::Dedicated) transport.
#[derive(Debug)]
pub struct IoUart<T> {
    io: T,
}

impl<T> IoUart<T> {
    /// Wrap an `embedded-io` stream
    pub fn new(io: T) -> Self {
        Self { io }
    }

    /// Borrow the underlying stream
    pub fn inner(&self) -> &T {
        &self.io
    }

    /// Mutably borrow the underlying stream (e.g. to change its baud rate)
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.io
    }

    /// Give the underlying stream back
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: Write> UartTx for IoUart<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.io.flush()
    }
}

impl<T: Read> UartRx for IoUart<T> {
    type Error = T::Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.io.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}
