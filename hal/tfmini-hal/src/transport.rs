//! Device-addressed transport
//!
//! A [`Transport`] moves raw bytes to and from one or more sensors, each
//! identified by a [`DeviceId`]. Implementations decide what the id means:
//! a multiplexer channel, an index into a set of ports, or nothing at all
//! when one port serves one sensor (see [`Dedicated`]).

use crate::uart::{UartRx, UartTx};

/// Identifier of one physical sensor on a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub u8);

impl DeviceId {
    /// Raw identifier value
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for DeviceId {
    fn from(id: u8) -> Self {
        DeviceId(id)
    }
}

/// Byte transport shared by protocol sessions
///
/// Both operations block the caller until they complete or fail. Unlike a
/// fire-and-forget callback, every call reports what happened so the
/// protocol layer can react to a dead link instead of assuming bytes moved.
pub trait Transport {
    /// Error type for link failures
    type Error;

    /// Send all of `data` to `device`
    fn send(&mut self, device: DeviceId, data: &[u8]) -> Result<(), Self::Error>;

    /// Attempt to fill `buf` with bytes from `device`
    ///
    /// Returns how many bytes were written into `buf`. A count smaller than
    /// `buf.len()` means the link stopped delivering before the buffer was
    /// full; the bytes past the count are left untouched.
    fn receive(&mut self, device: DeviceId, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, device: DeviceId, data: &[u8]) -> Result<(), Self::Error> {
        (**self).send(device, data)
    }

    fn receive(&mut self, device: DeviceId, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).receive(device, buf)
    }
}

/// Errors from a [`Dedicated`] transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<TxE, RxE> {
    /// Transmit side failed
    Tx(TxE),
    /// Receive side failed
    Rx(RxE),
}

/// One UART serving exactly one sensor
///
/// The device id is accepted and ignored; every byte goes to and comes
/// from the wrapped port.
#[derive(Debug)]
pub struct Dedicated<U> {
    uart: U,
}

impl<U> Dedicated<U> {
    /// Wrap a UART
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    /// Borrow the wrapped UART
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Mutably borrow the wrapped UART (e.g. to follow a baud rate change)
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Give the wrapped UART back
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U: UartTx + UartRx> Transport for Dedicated<U> {
    type Error = LinkError<<U as UartTx>::Error, <U as UartRx>::Error>;

    fn send(&mut self, _device: DeviceId, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.write_blocking(data).map_err(LinkError::Tx)?;
        self.uart.flush().map_err(LinkError::Tx)
    }

    fn receive(&mut self, _device: DeviceId, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.uart.read_blocking(buf).map_err(LinkError::Rx)
    }
}
