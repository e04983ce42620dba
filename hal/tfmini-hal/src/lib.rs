//! TFmini Transport Abstraction
//!
//! This crate defines the byte-level link between a TFmini protocol
//! session and whatever actually moves bytes: a chip UART, a host serial
//! port, or a scripted buffer in tests. The protocol layer never opens,
//! configures or closes a port; it only sends and receives bytes through
//! the [`Transport`] it was handed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tfmini-driver (device sessions)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tfmini-hal (this crate - Transport)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  Dedicated<U> │       │   IoUart<T>   │
//! │ (UartTx + Rx) │       │ (embedded-io) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`Transport`] - Device-addressed send/receive used by sessions
//! - [`uart::UartTx`], [`uart::UartRx`] - Single-port serial communication

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
pub mod mock;
pub mod transport;
pub mod uart;

pub use transport::{Dedicated, DeviceId, LinkError, Transport};
pub use uart::{IoUart, UartRx, UartTx};
