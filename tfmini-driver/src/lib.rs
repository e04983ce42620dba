//! TFmini rangefinder driver
//!
//! A [`Tfmini`] session talks to one sensor through a borrowed or owned
//! [`Transport`]. It owns the sensor's command table, wraps every
//! configuration change in the enter/exit command-mode bracket, and
//! decodes the measurement stream.
//!
//! Everything is blocking and single-threaded: a call returns when its
//! bytes have been exchanged or the synchronization budget runs out.
//! Sessions share no state, so separate sessions on separate transports
//! can run on separate threads without locking.
//!
//! ```ignore
//! use tfmini_driver::{Tfmini, DeviceId, DistanceUnit, Status};
//!
//! let mut lidar = Tfmini::new(DeviceId(1), transport);
//! assert_eq!(lidar.set_distance_unit(DistanceUnit::Millimeter), Status::Success);
//!
//! loop {
//!     if let Some(m) = lidar.read_measurement() {
//!         // m.reading is in millimetres
//!     }
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod executor;
pub mod link;
pub mod session;

pub use config::{ProfileError, SensorProfile, SessionConfig, Setting};
pub use executor::{Event, Phase};
pub use link::MeasureError;
pub use session::Tfmini;

pub use tfmini_hal::{DeviceId, Transport};
pub use tfmini_protocol::{
    BaudRate, Command, DetectionPattern, DistanceMode, DistanceUnit, Measurement,
    OutputDataFormat, Status, TriggerSource,
};
