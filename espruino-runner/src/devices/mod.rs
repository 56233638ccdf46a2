//! Defines the discovered devices and the Espruino filter.
//!
//! A discovery source hands over a [`DeviceMapping`]: raw [`DeviceInfo`] descriptors keyed by the
//! port they have been found on. [`filter_devices`] keeps the Espruino ones as [`Device`]s, ready to be
//! given to an [`EspruinoCli`](crate::process::EspruinoCli).

mod device;
mod filter;

pub use crate::devices::device::{Device, DeviceInfo, DeviceMapping};
pub use crate::devices::filter::{filter_devices, parse_devices};

/// The only runtime the espruino-cli can talk to.
pub const ESPRUINO_RUNTIME: &str = "espruino";

/// Baud rate used when the discovery source did not provide one (Espruino boards default).
pub const DEFAULT_BAUD_RATE: &str = "9600";
