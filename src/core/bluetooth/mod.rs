//! Bluetooth functionality for the Thingy:52 bridge
//! This module holds the GATT identifiers, the outbound command packets and
//! the transport capability the driver talks to, plus its `bluest` backend.
//!
//! ## Modules
//!
//! - [`constants`] - UUIDs, packet sizes, scan defaults
//! - [`commands`] - LED command packet
//! - [`transport`] - scan/connect/discover/notify capability traits
//! - [`types`] - device identity and scan filter

#[cfg(feature = "bluest")]
mod bluest_transport;
pub mod commands;
pub mod constants;
pub mod transport;
pub mod types;

#[cfg(feature = "bluest")]
pub use bluest_transport::{BluestPeripheral, BluestTransport};
pub use commands::{LedColor, LedCommand};
pub use constants::*;
pub use transport::{
    BleTransport, DisconnectHandler, GattCharacteristic, GattPeripheral, GattService,
    NotificationHandler, Subscription,
};
pub use types::{DeviceFilter, DeviceInfo};
