//! Core functionality for the Thingy:52 bridge
//! This module contains the BLE plumbing, the packet decoders and the driver
//! that turns notifications into events.

pub mod bluetooth;
pub mod driver;
pub mod events;
pub mod notifier;
pub mod packets;

// Re-export commonly used types
pub use driver::Thingy52Driver;
pub use events::{DriverEvent, DriverEventKind};
pub use notifier::{Event, EventHub, Listener, ListenerId, Notifier};
