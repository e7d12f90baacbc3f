//! Thingy:52 bridge library
//! Connects to a Nordic Thingy:52 over BLE, decodes its sensor notifications
//! into typed events and exposes them through platform-style sensor objects.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod sensors;
pub mod utils;

pub use crate::core::Thingy52Driver;
pub use error::{BridgeError, Result};
pub use sensors::{Sensor, SensorRegistry, SensorType};
