//! Error type shared by the driver, the transport and the sensor adapters.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// No usable Bluetooth adapter, or permission to use it was denied
    #[error("Bluetooth transport unavailable: {0}")]
    TransportUnavailable(String),
    #[error("GATT service not found: {0}")]
    ServiceUnavailable(Uuid),
    #[error("GATT characteristic {characteristic} not found in service {service}")]
    CharacteristicUnavailable { service: Uuid, characteristic: Uuid },
    #[error("Malformed {packet} packet: expected at least {expected} bytes, got {actual}")]
    MalformedPacket {
        packet: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Not connected")]
    NotConnected,
    #[error("No device advertising the Thingy service found within {0:?}")]
    ScanTimeout(Duration),
    #[error("Bluetooth transport error: {0}")]
    Transport(String),
    #[error("No sensor bound to {0}")]
    SensorUnavailable(String),
}

impl BridgeError {
    pub(crate) fn malformed(packet: &'static str, expected: usize, actual: usize) -> Self {
        Self::MalformedPacket {
            packet,
            expected,
            actual,
        }
    }
}
