//! Defines shared data structures for the Bluetooth module.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::core::bluetooth::constants::{
    DEFAULT_SCAN_TIMEOUT, OPTIONAL_SERVICES, UUID_CONFIGURATION_SERVICE,
};

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})").expect("MAC address pattern is valid")
});

/// Identity of a connected peripheral
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Platform-specific unique identifier for the device
    pub id: String,
    /// The name of the device, if available
    pub name: Option<String>,
    /// MAC address, when the platform id embeds one (it does not on macOS)
    pub address: Option<String>,
}

impl DeviceInfo {
    pub fn new(id: String, name: Option<String>) -> Self {
        let address = extract_mac_address(&id);
        Self { id, name, address }
    }
}

fn extract_mac_address(device_id: &str) -> Option<String> {
    MAC_ADDRESS
        .find_iter(device_id)
        .last()
        .map(|m| m.as_str().to_uppercase())
}

/// What to look for when requesting a peripheral
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFilter {
    /// Services the peripheral must advertise
    pub services: Vec<Uuid>,
    /// Services the driver may access once connected
    pub optional_services: Vec<Uuid>,
    /// How long to scan before giving up
    pub timeout: Duration,
}

impl DeviceFilter {
    /// Filter matching any Thingy:52
    pub fn thingy52(timeout: Duration) -> Self {
        Self {
            services: vec![UUID_CONFIGURATION_SERVICE],
            optional_services: OPTIONAL_SERVICES.to_vec(),
            timeout,
        }
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::thingy52(DEFAULT_SCAN_TIMEOUT)
    }
}
