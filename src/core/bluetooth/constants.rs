//! Constants used throughout the driver
//! This module contains the GATT identifiers of the Thingy:52 firmware, the
//! fixed packet sizes and the scan defaults.
//!
//! Firmware documentation:
//! <https://nordicsemiconductor.github.io/Nordic-Thingy52-FW/documentation/firmware_architecture.html>

use std::time::Duration;

use uuid::Uuid;

/// Thingy configuration service, the one every Thingy:52 advertises
pub const UUID_CONFIGURATION_SERVICE: Uuid =
    Uuid::from_u128(0xef680100_9b35_4933_9b10_52ffa9740042);

/// Environment service (temperature, colour)
pub const UUID_ENVIRONMENT_SERVICE: Uuid = Uuid::from_u128(0xef680200_9b35_4933_9b10_52ffa9740042);
pub const UUID_TEMPERATURE_CHAR: Uuid = Uuid::from_u128(0xef680201_9b35_4933_9b10_52ffa9740042);
pub const UUID_COLOR_CHAR: Uuid = Uuid::from_u128(0xef680205_9b35_4933_9b10_52ffa9740042);

/// User interface service (LED, button)
pub const UUID_USER_INTERFACE_SERVICE: Uuid =
    Uuid::from_u128(0xef680300_9b35_4933_9b10_52ffa9740042);
pub const UUID_LED_CHAR: Uuid = Uuid::from_u128(0xef680301_9b35_4933_9b10_52ffa9740042);
pub const UUID_BUTTON_CHAR: Uuid = Uuid::from_u128(0xef680302_9b35_4933_9b10_52ffa9740042);

/// Motion service
pub const UUID_MOTION_SERVICE: Uuid = Uuid::from_u128(0xef680400_9b35_4933_9b10_52ffa9740042);
/// Raw accelerometer + gyroscope + compass characteristic
pub const UUID_MOTION_RAW_CHAR: Uuid = Uuid::from_u128(0xef680406_9b35_4933_9b10_52ffa9740042);

/// Sound service. Never used by the driver but requested so platforms that
/// gate service access on the scan request expose it.
pub const UUID_SOUND_SERVICE: Uuid = Uuid::from_u128(0xef680500_9b35_4933_9b10_52ffa9740042);

/// Standard Bluetooth battery service and level characteristic
pub const UUID_BATTERY_SERVICE: Uuid = Uuid::from_u128(0x0000180f_0000_1000_8000_00805f9b34fb);
pub const UUID_BATTERY_LEVEL: Uuid = Uuid::from_u128(0x00002a19_0000_1000_8000_00805f9b34fb);

/// Services requested in addition to the advertised configuration service
pub const OPTIONAL_SERVICES: [Uuid; 5] = [
    UUID_BATTERY_SERVICE,
    UUID_ENVIRONMENT_SERVICE,
    UUID_USER_INTERFACE_SERVICE,
    UUID_MOTION_SERVICE,
    UUID_SOUND_SERVICE,
];

/// Raw motion packet size in bytes
pub const MOTION_PACKET_SIZE: usize = 18;

/// Colour packet size in bytes
pub const COLOR_PACKET_SIZE: usize = 8;

/// Temperature packet size in bytes
pub const TEMPERATURE_PACKET_SIZE: usize = 2;

/// Battery level packet size in bytes
pub const BATTERY_PACKET_SIZE: usize = 1;

/// Button packet size in bytes
pub const BUTTON_PACKET_SIZE: usize = 1;

/// LED command packet size in bytes
pub const LED_COMMAND_PACKET_SIZE: usize = 4;

/// Scan duration in seconds
pub const DEFAULT_SCAN_DURATION_SECS: u64 = 30;

/// Default scan window
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(DEFAULT_SCAN_DURATION_SECS);
