//! Thingy:52 packet decoding
//! Pure functions turning the fixed-layout notification payloads into typed
//! readings. All multi-byte fields are little-endian.

use serde::{Deserialize, Serialize};

use crate::core::bluetooth::constants::{
    BATTERY_PACKET_SIZE, BUTTON_PACKET_SIZE, COLOR_PACKET_SIZE, MOTION_PACKET_SIZE,
    TEMPERATURE_PACKET_SIZE,
};
use crate::error::{BridgeError, Result};

/// Accelerometer LSB per g (Q6.10)
const ACCEL_SCALE: f64 = (1 << 10) as f64;
/// Gyroscope LSB per degree/s (Q11.5)
const GYRO_SCALE: f64 = (1 << 5) as f64;
/// Compass LSB per microtesla (Q12.4)
const COMPASS_SCALE: f64 = (1 << 4) as f64;

/// A three-axis sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One decoded raw motion notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionPacket {
    /// Acceleration in g
    pub accelerometer: Vector3,
    /// Angular rate in degrees per second
    pub gyroscope: Vector3,
    /// Magnetic field in microtesla. `None` when the firmware sent no compass
    /// sample this tick.
    pub compass: Option<Vector3>,
}

/// Raw colour sensor channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorReading {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub clear: u16,
}

/// Temperature in the three scales the sensors expose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
    pub kelvin: f64,
}

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius,
            fahrenheit: celsius * 9.0 / 5.0 + 32.0,
            kelvin: celsius + 273.15,
        }
    }
}

fn ensure_len(packet: &'static str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(BridgeError::malformed(packet, expected, data.len()));
    }
    Ok(())
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_vector(data: &[u8], offset: usize, scale: f64) -> Vector3 {
    Vector3::new(
        read_i16(data, offset) as f64 / scale,
        read_i16(data, offset + 2) as f64 / scale,
        read_i16(data, offset + 4) as f64 / scale,
    )
}

/// Parses a raw motion packet
///
/// # Data Packet Structure (18 bytes)
///
/// ```text
/// [0-5]   : Accel X/Y/Z   (i16, 1/1024 g)
/// [6-11]  : Gyro X/Y/Z    (i16, 1/32 deg/s)
/// [12-17] : Compass X/Y/Z (i16, 1/16 uT), all zero when not sampled
/// ```
pub fn decode_motion(data: &[u8]) -> Result<MotionPacket> {
    ensure_len("motion", data, MOTION_PACKET_SIZE)?;

    let accelerometer = read_vector(data, 0, ACCEL_SCALE);
    let gyroscope = read_vector(data, 6, GYRO_SCALE);

    let raw_compass = (read_i16(data, 12), read_i16(data, 14), read_i16(data, 16));
    let compass = if raw_compass == (0, 0, 0) {
        None
    } else {
        Some(read_vector(data, 12, COMPASS_SCALE))
    };

    Ok(MotionPacket {
        accelerometer,
        gyroscope,
        compass,
    })
}

/// Parses the four 16-bit colour channels (red, green, blue, clear)
pub fn decode_color(data: &[u8]) -> Result<ColorReading> {
    ensure_len("color", data, COLOR_PACKET_SIZE)?;
    Ok(ColorReading {
        red: read_u16(data, 0),
        green: read_u16(data, 2),
        blue: read_u16(data, 4),
        clear: read_u16(data, 6),
    })
}

/// Parses a temperature packet: integer part in byte 0, fractional digits in
/// byte 1, read back as the decimal `"<integer>.<fraction>"`.
pub fn decode_temperature(data: &[u8]) -> Result<Temperature> {
    ensure_len("temperature", data, TEMPERATURE_PACKET_SIZE)?;
    let celsius: f64 = format!("{}.{}", data[0], data[1])
        .parse()
        .map_err(|_| BridgeError::malformed("temperature", TEMPERATURE_PACKET_SIZE, data.len()))?;
    Ok(Temperature::from_celsius(celsius))
}

/// Battery level in percent
pub fn decode_battery(data: &[u8]) -> Result<u8> {
    ensure_len("battery", data, BATTERY_PACKET_SIZE)?;
    Ok(data[0])
}

/// Button state, pressed iff the first byte is 1
pub fn decode_button(data: &[u8]) -> Result<bool> {
    ensure_len("button", data, BUTTON_PACKET_SIZE)?;
    Ok(data[0] == 1)
}
