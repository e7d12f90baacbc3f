//! Thingy:52 outbound commands
//! The LED characteristic is the only one the driver writes to.

use serde::{Deserialize, Serialize};

use crate::core::bluetooth::constants::LED_COMMAND_PACKET_SIZE;

/// LED mode byte for a constant colour
const LED_MODE_CONSTANT: u8 = 0x01;

/// An RGB colour, one byte per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Sets the LED to a constant colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand {
    pub color: LedColor,
}

impl LedCommand {
    pub fn new(color: LedColor) -> Self {
        Self { color }
    }

    /// Convert the command to its byte representation: `[mode, r, g, b]`
    pub fn to_bytes(&self) -> [u8; LED_COMMAND_PACKET_SIZE] {
        [LED_MODE_CONSTANT, self.color.r, self.color.g, self.color.b]
    }
}
