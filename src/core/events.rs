//! Events published by the driver

use std::fmt;

use serde::Serialize;

use crate::core::bluetooth::types::DeviceInfo;
use crate::core::notifier::Event;
use crate::core::packets::{ColorReading, Temperature, Vector3};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "detail", rename_all = "lowercase")]
pub enum DriverEvent {
    Connect(DeviceInfo),
    Disconnect,
    Accelerometer(Vector3),
    Gyroscope(Vector3),
    Magnetometer(Vector3),
    /// Battery level in percent
    Battery(u8),
    Thermometer(Temperature),
    Color(ColorReading),
    /// Whether the button is pressed
    Button(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverEventKind {
    Connect,
    Disconnect,
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Battery,
    Thermometer,
    Color,
    Button,
}

impl DriverEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Accelerometer => "accelerometer",
            Self::Gyroscope => "gyroscope",
            Self::Magnetometer => "magnetometer",
            Self::Battery => "battery",
            Self::Thermometer => "thermometer",
            Self::Color => "color",
            Self::Button => "button",
        }
    }
}

impl fmt::Display for DriverEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event for DriverEvent {
    type Kind = DriverEventKind;

    fn kind(&self) -> DriverEventKind {
        match self {
            Self::Connect(_) => DriverEventKind::Connect,
            Self::Disconnect => DriverEventKind::Disconnect,
            Self::Accelerometer(_) => DriverEventKind::Accelerometer,
            Self::Gyroscope(_) => DriverEventKind::Gyroscope,
            Self::Magnetometer(_) => DriverEventKind::Magnetometer,
            Self::Battery(_) => DriverEventKind::Battery,
            Self::Thermometer(_) => DriverEventKind::Thermometer,
            Self::Color(_) => DriverEventKind::Color,
            Self::Button(_) => DriverEventKind::Button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_name() {
        let json = serde_json::to_value(DriverEvent::Button(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "button", "detail": true }));

        let json = serde_json::to_value(DriverEvent::Disconnect).unwrap();
        assert_eq!(json["event"], "disconnect");
    }

    #[test]
    fn kind_names_match_serialized_names() {
        let event = DriverEvent::Accelerometer(Vector3::new(0.0, 0.0, 1.0));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.kind().as_str());
    }
}
