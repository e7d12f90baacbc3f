//! Sensor adapters
//! Objects shaped like the platform sensor API (`start`, `stop`, `activated`,
//! `hasReading`, `timestamp`, a `reading` event) fed by the Thingy:52 driver.

mod ambient_light;
mod lifecycle;
mod motion;
mod registry;
mod temperature;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;

use crate::core::notifier::{Event, Listener, ListenerId, Notifier};
use crate::core::packets::{Temperature, Vector3};

pub use ambient_light::AmbientLightSensor;
pub use lifecycle::ReadingLifecycle;
use lifecycle::DriverListener;
pub use motion::{MotionKind, MotionSensor};
pub use registry::{SensorConstructor, SensorRegistry, thingy52_constructor};
pub use temperature::TemperatureSensor;

/// Standard sensor interfaces the adapter can stand in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorType {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    AmbientLightSensor,
    TemperatureSensor,
}

impl SensorType {
    pub const ALL: [SensorType; 5] = [
        SensorType::Accelerometer,
        SensorType::Gyroscope,
        SensorType::Magnetometer,
        SensorType::AmbientLightSensor,
        SensorType::TemperatureSensor,
    ];

    /// The platform interface name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accelerometer => "Accelerometer",
            Self::Gyroscope => "Gyroscope",
            Self::Magnetometer => "Magnetometer",
            Self::AmbientLightSensor => "AmbientLightSensor",
            Self::TemperatureSensor => "TemperatureSensor",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unsupported sensor type: {s}"))
    }
}

/// A sensor value after remapping and unit conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorReading {
    Motion(Vector3),
    Illuminance { illuminance: f64 },
    Temperature(Temperature),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorEventKind {
    Reading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SensorEvent {
    Reading(SensorReading),
}

impl Event for SensorEvent {
    type Kind = SensorEventKind;

    fn kind(&self) -> SensorEventKind {
        match self {
            Self::Reading(_) => SensorEventKind::Reading,
        }
    }
}

/// The surface every adapter exposes
pub trait Sensor: Send + Sync {
    fn sensor_type(&self) -> SensorType;

    fn lifecycle(&self) -> &ReadingLifecycle;

    /// Latest accepted reading
    fn reading(&self) -> Option<SensorReading>;

    fn activated(&self) -> bool {
        self.lifecycle().activated()
    }

    fn has_reading(&self) -> bool {
        self.lifecycle().has_reading()
    }

    /// When the latest reading was accepted
    fn timestamp(&self) -> Option<Instant> {
        self.lifecycle().timestamp()
    }

    fn start(&self) {
        self.lifecycle().start();
    }

    fn stop(&self) {
        self.lifecycle().stop();
    }

    fn on_reading(&self, listener: Listener<SensorEvent>) -> ListenerId {
        self.lifecycle().add_listener(SensorEventKind::Reading, listener)
    }
}

impl<S: Sensor + ?Sized> Notifier<SensorEvent> for S {
    fn add_listener(&self, kind: SensorEventKind, listener: Listener<SensorEvent>) -> ListenerId {
        self.lifecycle().add_listener(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.lifecycle().remove_listener(id)
    }

    fn dispatch(&self, event: &SensorEvent) {
        self.lifecycle().dispatch(event)
    }
}
