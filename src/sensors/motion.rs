//! Accelerometer, gyroscope and magnetometer adapters

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::driver::Thingy52Driver;
use crate::core::events::{DriverEvent, DriverEventKind};
use crate::core::packets::Vector3;
use crate::sensors::{DriverListener, ReadingLifecycle, Sensor, SensorReading, SensorType};

/// Which motion stream a [`MotionSensor`] follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

impl MotionKind {
    fn event_kind(&self) -> DriverEventKind {
        match self {
            Self::Accelerometer => DriverEventKind::Accelerometer,
            Self::Gyroscope => DriverEventKind::Gyroscope,
            Self::Magnetometer => DriverEventKind::Magnetometer,
        }
    }

    fn sensor_type(&self) -> SensorType {
        match self {
            Self::Accelerometer => SensorType::Accelerometer,
            Self::Gyroscope => SensorType::Gyroscope,
            Self::Magnetometer => SensorType::Magnetometer,
        }
    }
}

/// Thingy axes to portrait phone axes
pub(crate) fn remap_to_portrait(sample: &Vector3) -> Vector3 {
    Vector3::new(-sample.y, -sample.x, sample.z)
}

#[derive(Default)]
struct MotionState {
    lifecycle: ReadingLifecycle,
    axes: Mutex<Option<Vector3>>,
}

impl MotionState {
    fn handle(&self, sample: &Vector3) {
        if !self.lifecycle.activated() {
            return;
        }
        let remapped = remap_to_portrait(sample);
        *self.axes.lock().unwrap_or_else(PoisonError::into_inner) = Some(remapped);
        self.lifecycle.emit_reading(SensorReading::Motion(remapped));
    }

    fn axes(&self) -> Option<Vector3> {
        *self.axes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A three-axis sensor fed by one of the driver's motion events
pub struct MotionSensor {
    kind: MotionKind,
    shared: Arc<MotionState>,
    _listener: DriverListener,
}

impl MotionSensor {
    pub fn new(driver: &Thingy52Driver, kind: MotionKind) -> Self {
        let shared = Arc::new(MotionState::default());
        let state = shared.clone();
        let listener = DriverListener::attach(driver, kind.event_kind(), move |event| match event {
            DriverEvent::Accelerometer(sample)
            | DriverEvent::Gyroscope(sample)
            | DriverEvent::Magnetometer(sample) => state.handle(sample),
            _ => {}
        });

        Self {
            kind,
            shared,
            _listener: listener,
        }
    }

    pub fn accelerometer(driver: &Thingy52Driver) -> Self {
        Self::new(driver, MotionKind::Accelerometer)
    }

    pub fn gyroscope(driver: &Thingy52Driver) -> Self {
        Self::new(driver, MotionKind::Gyroscope)
    }

    pub fn magnetometer(driver: &Thingy52Driver) -> Self {
        Self::new(driver, MotionKind::Magnetometer)
    }

    pub fn x(&self) -> Option<f64> {
        self.shared.axes().map(|v| v.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.shared.axes().map(|v| v.y)
    }

    pub fn z(&self) -> Option<f64> {
        self.shared.axes().map(|v| v.z)
    }
}

impl Sensor for MotionSensor {
    fn sensor_type(&self) -> SensorType {
        self.kind.sensor_type()
    }

    fn lifecycle(&self) -> &ReadingLifecycle {
        &self.shared.lifecycle
    }

    fn reading(&self) -> Option<SensorReading> {
        self.shared.axes().map(SensorReading::Motion)
    }
}
