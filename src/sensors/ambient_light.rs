//! Ambient light adapter over the colour sensor's clear channel

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::driver::Thingy52Driver;
use crate::core::events::{DriverEvent, DriverEventKind};
use crate::sensors::{DriverListener, ReadingLifecycle, Sensor, SensorReading, SensorType};

/// Illuminance moves in steps of this size
const ILLUMINANCE_STEP: u16 = 50;

pub(crate) fn quantize_illuminance(clear: u16) -> u16 {
    (clear / ILLUMINANCE_STEP) * ILLUMINANCE_STEP
}

#[derive(Default)]
struct AmbientLightState {
    lifecycle: ReadingLifecycle,
    illuminance: Mutex<Option<u16>>,
}

impl AmbientLightState {
    fn handle(&self, clear: u16) {
        if !self.lifecycle.activated() {
            return;
        }
        let value = quantize_illuminance(clear);
        {
            let mut illuminance = self.illuminance.lock().unwrap_or_else(PoisonError::into_inner);
            if *illuminance == Some(value) {
                return;
            }
            *illuminance = Some(value);
        }
        self.lifecycle.emit_reading(SensorReading::Illuminance {
            illuminance: value as f64,
        });
    }

    fn illuminance(&self) -> Option<f64> {
        self.illuminance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(f64::from)
    }
}

/// Reports illuminance only when it crosses into a different step
pub struct AmbientLightSensor {
    shared: Arc<AmbientLightState>,
    _listener: DriverListener,
}

impl AmbientLightSensor {
    pub fn new(driver: &Thingy52Driver) -> Self {
        let shared = Arc::new(AmbientLightState::default());
        let state = shared.clone();
        let listener = DriverListener::attach(driver, DriverEventKind::Color, move |event| {
            if let DriverEvent::Color(color) = event {
                state.handle(color.clear);
            }
        });

        Self {
            shared,
            _listener: listener,
        }
    }

    /// Latest illuminance, a multiple of 50
    pub fn illuminance(&self) -> Option<f64> {
        self.shared.illuminance()
    }
}

impl Sensor for AmbientLightSensor {
    fn sensor_type(&self) -> SensorType {
        SensorType::AmbientLightSensor
    }

    fn lifecycle(&self) -> &ReadingLifecycle {
        &self.shared.lifecycle
    }

    fn reading(&self) -> Option<SensorReading> {
        self.illuminance()
            .map(|illuminance| SensorReading::Illuminance { illuminance })
    }
}
