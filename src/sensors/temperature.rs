//! Temperature adapter

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::driver::Thingy52Driver;
use crate::core::events::{DriverEvent, DriverEventKind};
use crate::core::packets::Temperature;
use crate::sensors::{DriverListener, ReadingLifecycle, Sensor, SensorReading, SensorType};

#[derive(Default)]
struct TemperatureState {
    lifecycle: ReadingLifecycle,
    temperature: Mutex<Option<Temperature>>,
}

impl TemperatureState {
    fn handle(&self, temperature: &Temperature) {
        if !self.lifecycle.activated() {
            return;
        }
        *self.temperature.lock().unwrap_or_else(PoisonError::into_inner) = Some(*temperature);
        self.lifecycle.emit_reading(SensorReading::Temperature(*temperature));
    }

    fn temperature(&self) -> Option<Temperature> {
        *self.temperature.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reports every thermometer packet, in three scales
pub struct TemperatureSensor {
    shared: Arc<TemperatureState>,
    _listener: DriverListener,
}

impl TemperatureSensor {
    pub fn new(driver: &Thingy52Driver) -> Self {
        let shared = Arc::new(TemperatureState::default());
        let state = shared.clone();
        let listener = DriverListener::attach(driver, DriverEventKind::Thermometer, move |event| {
            if let DriverEvent::Thermometer(temperature) = event {
                state.handle(temperature);
            }
        });

        Self {
            shared,
            _listener: listener,
        }
    }

    pub fn celsius(&self) -> Option<f64> {
        self.shared.temperature().map(|t| t.celsius)
    }

    pub fn fahrenheit(&self) -> Option<f64> {
        self.shared.temperature().map(|t| t.fahrenheit)
    }

    pub fn kelvin(&self) -> Option<f64> {
        self.shared.temperature().map(|t| t.kelvin)
    }
}

impl Sensor for TemperatureSensor {
    fn sensor_type(&self) -> SensorType {
        SensorType::TemperatureSensor
    }

    fn lifecycle(&self) -> &ReadingLifecycle {
        &self.shared.lifecycle
    }

    fn reading(&self) -> Option<SensorReading> {
        self.shared.temperature().map(SensorReading::Temperature)
    }
}
