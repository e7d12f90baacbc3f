//! Sensor constructor table
//! Application code asks the registry for a sensor by its platform name and
//! receives whatever is bound to that name: a platform-native implementation,
//! or a Thingy:52-backed one after [`SensorRegistry::replace_sensors`].

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::core::driver::Thingy52Driver;
use crate::error::{BridgeError, Result};
use crate::sensors::{
    AmbientLightSensor, MotionSensor, Sensor, SensorType, TemperatureSensor,
};

pub type SensorConstructor = Arc<dyn Fn() -> Box<dyn Sensor> + Send + Sync>;

/// Builds Thingy:52-backed sensors of `sensor_type` on `driver`
pub fn thingy52_constructor(driver: Thingy52Driver, sensor_type: SensorType) -> SensorConstructor {
    Arc::new(move || -> Box<dyn Sensor> {
        match sensor_type {
            SensorType::Accelerometer => Box::new(MotionSensor::accelerometer(&driver)),
            SensorType::Gyroscope => Box::new(MotionSensor::gyroscope(&driver)),
            SensorType::Magnetometer => Box::new(MotionSensor::magnetometer(&driver)),
            SensorType::AmbientLightSensor => Box::new(AmbientLightSensor::new(&driver)),
            SensorType::TemperatureSensor => Box::new(TemperatureSensor::new(&driver)),
        }
    })
}

#[derive(Default, Clone)]
pub struct SensorRegistry {
    constructors: HashMap<String, SensorConstructor>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `constructor`, replacing any existing binding
    pub fn register(&mut self, name: impl Into<String>, constructor: SensorConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Rebinds each requested name the Thingy:52 supports to its
    /// implementation on `driver`. Unknown names are skipped.
    ///
    /// Returns the sensor types that were rebound.
    pub fn replace_sensors<S: AsRef<str>>(
        &mut self,
        driver: &Thingy52Driver,
        requested: &[S],
    ) -> Vec<SensorType> {
        let mut replaced = Vec::new();
        for name in requested {
            let name = name.as_ref();
            match name.parse::<SensorType>() {
                Ok(sensor_type) => {
                    let constructor = thingy52_constructor(driver.clone(), sensor_type);
                    self.register(sensor_type.name(), constructor);
                    info!("{} now backed by Thingy:52", sensor_type);
                    replaced.push(sensor_type);
                }
                Err(_) => debug!("Ignoring unsupported sensor {}", name),
            }
        }
        replaced
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Constructs a new sensor of the type bound to `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn Sensor>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| BridgeError::SensorUnavailable(name.to_string()))?;
        Ok(constructor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_ignored() {
        let driver = Thingy52Driver::new();
        let mut registry = SensorRegistry::new();

        let replaced = registry.replace_sensors(
            &driver,
            &["Accelerometer", "ProximitySensor", "TemperatureSensor"],
        );

        assert_eq!(replaced, vec![SensorType::Accelerometer, SensorType::TemperatureSensor]);
        assert!(registry.is_registered("Accelerometer"));
        assert!(!registry.is_registered("ProximitySensor"));
        assert!(matches!(
            registry.create("ProximitySensor"),
            Err(BridgeError::SensorUnavailable(name)) if name == "ProximitySensor"
        ));
    }

    #[test]
    fn created_sensor_has_requested_type() {
        let driver = Thingy52Driver::new();
        let mut registry = SensorRegistry::new();
        registry.replace_sensors(&driver, &SensorType::ALL.map(|t| t.name()));

        for sensor_type in SensorType::ALL {
            let sensor = registry.create(sensor_type.name()).unwrap();
            assert_eq!(sensor.sensor_type(), sensor_type);
            assert!(!sensor.activated());
        }
    }

    #[test]
    fn native_bindings_survive_unless_replaced() {
        let native_driver = Thingy52Driver::new();
        let native: SensorConstructor = Arc::new(move || -> Box<dyn Sensor> {
            Box::new(TemperatureSensor::new(&native_driver))
        });
        let mut registry = SensorRegistry::new();
        registry.register("Accelerometer", native.clone());
        registry.register("ProximitySensor", native);

        let driver = Thingy52Driver::new();
        let replaced = registry.replace_sensors(&driver, &["Accelerometer"]);

        assert_eq!(replaced, vec![SensorType::Accelerometer]);
        let accelerometer = registry.create("Accelerometer").unwrap();
        assert_eq!(accelerometer.sensor_type(), SensorType::Accelerometer);
        let proximity = registry.create("ProximitySensor").unwrap();
        assert_eq!(proximity.sensor_type(), SensorType::TemperatureSensor);
    }
}
