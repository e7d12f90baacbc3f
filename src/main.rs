use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use thingy52_bridge::config::BridgeConfig;
use thingy52_bridge::core::bluetooth::BluestTransport;
use thingy52_bridge::core::{DriverEvent, DriverEventKind, Thingy52Driver};
use thingy52_bridge::logging;
use thingy52_bridge::sensors::{Sensor, SensorEvent, SensorRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let path = BridgeConfig::resolve_path(std::env::args().nth(1));
    let config = BridgeConfig::load_config(&path)
        .await
        .with_context(|| format!("invalid config file {}", path.display()))?;
    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    info!("Using config {}", path.display());

    let transport = BluestTransport::new().await?;
    let driver = Thingy52Driver::new();

    let mut registry = SensorRegistry::new();
    let installed = registry.replace_sensors(&driver, &config.sensors);
    let sensors: Vec<Box<dyn Sensor>> = installed
        .iter()
        .map(|sensor_type| registry.create(sensor_type.name()))
        .collect::<Result<_, _>>()?;

    for sensor in &sensors {
        let sensor_type = sensor.sensor_type();
        sensor.on_reading(Arc::new(move |event: &SensorEvent| {
            let SensorEvent::Reading(reading) = event;
            match serde_json::to_string(reading) {
                Ok(json) => println!("{} {}", sensor_type, json),
                Err(e) => error!("Failed to serialize {} reading: {}", sensor_type, e),
            }
        }));
        sensor.start();
    }

    for kind in [DriverEventKind::Button, DriverEventKind::Battery, DriverEventKind::Disconnect] {
        driver.on(kind, |event: &DriverEvent| match serde_json::to_string(event) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize driver event: {}", e),
        });
    }

    let device = driver.scan(&transport, config.scan_timeout()).await?;
    info!("Streaming from {} ({:?})", device.id, device.name);

    if let Some(color) = config.led_on_connect {
        if let Err(e) = driver.set_led(color.r, color.g, color.b).await {
            warn!("Failed to set LED: {}", e);
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    driver.disconnect().await;
    Ok(())
}
