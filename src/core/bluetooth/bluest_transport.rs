//! Transport implementation over the platform Bluetooth stack via `bluest`

use std::sync::Arc;

use async_trait::async_trait;
use bluest::{Adapter, Characteristic, ConnectionEvent, Device, Service};
use futures_util::StreamExt;
use log::{debug, error, info};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::bluetooth::transport::{
    BleTransport, DisconnectHandler, GattCharacteristic, GattPeripheral, GattService,
    NotificationHandler, Subscription,
};
use crate::core::bluetooth::types::DeviceFilter;
use crate::error::{BridgeError, Result};

impl From<bluest::Error> for BridgeError {
    fn from(e: bluest::Error) -> Self {
        BridgeError::Transport(e.to_string())
    }
}

/// The default system adapter
#[derive(Clone)]
pub struct BluestTransport {
    adapter: Adapter,
}

impl BluestTransport {
    /// Opens the default adapter and waits for it to power on
    pub async fn new() -> Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or_else(|| BridgeError::TransportUnavailable("No Bluetooth adapter found".into()))?;
        adapter
            .wait_available()
            .await
            .map_err(|e| BridgeError::TransportUnavailable(e.to_string()))?;
        info!("Bluetooth adapter is available.");
        Ok(Self { adapter })
    }

    fn peripheral(&self, device: Device) -> Arc<dyn GattPeripheral> {
        Arc::new(BluestPeripheral {
            adapter: self.adapter.clone(),
            device,
        })
    }
}

#[async_trait]
impl BleTransport for BluestTransport {
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Arc<dyn GattPeripheral>> {
        // find connected device first
        info!("Checking for connected devices");
        let connected = self
            .adapter
            .connected_devices_with_services(&filter.services)
            .await?;
        if let Some(device) = connected.into_iter().next() {
            info!("Found connected device: {}", device.id());
            return Ok(self.peripheral(device));
        }

        debug!(
            "Starting bluetooth scan for {:?} (optional services {:?})",
            filter.services, filter.optional_services
        );
        let mut scan_stream = self.adapter.scan(&filter.services).await?;
        let found = tokio::time::timeout(filter.timeout, scan_stream.next())
            .await
            .map_err(|_| BridgeError::ScanTimeout(filter.timeout))?;

        match found {
            Some(discovered) => {
                let name = discovered.device.name().unwrap_or_else(|_| "Unknown".to_string());
                info!(
                    "Found device - ID: {}, Name: {}, RSSI: {:?}",
                    discovered.device.id(),
                    name,
                    discovered.rssi
                );
                Ok(self.peripheral(discovered.device))
            }
            None => Err(BridgeError::Transport("Bluetooth scan stream has ended".into())),
        }
    }
}

pub struct BluestPeripheral {
    adapter: Adapter,
    device: Device,
}

#[async_trait]
impl GattPeripheral for BluestPeripheral {
    fn id(&self) -> String {
        self.device.id().to_string()
    }

    fn name(&self) -> Option<String> {
        self.device.name().ok()
    }

    async fn connect(&self) -> Result<()> {
        if !self.device.is_connected().await {
            info!("Initiating connection to {}...", self.device.id());
            self.adapter.connect_device(&self.device).await?;
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.device.is_connected().await {
            info!("Disconnecting from device {}", self.device.id());
            self.adapter.disconnect_device(&self.device).await?;
        } else {
            debug!("Device {} not connected", self.device.id());
        }
        Ok(())
    }

    async fn watch_disconnect(&self, handler: DisconnectHandler) -> Result<Subscription> {
        let adapter = self.adapter.clone();
        let device = self.device.clone();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut events = match adapter.device_connection_events(&device).await {
                Ok(events) => {
                    let _ = ready_tx.send(Ok(()));
                    events
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(BridgeError::from(e)));
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => return,
                    event = events.next() => match event {
                        Some(ConnectionEvent::Disconnected) => break,
                        Some(_) => continue,
                        None => return,
                    }
                }
            }

            info!("Device {} dropped the connection", device.id());
            handler().await;
        });

        ready_rx
            .await
            .map_err(|_| BridgeError::Transport("connection watcher exited".into()))??;
        Ok(Subscription::new(token))
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>> {
        let services = self.device.discover_services_with_uuid(uuid).await?;
        let service = services
            .into_iter()
            .next()
            .ok_or(BridgeError::ServiceUnavailable(uuid))?;
        Ok(Arc::new(BluestService { service }))
    }
}

struct BluestService {
    service: Service,
}

#[async_trait]
impl GattService for BluestService {
    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>> {
        let characteristics = self.service.discover_characteristics_with_uuid(uuid).await?;
        let characteristic = characteristics.into_iter().next().ok_or(
            BridgeError::CharacteristicUnavailable {
                service: self.service.uuid(),
                characteristic: uuid,
            },
        )?;
        Ok(Arc::new(BluestCharacteristic { characteristic }))
    }
}

struct BluestCharacteristic {
    characteristic: Characteristic,
}

#[async_trait]
impl GattCharacteristic for BluestCharacteristic {
    async fn read(&self) -> Result<Vec<u8>> {
        Ok(self.characteristic.read().await?)
    }

    async fn write(&self, value: &[u8]) -> Result<()> {
        debug!("Writing {:?} to {}", value, self.characteristic.uuid());
        Ok(self.characteristic.write(value).await?)
    }

    async fn subscribe(&self, handler: NotificationHandler) -> Result<Subscription> {
        let characteristic = self.characteristic.clone();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(async move {
            let uuid = characteristic.uuid();
            let mut notification_stream = match characteristic.notify().await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(BridgeError::from(e)));
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    result = notification_stream.next() => match result {
                        Some(Ok(value)) => handler(&value),
                        Some(Err(e)) => {
                            error!("Error in notification stream for {}: {}", uuid, e);
                            break;
                        }
                        None => break,
                    }
                }
            }

            debug!("Notification stream for {} ended", uuid);
        });

        ready_rx
            .await
            .map_err(|_| BridgeError::Transport("notification task exited".into()))??;
        Ok(Subscription::new(token))
    }
}
