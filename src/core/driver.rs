//! Thingy:52 driver
//! Owns the connection to a single peripheral, subscribes to its sensor
//! characteristics and republishes every decoded packet as a [`DriverEvent`].
//!
//! Opening a device runs a fixed sequence: connect, watch for link loss, emit
//! `connect`, then subscribe to motion, thermometer, colour and button
//! notifications, then battery (optional), then resolve the LED
//! characteristic. Any failure except the battery step aborts the sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::bluetooth::commands::{LedColor, LedCommand};
use crate::core::bluetooth::constants::{
    UUID_BATTERY_LEVEL, UUID_BATTERY_SERVICE, UUID_BUTTON_CHAR, UUID_COLOR_CHAR,
    UUID_ENVIRONMENT_SERVICE, UUID_LED_CHAR, UUID_MOTION_RAW_CHAR, UUID_MOTION_SERVICE,
    UUID_TEMPERATURE_CHAR, UUID_USER_INTERFACE_SERVICE,
};
use crate::core::bluetooth::transport::{
    BleTransport, DisconnectHandler, GattCharacteristic, GattPeripheral, NotificationHandler,
    Subscription,
};
use crate::core::bluetooth::types::{DeviceFilter, DeviceInfo};
use crate::core::events::{DriverEvent, DriverEventKind};
use crate::core::notifier::{EventHub, Listener, ListenerId, Notifier};
use crate::core::packets;
use crate::error::{BridgeError, Result};

/// Turns one notification payload into the events it fans out to
type PacketDecoder = fn(&[u8]) -> Result<Vec<DriverEvent>>;

struct NotificationStep {
    packet: &'static str,
    service: Uuid,
    characteristic: Uuid,
    decode: PacketDecoder,
}

/// Mandatory subscriptions, in the order they are made
const SUBSCRIPTION_SEQUENCE: [NotificationStep; 4] = [
    NotificationStep {
        packet: "motion",
        service: UUID_MOTION_SERVICE,
        characteristic: UUID_MOTION_RAW_CHAR,
        decode: motion_events,
    },
    NotificationStep {
        packet: "thermometer",
        service: UUID_ENVIRONMENT_SERVICE,
        characteristic: UUID_TEMPERATURE_CHAR,
        decode: thermometer_events,
    },
    NotificationStep {
        packet: "color",
        service: UUID_ENVIRONMENT_SERVICE,
        characteristic: UUID_COLOR_CHAR,
        decode: color_events,
    },
    NotificationStep {
        packet: "button",
        service: UUID_USER_INTERFACE_SERVICE,
        characteristic: UUID_BUTTON_CHAR,
        decode: button_events,
    },
];

fn motion_events(data: &[u8]) -> Result<Vec<DriverEvent>> {
    let packet = packets::decode_motion(data)?;
    let mut events = vec![
        DriverEvent::Accelerometer(packet.accelerometer),
        DriverEvent::Gyroscope(packet.gyroscope),
    ];
    if let Some(compass) = packet.compass {
        events.push(DriverEvent::Magnetometer(compass));
    }
    Ok(events)
}

fn thermometer_events(data: &[u8]) -> Result<Vec<DriverEvent>> {
    Ok(vec![DriverEvent::Thermometer(packets::decode_temperature(data)?)])
}

fn color_events(data: &[u8]) -> Result<Vec<DriverEvent>> {
    Ok(vec![DriverEvent::Color(packets::decode_color(data)?)])
}

fn button_events(data: &[u8]) -> Result<Vec<DriverEvent>> {
    Ok(vec![DriverEvent::Button(packets::decode_button(data)?)])
}

fn battery_events(data: &[u8]) -> Result<Vec<DriverEvent>> {
    Ok(vec![DriverEvent::Battery(packets::decode_battery(data)?)])
}

/// The active peripheral and everything cached for it
struct Connection {
    /// Distinguishes this connection from earlier ones to the same device
    generation: u64,
    peripheral: Arc<dyn GattPeripheral>,
    device: DeviceInfo,
    /// Link-loss watcher first, then one entry per subscribed characteristic
    subscriptions: Vec<Subscription>,
    subscribed: Vec<Uuid>,
    led: Option<Arc<dyn GattCharacteristic>>,
    battery: Option<Arc<dyn GattCharacteristic>>,
}

struct DriverInner {
    events: Arc<EventHub<DriverEvent>>,
    connection: Mutex<Option<Connection>>,
    generation: AtomicU64,
}

impl DriverInner {
    /// Runs `update` against the connection if it is still the one identified
    /// by `generation`.
    async fn attach(&self, generation: u64, update: impl FnOnce(&mut Connection)) -> Result<()> {
        let mut slot = self.connection.lock().await;
        match slot.as_mut() {
            Some(connection) if connection.generation == generation => {
                update(connection);
                Ok(())
            }
            _ => Err(BridgeError::NotConnected),
        }
    }

    async fn close(&self, connection: Connection, notify_peripheral: bool) {
        let Connection {
            peripheral,
            device,
            subscriptions,
            ..
        } = connection;

        // stop delivery first so the link-loss watcher cannot fire for this teardown
        drop(subscriptions);

        if notify_peripheral {
            if let Err(e) = peripheral.disconnect().await {
                warn!("Failed to disconnect from {}: {}", device.id, e);
            }
        }

        info!("Disconnected from {}", device.id);
        self.events.dispatch(&DriverEvent::Disconnect);
    }

    async fn close_generation(&self, generation: u64) {
        let connection = {
            let mut slot = self.connection.lock().await;
            if slot.as_ref().is_some_and(|c| c.generation == generation) {
                slot.take()
            } else {
                None
            }
        };

        match connection {
            Some(connection) => self.close(connection, false).await,
            None => debug!("Ignoring link loss of stale connection {}", generation),
        }
    }

    fn link_lost_handler(self: &Arc<Self>, generation: u64) -> DisconnectHandler {
        let inner: Weak<Self> = Arc::downgrade(self);
        Box::new(move || -> BoxFuture<'static, ()> {
            Box::pin(async move {
                if let Some(inner) = inner.upgrade() {
                    inner.close_generation(generation).await;
                }
            })
        })
    }

    fn packet_handler(&self, packet: &'static str, decode: PacketDecoder) -> NotificationHandler {
        let events = self.events.clone();
        Arc::new(move |data: &[u8]| match decode(data) {
            Ok(decoded) => {
                for event in &decoded {
                    events.dispatch(event);
                }
            }
            Err(e) => warn!("Dropping {} notification: {}", packet, e),
        })
    }
}

/// Handle to the driver. Clones share the same connection and listeners.
#[derive(Clone)]
pub struct Thingy52Driver {
    inner: Arc<DriverInner>,
}

impl Thingy52Driver {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DriverInner {
                events: Arc::new(EventHub::new()),
                connection: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Registers `listener` for events named `kind`
    pub fn on(
        &self,
        kind: DriverEventKind,
        listener: impl Fn(&DriverEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.add_listener(kind, Arc::new(listener))
    }

    /// Requests a Thingy:52 from `transport` and opens it
    pub async fn scan(
        &self,
        transport: &dyn BleTransport,
        timeout: Duration,
    ) -> Result<DeviceInfo> {
        let peripheral = transport
            .request_device(&DeviceFilter::thingy52(timeout))
            .await?;
        let device = DeviceInfo::new(peripheral.id(), peripheral.name());
        self.open_device(peripheral).await?;
        Ok(device)
    }

    /// Connects to `peripheral` and subscribes to its sensors, first closing
    /// any connection that is already open.
    pub async fn open_device(&self, peripheral: Arc<dyn GattPeripheral>) -> Result<()> {
        // if already connected to a device - close it
        self.disconnect().await;

        peripheral.connect().await?;

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let watcher = match peripheral
            .watch_disconnect(self.inner.link_lost_handler(generation))
            .await
        {
            Ok(watcher) => watcher,
            Err(e) => {
                if let Err(cleanup) = peripheral.disconnect().await {
                    warn!("Failed to disconnect from {}: {}", peripheral.id(), cleanup);
                }
                return Err(e);
            }
        };

        let device = DeviceInfo::new(peripheral.id(), peripheral.name());
        let previous = self.inner.connection.lock().await.replace(Connection {
            generation,
            peripheral: peripheral.clone(),
            device: device.clone(),
            subscriptions: vec![watcher],
            subscribed: Vec::new(),
            led: None,
            battery: None,
        });
        if let Some(previous) = previous {
            // another open finished while this one was connecting
            self.inner.close(previous, true).await;
        }

        info!("Connected to {}", device.id);
        self.inner.events.dispatch(&DriverEvent::Connect(device.clone()));

        for step in &SUBSCRIPTION_SEQUENCE {
            self.start_notifications(peripheral.as_ref(), generation, step).await?;
        }

        // Some stacks (BlueZ in particular) do not expose the 16-bit battery service
        if let Err(e) = self.start_battery_notifications(peripheral.as_ref(), generation).await {
            warn!("Error with battery service: {}", e);
        }

        let led = discover(peripheral.as_ref(), UUID_USER_INTERFACE_SERVICE, UUID_LED_CHAR).await?;
        self.inner
            .attach(generation, move |connection| connection.led = Some(led))
            .await?;

        info!("Opened device: {:?}", device);
        Ok(())
    }

    async fn start_notifications(
        &self,
        peripheral: &dyn GattPeripheral,
        generation: u64,
        step: &NotificationStep,
    ) -> Result<()> {
        debug!("Subscribing to {} notifications", step.packet);
        let characteristic = discover(peripheral, step.service, step.characteristic).await?;
        let subscription = characteristic
            .subscribe(self.inner.packet_handler(step.packet, step.decode))
            .await?;

        let uuid = step.characteristic;
        self.inner
            .attach(generation, move |connection| {
                connection.subscriptions.push(subscription);
                connection.subscribed.push(uuid);
            })
            .await
    }

    async fn start_battery_notifications(
        &self,
        peripheral: &dyn GattPeripheral,
        generation: u64,
    ) -> Result<()> {
        let characteristic = discover(peripheral, UUID_BATTERY_SERVICE, UUID_BATTERY_LEVEL).await?;

        // Read and send initial value
        let level = packets::decode_battery(&characteristic.read().await?)?;
        self.inner.events.dispatch(&DriverEvent::Battery(level));

        let subscription = characteristic
            .subscribe(self.inner.packet_handler("battery", battery_events))
            .await?;

        self.inner
            .attach(generation, move |connection| {
                connection.subscriptions.push(subscription);
                connection.subscribed.push(UUID_BATTERY_LEVEL);
                connection.battery = Some(characteristic);
            })
            .await
    }

    /// Sets the LED to a constant colour
    pub async fn set_led(&self, r: u8, g: u8, b: u8) -> Result<()> {
        let led = self
            .cached(|connection| connection.led.clone())
            .await
            .ok_or(BridgeError::NotConnected)?;
        led.write(&LedCommand::new(LedColor::new(r, g, b)).to_bytes()).await
    }

    /// Reads the current battery level without waiting for a notification
    pub async fn read_battery_level(&self) -> Result<u8> {
        let battery = self
            .cached(|connection| connection.battery.clone())
            .await
            .ok_or(BridgeError::NotConnected)?;
        packets::decode_battery(&battery.read().await?)
    }

    /// Closes the current connection, if any, and emits `disconnect`
    pub async fn disconnect(&self) {
        let connection = self.inner.connection.lock().await.take();
        match connection {
            Some(connection) => self.inner.close(connection, true).await,
            None => debug!("No device connected"),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.connection.lock().await.is_some()
    }

    /// The currently connected device
    pub async fn device(&self) -> Option<DeviceInfo> {
        self.cached(|connection| Some(connection.device.clone())).await
    }

    /// Characteristics with an active notification subscription
    pub async fn subscribed_characteristics(&self) -> Vec<Uuid> {
        self.cached(|connection| Some(connection.subscribed.clone()))
            .await
            .unwrap_or_default()
    }

    async fn cached<T>(&self, read: impl FnOnce(&Connection) -> Option<T>) -> Option<T> {
        self.inner.connection.lock().await.as_ref().and_then(read)
    }
}

impl Default for Thingy52Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier<DriverEvent> for Thingy52Driver {
    fn add_listener(&self, kind: DriverEventKind, listener: Listener<DriverEvent>) -> ListenerId {
        self.inner.events.add_listener(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.events.remove_listener(id)
    }

    fn dispatch(&self, event: &DriverEvent) {
        self.inner.events.dispatch(event)
    }
}

async fn discover(
    peripheral: &dyn GattPeripheral,
    service: Uuid,
    characteristic: Uuid,
) -> Result<Arc<dyn GattCharacteristic>> {
    let service = peripheral.primary_service(service).await?;
    service.characteristic(characteristic).await
}
