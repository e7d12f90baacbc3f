//! In-memory stand-in for a Thingy:52 and the BLE stack around it

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use thingy52_bridge::core::bluetooth::{
    BleTransport, DeviceFilter, DisconnectHandler, GattCharacteristic, GattPeripheral,
    GattService, NotificationHandler, Subscription, UUID_BATTERY_LEVEL, UUID_BATTERY_SERVICE,
    UUID_BUTTON_CHAR, UUID_COLOR_CHAR, UUID_ENVIRONMENT_SERVICE, UUID_LED_CHAR,
    UUID_MOTION_RAW_CHAR, UUID_MOTION_SERVICE, UUID_TEMPERATURE_CHAR,
    UUID_USER_INTERFACE_SERVICE,
};
use thingy52_bridge::core::{DriverEvent, DriverEventKind, Thingy52Driver};
use thingy52_bridge::error::{BridgeError, Result};

/// Transport calls in the order they happened, across all fake peripherals
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub const THINGY_LAYOUT: &[(Uuid, &[Uuid])] = &[
    (UUID_MOTION_SERVICE, &[UUID_MOTION_RAW_CHAR]),
    (UUID_ENVIRONMENT_SERVICE, &[UUID_TEMPERATURE_CHAR, UUID_COLOR_CHAR]),
    (UUID_USER_INTERFACE_SERVICE, &[UUID_LED_CHAR, UUID_BUTTON_CHAR]),
    (UUID_BATTERY_SERVICE, &[UUID_BATTERY_LEVEL]),
];

pub struct FakeCharacteristic {
    value: Mutex<Vec<u8>>,
    writes: Mutex<Vec<Vec<u8>>>,
    handlers: Mutex<Vec<(CancellationToken, NotificationHandler)>>,
    refuse_subscribe: AtomicBool,
}

impl FakeCharacteristic {
    fn new() -> Self {
        Self {
            value: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            handlers: Mutex::new(Vec::new()),
            refuse_subscribe: AtomicBool::new(false),
        }
    }

    pub fn set_value(&self, value: &[u8]) {
        *self.value.lock().unwrap() = value.to_vec();
    }

    pub fn refuse_subscribe(&self) {
        self.refuse_subscribe.store(true, Ordering::SeqCst);
    }

    /// Delivers `value` to every live subscriber
    pub fn notify(&self, value: &[u8]) {
        let handlers: Vec<NotificationHandler> = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(token, _)| !token.is_cancelled())
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(value);
        }
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(token, _)| !token.is_cancelled())
            .count()
    }
}

#[async_trait]
impl GattCharacteristic for FakeCharacteristic {
    async fn read(&self) -> Result<Vec<u8>> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn write(&self, value: &[u8]) -> Result<()> {
        self.writes.lock().unwrap().push(value.to_vec());
        Ok(())
    }

    async fn subscribe(&self, handler: NotificationHandler) -> Result<Subscription> {
        if self.refuse_subscribe.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport("notifications not permitted".into()));
        }
        let token = CancellationToken::new();
        self.handlers.lock().unwrap().push((token.clone(), handler));
        Ok(Subscription::new(token))
    }
}

pub struct FakeService {
    uuid: Uuid,
    characteristics: HashMap<Uuid, Arc<FakeCharacteristic>>,
}

#[async_trait]
impl GattService for FakeService {
    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>> {
        match self.characteristics.get(&uuid) {
            Some(characteristic) => Ok(characteristic.clone()),
            None => Err(BridgeError::CharacteristicUnavailable {
                service: self.uuid,
                characteristic: uuid,
            }),
        }
    }
}

pub struct FakePeripheral {
    id: String,
    services: HashMap<Uuid, Arc<FakeService>>,
    connected: AtomicBool,
    watchers: Mutex<Vec<(CancellationToken, DisconnectHandler)>>,
    refuse_watch: AtomicBool,
    fail_disconnect: AtomicBool,
    log: CallLog,
}

impl FakePeripheral {
    pub fn new(id: &str, log: &CallLog, layout: &[(Uuid, &[Uuid])]) -> Arc<Self> {
        let services = layout
            .iter()
            .map(|(service, characteristics)| {
                let characteristics = characteristics
                    .iter()
                    .map(|uuid| (*uuid, Arc::new(FakeCharacteristic::new())))
                    .collect();
                (
                    *service,
                    Arc::new(FakeService {
                        uuid: *service,
                        characteristics,
                    }),
                )
            })
            .collect();

        let peripheral = Arc::new(Self {
            id: id.to_string(),
            services,
            connected: AtomicBool::new(false),
            watchers: Mutex::new(Vec::new()),
            refuse_watch: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            log: log.clone(),
        });
        let battery = peripheral.try_characteristic(UUID_BATTERY_SERVICE, UUID_BATTERY_LEVEL);
        if let Some(battery) = battery {
            battery.set_value(&[87]);
        }
        peripheral
    }

    /// A complete Thingy:52 with its battery at 87%
    pub fn thingy(id: &str, log: &CallLog) -> Arc<Self> {
        Self::new(id, log, THINGY_LAYOUT)
    }

    /// A Thingy as seen through a stack that hides the battery service
    pub fn thingy_without_battery(id: &str, log: &CallLog) -> Arc<Self> {
        let layout: Vec<_> = THINGY_LAYOUT
            .iter()
            .copied()
            .filter(|(service, _)| *service != UUID_BATTERY_SERVICE)
            .collect();
        Self::new(id, log, &layout)
    }

    fn try_characteristic(
        &self,
        service: Uuid,
        characteristic: Uuid,
    ) -> Option<Arc<FakeCharacteristic>> {
        self.services
            .get(&service)
            .and_then(|s| s.characteristics.get(&characteristic))
            .cloned()
    }

    pub fn characteristic(&self, service: Uuid, characteristic: Uuid) -> Arc<FakeCharacteristic> {
        self.try_characteristic(service, characteristic)
            .expect("characteristic in layout")
    }

    pub fn motion(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_MOTION_SERVICE, UUID_MOTION_RAW_CHAR)
    }

    pub fn thermometer(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_ENVIRONMENT_SERVICE, UUID_TEMPERATURE_CHAR)
    }

    pub fn color(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_ENVIRONMENT_SERVICE, UUID_COLOR_CHAR)
    }

    pub fn button(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_USER_INTERFACE_SERVICE, UUID_BUTTON_CHAR)
    }

    pub fn led(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_USER_INTERFACE_SERVICE, UUID_LED_CHAR)
    }

    pub fn battery(&self) -> Arc<FakeCharacteristic> {
        self.characteristic(UUID_BATTERY_SERVICE, UUID_BATTERY_LEVEL)
    }

    /// Makes the stack reject link-loss watchers
    pub fn refuse_watch(&self) {
        self.refuse_watch.store(true, Ordering::SeqCst);
    }

    /// Makes local disconnects report an error after dropping the link
    pub fn fail_disconnect(&self) {
        self.fail_disconnect.store(true, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Peripheral-initiated disconnect: runs every live link-loss handler
    pub async fn drop_link(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.fire_watchers().await;
    }

    async fn fire_watchers(&self) {
        let watchers: Vec<_> = self.watchers.lock().unwrap().drain(..).collect();
        for (token, handler) in watchers {
            if !token.is_cancelled() {
                handler().await;
            }
        }
    }
}

#[async_trait]
impl GattPeripheral for FakePeripheral {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> Option<String> {
        Some("Thingy".to_string())
    }

    async fn connect(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!("connect:{}", self.id));
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!("disconnect:{}", self.id));
        self.connected.store(false, Ordering::SeqCst);
        // platforms report the link loss for local disconnects too
        self.fire_watchers().await;
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport("link already gone".into()));
        }
        Ok(())
    }

    async fn watch_disconnect(&self, handler: DisconnectHandler) -> Result<Subscription> {
        if self.refuse_watch.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport("connection events unavailable".into()));
        }
        let token = CancellationToken::new();
        self.watchers.lock().unwrap().push((token.clone(), handler));
        Ok(Subscription::new(token))
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>> {
        match self.services.get(&uuid) {
            Some(service) => Ok(service.clone()),
            None => Err(BridgeError::ServiceUnavailable(uuid)),
        }
    }
}

/// Hands out one preconfigured peripheral, or times out
pub struct FakeTransport {
    peripheral: Option<Arc<FakePeripheral>>,
    pub requests: Mutex<Vec<DeviceFilter>>,
}

impl FakeTransport {
    pub fn new(peripheral: Option<Arc<FakePeripheral>>) -> Self {
        Self {
            peripheral,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BleTransport for FakeTransport {
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Arc<dyn GattPeripheral>> {
        self.requests.lock().unwrap().push(filter.clone());
        match &self.peripheral {
            Some(peripheral) => Ok(peripheral.clone()),
            None => Err(BridgeError::ScanTimeout(filter.timeout)),
        }
    }
}

const ALL_KINDS: [DriverEventKind; 9] = [
    DriverEventKind::Connect,
    DriverEventKind::Disconnect,
    DriverEventKind::Accelerometer,
    DriverEventKind::Gyroscope,
    DriverEventKind::Magnetometer,
    DriverEventKind::Battery,
    DriverEventKind::Thermometer,
    DriverEventKind::Color,
    DriverEventKind::Button,
];

/// Records every event the driver emits
pub fn record(driver: &Thingy52Driver) -> Arc<Mutex<Vec<DriverEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    for kind in ALL_KINDS {
        let sink = events.clone();
        driver.on(kind, move |event| sink.lock().unwrap().push(event.clone()));
    }
    events
}

pub fn kinds(events: &Arc<Mutex<Vec<DriverEvent>>>) -> Vec<DriverEventKind> {
    use thingy52_bridge::core::Event;
    events.lock().unwrap().iter().map(|e| e.kind()).collect()
}

/// Builds a raw motion packet from nine raw axis values
pub fn motion_packet(values: [i16; 9]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn color_packet(red: u16, green: u16, blue: u16, clear: u16) -> Vec<u8> {
    [red, green, blue, clear]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}
