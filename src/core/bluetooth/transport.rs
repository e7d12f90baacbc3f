//! The narrow set of BLE capabilities the driver depends on
//! Scanning, GATT discovery, read/write/notify and disconnect notification.
//! [`crate::core::bluetooth::BluestTransport`] implements these over the
//! platform stack; anything else (a simulator, a test double) can too.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::bluetooth::types::DeviceFilter;
use crate::error::Result;

/// Called once per characteristic-value-changed notification, in arrival order
pub type NotificationHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Called at most once when the peripheral drops the link on its own
pub type DisconnectHandler = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Keeps a notification or disconnect registration alive.
///
/// Dropping the handle stops delivery.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Finds peripherals
#[async_trait]
pub trait BleTransport: Send + Sync {
    /// Returns the first peripheral matching `filter`
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Arc<dyn GattPeripheral>>;
}

/// A peripheral that may or may not be connected
#[async_trait]
pub trait GattPeripheral: Send + Sync {
    fn id(&self) -> String;

    fn name(&self) -> Option<String>;

    /// Establishes the GATT connection
    async fn connect(&self) -> Result<()>;

    /// Drops the GATT connection. A no-op if already disconnected.
    async fn disconnect(&self) -> Result<()>;

    /// Registers `handler` for a peripheral-initiated disconnect
    async fn watch_disconnect(&self, handler: DisconnectHandler) -> Result<Subscription>;

    /// Fails with `ServiceUnavailable` if the peripheral lacks the service
    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>>;
}

#[async_trait]
pub trait GattService: Send + Sync {
    /// Fails with `CharacteristicUnavailable` if the service lacks it
    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>>;
}

#[async_trait]
pub trait GattCharacteristic: Send + Sync {
    async fn read(&self) -> Result<Vec<u8>>;

    async fn write(&self, value: &[u8]) -> Result<()>;

    /// Starts notifications. Returns once the peripheral has accepted the
    /// subscription; `handler` then runs for every value change.
    async fn subscribe(&self, handler: NotificationHandler) -> Result<Subscription>;
}
