use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::core::driver::Thingy52Driver;
use crate::core::events::{DriverEvent, DriverEventKind};
use crate::core::notifier::{EventHub, Listener, ListenerId, Notifier};
use crate::sensors::{SensorEvent, SensorEventKind, SensorReading};

/// A driver listener that is removed again when the guard drops
pub(crate) struct DriverListener {
    driver: Thingy52Driver,
    id: ListenerId,
}

impl DriverListener {
    pub(crate) fn attach(
        driver: &Thingy52Driver,
        kind: DriverEventKind,
        listener: impl Fn(&DriverEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            driver: driver.clone(),
            id: driver.on(kind, listener),
        }
    }
}

impl Drop for DriverListener {
    fn drop(&mut self) {
        self.driver.remove_listener(self.id);
    }
}

#[derive(Debug, Default)]
struct LifecycleState {
    activated: bool,
    has_reading: bool,
    timestamp: Option<Instant>,
}

/// Activation flag, reading flag, timestamp and `reading` listeners.
///
/// Composed into every sensor adapter.
pub struct ReadingLifecycle {
    state: Mutex<LifecycleState>,
    events: EventHub<SensorEvent>,
}

impl ReadingLifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::default()),
            events: EventHub::new(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn activated(&self) -> bool {
        self.state().activated
    }

    pub fn has_reading(&self) -> bool {
        self.state().has_reading
    }

    pub fn timestamp(&self) -> Option<Instant> {
        self.state().timestamp
    }

    pub fn start(&self) {
        self.state().activated = true;
    }

    pub fn stop(&self) {
        self.state().activated = false;
    }

    /// Stamps and publishes `reading`. A no-op returning false while stopped.
    pub fn emit_reading(&self, reading: SensorReading) -> bool {
        {
            let mut state = self.state();
            if !state.activated {
                return false;
            }
            state.timestamp = Some(Instant::now());
            state.has_reading = true;
        }
        self.events.dispatch(&SensorEvent::Reading(reading));
        true
    }

    pub fn add_listener(
        &self,
        kind: SensorEventKind,
        listener: Listener<SensorEvent>,
    ) -> ListenerId {
        self.events.add_listener(kind, listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    pub fn dispatch(&self, event: &SensorEvent) {
        self.events.dispatch(event)
    }
}

impl Default for ReadingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
