//! Named-event subscription
//! The driver and every sensor publish through an [`EventHub`] and expose it
//! with the [`Notifier`] trait.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// An event that knows which name it is published under
pub trait Event {
    type Kind: Copy + Eq + Hash + Send;

    fn kind(&self) -> Self::Kind;
}

pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Returned by [`Notifier::add_listener`], used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribe, unsubscribe and emit by event name
pub trait Notifier<E: Event> {
    fn add_listener(&self, kind: E::Kind, listener: Listener<E>) -> ListenerId;

    /// Returns false if `id` was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;

    fn dispatch(&self, event: &E);
}

pub struct EventHub<E: Event> {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>>,
}

impl<E: Event> EventHub<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        }
    }
}

impl<E: Event> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Notifier<E> for EventHub<E> {
    fn add_listener(&self, kind: E::Kind, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entry(kind).or_default().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for registered in listeners.values_mut() {
            if let Some(index) = registered.iter().position(|(existing, _)| *existing == id) {
                registered.remove(index);
                return true;
            }
        }
        false
    }

    fn dispatch(&self, event: &E) {
        // listeners may add or remove listeners, so call them unlocked
        let targets: Vec<Listener<E>> = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            match listeners.get(&event.kind()) {
                Some(registered) => registered.iter().map(|(_, l)| l.clone()).collect(),
                None => return,
            }
        };
        for listener in targets {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ping {
        A,
        B,
    }

    impl Event for Ping {
        type Kind = Ping;

        fn kind(&self) -> Ping {
            *self
        }
    }

    fn counter(hub: &EventHub<Ping>, kind: Ping) -> (ListenerId, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let id = hub.add_listener(
            kind,
            Arc::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (id, count)
    }

    #[test]
    fn dispatch_reaches_only_matching_listeners() {
        let hub = EventHub::new();
        let (_, a) = counter(&hub, Ping::A);
        let (_, b) = counter(&hub, Ping::B);

        hub.dispatch(&Ping::A);
        hub.dispatch(&Ping::A);

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let hub = EventHub::new();
        let (id, a) = counter(&hub, Ping::A);

        assert!(hub.remove_listener(id));
        assert!(!hub.remove_listener(id));
        hub.dispatch(&Ping::A);

        assert_eq!(a.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_may_subscribe_during_dispatch() {
        let hub = Arc::new(EventHub::<Ping>::new());
        let count = Arc::new(AtomicUsize::new(0));
        let inner = hub.clone();
        let seen = count.clone();
        hub.add_listener(
            Ping::A,
            Arc::new(move |_| {
                let seen = seen.clone();
                inner.add_listener(
                    Ping::B,
                    Arc::new(move |_| {
                        seen.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        hub.dispatch(&Ping::A);
        hub.dispatch(&Ping::B);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
