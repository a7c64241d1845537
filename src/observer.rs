//! # Event Observer
//!
//! A small synchronous publish/subscribe registry used to notify callers
//! (UI, logging, test doubles) of connection and mission events without
//! coupling [`crate::reactor::Reactor`] to any particular consumer. Plain
//! trait objects rather than a channel-based broadcaster, since the set of
//! subscribers is small and local to one task.

use std::path::PathBuf;

/// Events the reactor publishes as it processes frames.
#[derive(Debug, Clone, PartialEq)]
pub enum IipsEvent {
    /// The connection watchdog transitioned connected/disconnected.
    ConnectionChanged(bool),
    /// A mission upload completed and its plan file was written.
    PlanReady(PathBuf),
    /// A free-form diagnostic message, mirroring the original's status log.
    Message(String),
}

/// Receives published [`IipsEvent`]s.
pub trait Observer: Send + Sync {
    fn notify(&self, event: IipsEvent);
}

/// Holds a list of observers and fans every event out to each of them.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    /// Registers an observer; it receives every subsequent `publish`.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Synchronously delivers `event` to every registered observer.
    pub fn publish(&self, event: IipsEvent) {
        for observer in &self.observers {
            observer.notify(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<IipsEvent>>>);
    impl Observer for Recorder {
        fn notify(&self, event: IipsEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn publish_reaches_all_subscribers() {
        let log_a = Arc::new(Mutex::new(Vec::new()));
        let log_b = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.subscribe(Box::new(Recorder(log_a.clone())));
        registry.subscribe(Box::new(Recorder(log_b.clone())));

        registry.publish(IipsEvent::ConnectionChanged(true));

        assert_eq!(log_a.lock().unwrap().len(), 1);
        assert_eq!(log_b.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let registry = ObserverRegistry::new();
        assert!(registry.is_empty());
        registry.publish(IipsEvent::Message("no subscribers".into())); // must not panic
    }
}
