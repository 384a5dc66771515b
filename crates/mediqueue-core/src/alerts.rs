//! In-process emergency alert channel.
//!
//! Live dashboards subscribe once and are notified for every alert raised
//! afterwards. Delivery is synchronous and best effort: a missing
//! subscriber loses nothing stored, the alert is still in the database.

use std::sync::{Arc, RwLock};

use crate::models::EmergencyEvent;

/// Receives emergency events.
pub trait AlertSubscriber: Send + Sync {
    fn on_emergency(&self, event: &EmergencyEvent);
}

/// Fan-out of emergency events to every subscriber.
#[derive(Default)]
pub struct AlertBus {
    subscribers: RwLock<Vec<Arc<dyn AlertSubscriber>>>,
}

impl AlertBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn AlertSubscriber>) {
        match self.subscribers.write() {
            Ok(mut subscribers) => subscribers.push(subscriber),
            Err(poisoned) => poisoned.into_inner().push(subscriber),
        }
    }

    /// Notify every subscriber once. Returns the number notified.
    pub fn publish(&self, event: &EmergencyEvent) -> usize {
        // Clone the list so a subscriber may subscribe from its callback.
        let subscribers: Vec<Arc<dyn AlertSubscriber>> = match self.subscribers.read() {
            Ok(subscribers) => subscribers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        for subscriber in &subscribers {
            subscriber.on_emergency(event);
        }
        tracing::info!(
            alert_id = event.alert_id,
            subscribers = subscribers.len(),
            "Emergency alert published"
        );
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }
}

/// Subscriber that records every event, for tests and polling hosts.
#[derive(Default)]
pub struct RecordingSubscriber {
    events: std::sync::Mutex<Vec<EmergencyEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> Vec<EmergencyEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AlertSubscriber for RecordingSubscriber {
    fn on_emergency(&self, event: &EmergencyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
