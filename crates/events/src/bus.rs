//! Event bus abstraction for decoupled event emission.
//!
//! The core never talks to a presentation layer directly; it emits JSON
//! payloads on named topics and whoever renders the overlay subscribes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for emitting events to subscribers.
///
/// Implementations must not call back into the emitter: events are emitted
/// from inside the engine task and the session registry.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name/topic (e.g., "overlay:command")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it on `topic`.
///
/// Serialization failures are logged and dropped; a malformed event must
/// never take the emitter down.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::warn!(topic, error = %e, "failed to serialize event"),
    }
}

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.guard().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every payload on `topic`, skipping ones that do not match `T`.
    pub fn payloads_for<T: DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.events_for(topic)
            .into_iter()
            .filter_map(|e| serde_json::from_value(e.payload).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.guard().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Event bus that forwards every event to `tracing`.
///
/// Used by the headless daemon, where there is no presentation layer.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        tracing::info!(topic, %payload, "event");
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_event_bus() {
        let bus = InMemoryEventBus::new();

        bus.emit("overlay:command", json!({"key": "value1"}));
        bus.emit("playback:changed", json!({"key": "value2"}));
        bus.emit("overlay:command", json!({"key": "value3"}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for("overlay:command").len(), 2);
        assert_eq!(bus.events_for("playback:changed").len(), 1);
        assert_eq!(bus.events_for("test:missing").len(), 0);
    }

    #[test]
    fn test_in_memory_event_bus_clear() {
        let bus = InMemoryEventBus::new();

        bus.emit("test:event", json!({}));
        assert!(!bus.is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_emit_event_serializes() {
        #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Ping {
            n: u32,
        }

        let bus = InMemoryEventBus::new();
        emit_event(&bus, "test:ping", &Ping { n: 7 });

        let pings: Vec<Ping> = bus.payloads_for("test:ping");
        assert_eq!(pings, vec![Ping { n: 7 }]);
    }

    #[test]
    fn test_null_event_bus() {
        let bus = NullEventBus;
        bus.emit("test:event", json!({"data": "ignored"}));
    }
}
