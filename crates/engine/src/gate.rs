//! Manual override gate.
//!
//! A user-held switch that forces the overlay hidden. The engine sees it as
//! one more latest-value input, so it composes with everything else through
//! the same debounce and dedupe path.

use audiofocus_bus::SignalSender;
use audiofocus_events::{emit_event, event_names, EventBusRef, ManualPauseChangedEvent};
use std::sync::Mutex;

pub struct OverrideGate {
    /// Held while publishing so concurrent toggles reach the engine in the
    /// order they were applied.
    engaged: Mutex<bool>,
    signals: SignalSender,
    events: EventBusRef,
}

impl OverrideGate {
    pub fn new(signals: SignalSender, events: EventBusRef) -> Self {
        Self {
            engaged: Mutex::new(false),
            signals,
            events,
        }
    }

    pub fn is_engaged(&self) -> bool {
        *self.engaged.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Engage or release the gate. Setting the current value again is a no-op.
    pub fn set(&self, paused: bool) {
        let mut engaged = self.engaged.lock().unwrap_or_else(|e| e.into_inner());
        if *engaged == paused {
            return;
        }
        *engaged = paused;
        self.publish(paused);
    }

    /// Flip the gate and return the new value.
    pub fn toggle(&self) -> bool {
        let mut engaged = self.engaged.lock().unwrap_or_else(|e| e.into_inner());
        *engaged = !*engaged;
        self.publish(*engaged);
        *engaged
    }

    fn publish(&self, paused: bool) {
        tracing::debug!(paused, "manual pause changed");
        if !self.signals.send_manual_pause(paused) {
            tracing::warn!("engine stopped, manual pause not delivered");
        }
        emit_event(
            &*self.events,
            event_names::MANUAL_PAUSE,
            &ManualPauseChangedEvent::new(paused),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiofocus_bus::{Signal, SignalBus};
    use audiofocus_events::InMemoryEventBus;
    use std::sync::Arc;

    #[test]
    fn test_set_publishes_only_changes() {
        let mut bus = SignalBus::new();
        let mut receiver = bus.take_receiver().unwrap();
        let events = Arc::new(InMemoryEventBus::new());
        let gate = OverrideGate::new(bus.sender(), events.clone());

        gate.set(false);
        gate.set(true);
        gate.set(true);

        assert!(gate.is_engaged());
        let signals: Vec<Signal> = receiver.drain().into_iter().map(|e| e.signal).collect();
        assert_eq!(signals, vec![Signal::ManualPause(true)]);

        let payloads: Vec<ManualPauseChangedEvent> = events.payloads_for(event_names::MANUAL_PAUSE);
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].paused);
    }

    #[test]
    fn test_toggle_alternates() {
        let mut bus = SignalBus::new();
        let mut receiver = bus.take_receiver().unwrap();
        let gate = OverrideGate::new(bus.sender(), Arc::new(InMemoryEventBus::new()));

        assert!(gate.toggle());
        assert!(!gate.toggle());
        assert!(!gate.is_engaged());

        let signals: Vec<Signal> = receiver.drain().into_iter().map(|e| e.signal).collect();
        assert_eq!(
            signals,
            vec![Signal::ManualPause(true), Signal::ManualPause(false)]
        );
    }

    #[test]
    fn test_closed_bus_does_not_panic() {
        let mut bus = SignalBus::new();
        drop(bus.take_receiver());
        let gate = OverrideGate::new(bus.sender(), Arc::new(InMemoryEventBus::new()));

        gate.set(true);
        assert!(gate.is_engaged());
    }
}
