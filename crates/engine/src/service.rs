//! Service wiring.
//!
//! Builds the registry, gate, engine and transport surface around one signal
//! bus and tears them down together.

use crate::config::{self, OverlayConfig};
use crate::engine::{DecisionEngine, EngineHandle, EngineSettings};
use crate::gate::OverrideGate;
use audiofocus_bus::{signal_channel, SignalSender};
use audiofocus_context::{
    PlaybackSnapshot, WindowChangedEvent, WindowPoller, WindowSignalProvider, WindowSnapshot,
};
use audiofocus_events::{emit_event, event_names, EventBusRef, PlaybackChangedEvent};
use audiofocus_session::{ClockRef, ContentClassifier, SessionRegistry, SnapshotSink, SystemClock};
use audiofocus_transport::{RegistryTransport, TransportControl, TransportControlRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The overlay core as one unit.
///
/// Session events go to [`OverlayService::registry`], window observations to
/// [`OverlayService::report_window`] or a window poller, and the user switch
/// to [`OverlayService::gate`]. Commands come out of
/// [`OverlayService::engine`] and the event bus.
pub struct OverlayService {
    config: OverlayConfig,
    signals: SignalSender,
    registry: SessionRegistry,
    gate: OverrideGate,
    transport: RegistryTransport,
    engine: EngineHandle,
    poller: Mutex<WindowPoller>,
    stopped: AtomicBool,
}

impl OverlayService {
    /// Validate `config` and start the engine on the current tokio runtime.
    pub fn start(config: OverlayConfig, events: EventBusRef) -> config::Result<Self> {
        Self::start_with_clock(config, events, Arc::new(SystemClock::new()))
    }

    /// Like [`OverlayService::start`], with the clock used for cache expiry.
    pub fn start_with_clock(
        config: OverlayConfig,
        events: EventBusRef,
        clock: ClockRef,
    ) -> config::Result<Self> {
        config.validate()?;

        let (signals, receiver) = signal_channel();

        let engine = DecisionEngine::new(EngineSettings::from(&config), Arc::clone(&events))
            .spawn(receiver);

        let sink = playback_sink(signals.clone(), Arc::clone(&events));
        let classifier = ContentClassifier::new(config.content_cache_ttl(), clock);
        let registry = SessionRegistry::with_classifier(sink, classifier);

        let gate = OverrideGate::new(signals.clone(), events);
        let transport = RegistryTransport::new(registry.clone());

        tracing::info!(?config, "overlay service started");

        Ok(Self {
            config,
            signals,
            registry,
            gate,
            transport,
            engine,
            poller: Mutex::new(WindowPoller::new()),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &OverrideGate {
        &self.gate
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn transport(&self) -> &RegistryTransport {
        &self.transport
    }

    /// Transport surface for a presentation layer that should not see the registry.
    pub fn transport_control(&self) -> TransportControlRef {
        Arc::new(self.transport.clone())
    }

    pub fn has_active_controller(&self) -> bool {
        self.transport.has_active_controller()
    }

    /// Push a window observation from an event-driven monitor.
    pub fn report_window(&self, window: Option<WindowSnapshot>) {
        self.signals.send_window(window);
    }

    /// Push the package currently in front, if known.
    pub fn report_foreground(&self, package: Option<String>) {
        self.signals.send_foreground(package);
    }

    /// Poll `provider` on a background thread at the configured interval.
    pub fn start_window_poller<P>(&self, provider: Arc<P>)
    where
        P: WindowSignalProvider + ?Sized + 'static,
    {
        let signals = self.signals.clone();
        let callback = Arc::new(move |event: WindowChangedEvent| {
            signals.send_window(event.window);
            signals.send_foreground(event.foreground_package);
        });

        self.poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .start_with_interval(provider, callback, self.config.window_poll_interval());
    }

    /// Stop the poller and the engine, and release every controller subscription.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stop();
        self.engine.stop();
        self.registry.shutdown();
        tracing::info!(status = ?self.engine.status(), "overlay service stopped");
    }
}

impl Drop for OverlayService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Registry sink: feed the engine and tell the presentation layer.
fn playback_sink(signals: SignalSender, events: EventBusRef) -> SnapshotSink {
    Arc::new(move |snapshot: Option<PlaybackSnapshot>| {
        signals.send_playback(snapshot);
        emit_event(
            &*events,
            event_names::PLAYBACK_CHANGED,
            &PlaybackChangedEvent::new(snapshot),
        );
    })
}
