//! Decision engine actor.
//!
//! One task owns the latest value of every input and is the only place
//! commands are computed, so recomputation is serialized without locks.
//! Producers only talk to it through the signal bus.

use crate::config::OverlayConfig;
use audiofocus_bus::{EngineStatus, EngineStatusSnapshot, Signal, SignalEnvelope, SignalReceiver};
use audiofocus_context::{decide, OverlayCommand, OverlayInputs, TargetApp};
use audiofocus_events::{emit_event, event_names, EventBusRef, OverlayCommandEvent};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Input cells plus dedupe state, confined to the engine task.
struct EngineState {
    inputs: OverlayInputs,
    last_emitted: OverlayCommand,
    enabled_apps: BTreeSet<TargetApp>,
    events: EventBusRef,
    status: Arc<EngineStatus>,
    commands: watch::Sender<OverlayCommand>,
}

impl EngineState {
    /// Store the latest value for the signal's source.
    ///
    /// Snapshots for disabled apps are stored as absent.
    fn apply(&mut self, envelope: SignalEnvelope) {
        self.status.increment_signals_received();
        tracing::trace!(seq = envelope.seq, source = envelope.signal.source(), "signal");

        match envelope.signal {
            Signal::Window(window) => {
                self.inputs.window = window.filter(|w| self.enabled_apps.contains(&w.app));
            }
            Signal::Playback(playback) => {
                self.inputs.playback = playback.filter(|p| self.enabled_apps.contains(&p.app));
            }
            Signal::ManualPause(paused) => self.inputs.manual_pause = paused,
            Signal::Foreground(package) => self.inputs.foreground_package = package,
        }
    }

    /// Recompute and emit if the command changed.
    fn flush(&mut self) {
        self.status.increment_recomputations();
        let command = decide(&self.inputs);

        if command == self.last_emitted {
            self.status.increment_duplicates_suppressed();
            tracing::trace!(?command, "command unchanged");
            return;
        }

        let previous = std::mem::replace(&mut self.last_emitted, command);
        self.status.increment_commands_emitted();
        tracing::debug!(%command, %previous, inputs = ?self.inputs, "overlay command");

        emit_event(
            &*self.events,
            event_names::OVERLAY_COMMAND,
            &OverlayCommandEvent::new(command, previous),
        );
        self.commands.send_replace(command);
    }
}

/// Settings for a [`DecisionEngine`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub debounce: Duration,
    pub enabled_apps: BTreeSet<TargetApp>,
}

impl From<&OverlayConfig> for EngineSettings {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            debounce: config.debounce(),
            enabled_apps: config.enabled_apps.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

/// Debounced, deduplicated overlay decision.
pub struct DecisionEngine {
    settings: EngineSettings,
    events: EventBusRef,
}

impl DecisionEngine {
    pub fn new(settings: EngineSettings, events: EventBusRef) -> Self {
        Self { settings, events }
    }

    /// Spawn the engine task on the current tokio runtime.
    ///
    /// The task ends when the handle is stopped or every sender is dropped.
    pub fn spawn(self, receiver: SignalReceiver) -> EngineHandle {
        let cancel = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));
        let status = Arc::new(EngineStatus::new());
        let (tx, rx) = watch::channel(OverlayCommand::Hide);

        let state = EngineState {
            inputs: OverlayInputs::default(),
            last_emitted: OverlayCommand::Hide,
            enabled_apps: self.settings.enabled_apps,
            events: self.events,
            status: Arc::clone(&status),
            commands: tx,
        };

        tokio::spawn(run(
            state,
            receiver,
            self.settings.debounce,
            cancel.child_token(),
            Arc::clone(&running),
        ));

        EngineHandle {
            cancel,
            running,
            status,
            commands: rx,
        }
    }
}

async fn run(
    mut state: EngineState,
    mut receiver: SignalReceiver,
    debounce: Duration,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
) {
    tracing::info!(debounce_ms = debounce.as_millis() as u64, "decision engine started");

    'outer: loop {
        let first = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = receiver.recv() => envelope,
        };
        let Some(envelope) = first else {
            break;
        };
        state.apply(envelope);

        // Each new signal restarts the quiescence window.
        let mut closed = false;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'outer,
                next = receiver.recv() => match next {
                    Some(envelope) => state.apply(envelope),
                    None => {
                        closed = true;
                        break;
                    }
                },
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        state.flush();
        if closed {
            break;
        }
    }

    running.store(false, Ordering::Release);
    tracing::info!(status = ?state.status.snapshot(), "decision engine stopped");
}

/// Handle to a running [`DecisionEngine`]. Dropping it stops the engine.
pub struct EngineHandle {
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
    status: Arc<EngineStatus>,
    commands: watch::Receiver<OverlayCommand>,
}

impl EngineHandle {
    /// Stop the engine. Pending, not yet debounced input is discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Last emitted command. `Hide` before anything was emitted.
    pub fn current_command(&self) -> OverlayCommand {
        *self.commands.borrow()
    }

    /// Stream of emitted commands.
    pub fn subscribe(&self) -> watch::Receiver<OverlayCommand> {
        self.commands.clone()
    }

    pub fn status(&self) -> EngineStatusSnapshot {
        self.status.snapshot()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiofocus_bus::{SignalBus, SignalSender};
    use audiofocus_context::{
        ContentType, OverlayMode, PlaybackActivity, PlaybackSnapshot, WindowMode, WindowSnapshot,
    };
    use audiofocus_events::InMemoryEventBus;

    const DEBOUNCE: Duration = Duration::from_millis(200);

    fn start(enabled_apps: &[TargetApp]) -> (EngineHandle, SignalSender, Arc<InMemoryEventBus>) {
        let mut bus = SignalBus::new();
        let events = Arc::new(InMemoryEventBus::new());
        let settings = EngineSettings {
            debounce: DEBOUNCE,
            enabled_apps: enabled_apps.iter().copied().collect(),
        };
        let handle = DecisionEngine::new(settings, events.clone())
            .spawn(bus.take_receiver().unwrap());
        (handle, bus.sender(), events)
    }

    fn playing_video(app: TargetApp) -> Option<PlaybackSnapshot> {
        Some(PlaybackSnapshot::new(app, PlaybackActivity::Playing, ContentType::Video))
    }

    fn window(app: TargetApp, mode: WindowMode) -> Option<WindowSnapshot> {
        Some(WindowSnapshot::new(app, mode))
    }

    fn emitted(events: &InMemoryEventBus) -> Vec<OverlayCommand> {
        events
            .payloads_for::<OverlayCommandEvent>(event_names::OVERLAY_COMMAND)
            .into_iter()
            .map(|e| e.command)
            .collect()
    }

    async fn settle() {
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_after_quiescence() {
        let (handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTube));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(emitted(&events).is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Full)]);
        assert_eq!(handle.current_command(), OverlayCommand::Show(OverlayMode::Full));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_restarts_window() {
        let (_handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_playback(playing_video(TargetApp::YouTubeMusic));
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            sender.send_window(window(TargetApp::YouTubeMusic, WindowMode::Minimized));
        }
        assert!(emitted(&events).is_empty());

        settle().await;
        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Partial)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_flip_is_coalesced() {
        let (handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::PictureInPicture));
        sender.send_playback(playing_video(TargetApp::YouTube));
        settle().await;

        sender.send_window(window(TargetApp::YouTube, WindowMode::NotVisible));
        tokio::time::sleep(Duration::from_millis(20)).await;
        sender.send_window(window(TargetApp::YouTube, WindowMode::PictureInPicture));
        settle().await;

        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Full)]);
        let status = handle.status();
        assert_eq!(status.commands_emitted, 1);
        assert_eq!(status.duplicates_suppressed, 1);
        assert_eq!(status.recomputations, 2);
        assert_eq!(status.signals_received, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_hide_is_not_emitted() {
        let (handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        settle().await;

        assert!(emitted(&events).is_empty());
        assert_eq!(handle.status().duplicates_suppressed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_pause_forces_hide_and_release_restores() {
        let (_handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTubeMusic, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTubeMusic));
        settle().await;
        sender.send_manual_pause(true);
        settle().await;
        sender.send_manual_pause(false);
        settle().await;

        assert_eq!(
            emitted(&events),
            vec![
                OverlayCommand::Show(OverlayMode::Full),
                OverlayCommand::Hide,
                OverlayCommand::Show(OverlayMode::Full),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_app_counts_as_absent() {
        let (_handle, sender, events) = start(&[TargetApp::YouTubeMusic]);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTube));
        settle().await;
        assert!(emitted(&events).is_empty());

        sender.send_window(window(TargetApp::YouTubeMusic, WindowMode::Minimized));
        sender.send_playback(playing_video(TargetApp::YouTubeMusic));
        settle().await;
        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Partial)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreground_demotes_window() {
        let (_handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTube));
        sender.send_foreground(Some("com.example.launcher".to_string()));
        settle().await;
        assert!(emitted(&events).is_empty());

        sender.send_foreground(Some(TargetApp::YouTube.package_name().to_string()));
        settle().await;
        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Full)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_commands() {
        let (handle, sender, _events) = start(&TargetApp::PRIORITY);
        let mut commands = handle.subscribe();

        sender.send_window(window(TargetApp::YouTube, WindowMode::Minimized));
        sender.send_playback(playing_video(TargetApp::YouTube));

        commands.changed().await.unwrap();
        assert_eq!(*commands.borrow(), OverlayCommand::Show(OverlayMode::Full));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_pending_and_ends_task() {
        let (handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTube));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();
        settle().await;

        assert!(emitted(&events).is_empty());
        assert!(!handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_senders_flushes_and_ends_task() {
        let (handle, sender, events) = start(&TargetApp::PRIORITY);

        sender.send_window(window(TargetApp::YouTube, WindowMode::Fullscreen));
        sender.send_playback(playing_video(TargetApp::YouTube));
        drop(sender);
        settle().await;

        assert_eq!(emitted(&events), vec![OverlayCommand::Show(OverlayMode::Full)]);
        assert!(!handle.is_running());
    }
}
