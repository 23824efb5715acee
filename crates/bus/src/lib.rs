//! Signal bus feeding the decision engine.
//!
//! Every producer (window poller, session registry, override gate) holds a
//! cloned [`SignalSender`]; the engine owns the single [`SignalReceiver`].
//! One FIFO channel keeps per-source order, and the single consumer keeps all
//! recomputation on one logical sequence.

use audiofocus_context::{PlaybackSnapshot, WindowSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Latest-value update from one input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// `None` means no relevant window is visible.
    Window(Option<WindowSnapshot>),
    /// `None` means no live session is selected.
    Playback(Option<PlaybackSnapshot>),
    ManualPause(bool),
    Foreground(Option<String>),
}

impl Signal {
    /// Short source name for logging.
    pub fn source(&self) -> &'static str {
        match self {
            Signal::Window(_) => "window",
            Signal::Playback(_) => "playback",
            Signal::ManualPause(_) => "manual_pause",
            Signal::Foreground(_) => "foreground",
        }
    }
}

/// Signal with a sequence number and capture time.
#[derive(Debug, Clone)]
pub struct SignalEnvelope {
    /// Monotonic sequence number across all producers.
    pub seq: u64,
    /// Wall clock when the signal was published.
    pub ts_ms: i64,
    pub signal: Signal,
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Sender half of the signal bus.
///
/// Sending never blocks: producers run on OS callback threads and must not
/// stall. Updates are low-rate latest values, so the channel is unbounded.
#[derive(Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<SignalEnvelope>,
    seq_counter: Arc<AtomicU64>,
}

impl SignalSender {
    /// Publish a signal. Returns false once the engine has stopped.
    pub fn send(&self, signal: Signal) -> bool {
        let seq = self.seq_counter.fetch_add(1, Ordering::Relaxed);
        let source = signal.source();
        let envelope = SignalEnvelope {
            seq,
            ts_ms: now_ms(),
            signal,
        };

        match self.tx.send(envelope) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(seq, source, "Signal bus closed");
                false
            }
        }
    }

    pub fn send_window(&self, window: Option<WindowSnapshot>) -> bool {
        self.send(Signal::Window(window))
    }

    pub fn send_playback(&self, playback: Option<PlaybackSnapshot>) -> bool {
        self.send(Signal::Playback(playback))
    }

    pub fn send_manual_pause(&self, paused: bool) -> bool {
        self.send(Signal::ManualPause(paused))
    }

    pub fn send_foreground(&self, package: Option<String>) -> bool {
        self.send(Signal::Foreground(package))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of signals published so far.
    pub fn current_seq(&self) -> u64 {
        self.seq_counter.load(Ordering::Relaxed)
    }
}

/// Receiver half of the signal bus.
pub struct SignalReceiver {
    rx: mpsc::UnboundedReceiver<SignalEnvelope>,
    last_seq: Option<u64>,
}

impl SignalReceiver {
    /// Receive the next signal. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SignalEnvelope> {
        let envelope = self.rx.recv().await?;
        self.track(&envelope);
        Some(envelope)
    }

    /// Try to receive a signal without waiting.
    pub fn try_recv(&mut self) -> Option<SignalEnvelope> {
        let envelope = self.rx.try_recv().ok()?;
        self.track(&envelope);
        Some(envelope)
    }

    fn track(&mut self, envelope: &SignalEnvelope) {
        if let Some(last) = self.last_seq {
            // Producers race for sequence numbers before sending, so small
            // inversions across sources are expected and harmless.
            if envelope.seq < last {
                tracing::trace!(last, seq = envelope.seq, "cross-source reorder");
            }
        }
        self.last_seq = Some(envelope.seq);
    }

    /// Drain every queued signal.
    pub fn drain(&mut self) -> Vec<SignalEnvelope> {
        let mut drained = Vec::new();
        while let Some(envelope) = self.try_recv() {
            drained.push(envelope);
        }
        drained
    }
}

/// Fan-in bus for engine inputs.
pub struct SignalBus {
    sender: SignalSender,
    receiver: Option<SignalReceiver>,
}

/// Create a connected sender/receiver pair.
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        SignalSender {
            tx,
            seq_counter: Arc::new(AtomicU64::new(0)),
        },
        SignalReceiver { rx, last_seq: None },
    )
}

impl SignalBus {
    pub fn new() -> Self {
        let (sender, receiver) = signal_channel();

        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// Get a clone of the sender.
    pub fn sender(&self) -> SignalSender {
        self.sender.clone()
    }

    /// Take the receiver (can only be called once).
    pub fn take_receiver(&mut self) -> Option<SignalReceiver> {
        self.receiver.take()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine counters with atomic fields for lock-free updates.
///
/// Shared via `Arc<EngineStatus>`; written by the engine task, read by anyone.
#[derive(Debug, Default)]
pub struct EngineStatus {
    signals_received: AtomicU64,
    recomputations: AtomicU64,
    commands_emitted: AtomicU64,
    duplicates_suppressed: AtomicU64,
}

impl EngineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals_received(&self) -> u64 {
        self.signals_received.load(Ordering::Relaxed)
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    pub fn commands_emitted(&self) -> u64 {
        self.commands_emitted.load(Ordering::Relaxed)
    }

    pub fn duplicates_suppressed(&self) -> u64 {
        self.duplicates_suppressed.load(Ordering::Relaxed)
    }

    pub fn increment_signals_received(&self) {
        self.signals_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_recomputations(&self) {
        self.recomputations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commands_emitted(&self) {
        self.commands_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_duplicates_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a snapshot for serialization/display.
    pub fn snapshot(&self) -> EngineStatusSnapshot {
        EngineStatusSnapshot {
            signals_received: self.signals_received(),
            recomputations: self.recomputations(),
            commands_emitted: self.commands_emitted(),
            duplicates_suppressed: self.duplicates_suppressed(),
        }
    }
}

/// Snapshot of engine status for serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EngineStatusSnapshot {
    pub signals_received: u64,
    pub recomputations: u64,
    pub commands_emitted: u64,
    pub duplicates_suppressed: u64,
}
