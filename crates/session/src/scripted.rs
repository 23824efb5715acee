//! In-process controller driven by explicit calls.
//!
//! Backs the replay daemon and the tests. State is changed with the setters
//! and announced to subscribers with [`ScriptedController::fire`]; transport
//! commands are recorded and applied to the held state.

use crate::controller::{
    ControllerCallback, ControllerEvent, MediaController, MediaMetadata, NativePlaybackState,
    PlaybackStateCode, Subscription,
};
use crate::error::{Result, SessionError};
use std::sync::{Arc, Mutex, MutexGuard};

/// Transport command received by a [`ScriptedController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCall {
    Play,
    Pause,
    SeekTo(i64),
    Rewind,
    FastForward,
}

/// Ordered log shared between controllers, for asserting cross-controller ordering.
pub type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct Inner {
    state: Option<NativePlaybackState>,
    metadata: Option<MediaMetadata>,
    callbacks: Vec<(u64, ControllerCallback)>,
    next_id: u64,
    subscribe_count: usize,
    unsubscribe_count: usize,
    fail_subscribe: bool,
    fail_commands: bool,
    calls: Vec<TransportCall>,
}

pub struct ScriptedController {
    name: String,
    inner: Arc<Mutex<Inner>>,
    journal: Option<Journal>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_state(self, state: NativePlaybackState) -> Self {
        self.set_playback_state(Some(state));
        self
    }

    pub fn with_metadata(self, metadata: MediaMetadata) -> Self {
        self.set_metadata(Some(metadata));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_playback_state(&self, state: Option<NativePlaybackState>) {
        lock(&self.inner).state = state;
    }

    pub fn set_metadata(&self, metadata: Option<MediaMetadata>) {
        lock(&self.inner).metadata = metadata;
    }

    /// Make the next `subscribe` calls fail.
    pub fn fail_subscribe(&self, fail: bool) {
        lock(&self.inner).fail_subscribe = fail;
    }

    /// Make transport commands fail.
    pub fn fail_commands(&self, fail: bool) {
        lock(&self.inner).fail_commands = fail;
    }

    /// Deliver `event` to every live subscriber.
    pub fn fire(&self, event: ControllerEvent) {
        let callbacks: Vec<ControllerCallback> = lock(&self.inner)
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscribe_count(&self) -> usize {
        lock(&self.inner).subscribe_count
    }

    pub fn unsubscribe_count(&self) -> usize {
        lock(&self.inner).unsubscribe_count
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        lock(&self.inner).calls.clone()
    }

    fn record(&self, entry: &str) {
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(format!("{}:{}", self.name, entry));
        }
    }

    fn command(
        &self,
        call: TransportCall,
        name: &'static str,
        apply: impl FnOnce(&mut NativePlaybackState),
    ) -> Result<()> {
        {
            let mut inner = lock(&self.inner);
            inner.calls.push(call);
            if inner.fail_commands {
                return Err(SessionError::CommandFailed {
                    command: name,
                    reason: format!("{} rejected the command", self.name),
                });
            }
            if let Some(state) = inner.state.as_mut() {
                apply(state);
            }
        }
        self.record(name);
        self.fire(ControllerEvent::PlaybackStateChanged);
        Ok(())
    }
}

impl MediaController for ScriptedController {
    fn playback_state(&self) -> Option<NativePlaybackState> {
        lock(&self.inner).state
    }

    fn metadata(&self) -> Option<MediaMetadata> {
        lock(&self.inner).metadata.clone()
    }

    fn subscribe(&self, callback: ControllerCallback) -> Result<Subscription> {
        let id = {
            let mut inner = lock(&self.inner);
            if inner.fail_subscribe {
                return Err(SessionError::SubscribeFailed(format!(
                    "{} is no longer available",
                    self.name
                )));
            }
            inner.subscribe_count += 1;
            inner.next_id += 1;
            let id = inner.next_id;
            inner.callbacks.push((id, callback));
            id
        };
        self.record("subscribe");

        let inner = Arc::clone(&self.inner);
        let journal = self.journal.clone();
        let name = self.name.clone();
        Ok(Subscription::new(move || {
            {
                let mut inner = lock(&inner);
                inner.unsubscribe_count += 1;
                inner.callbacks.retain(|(cb_id, _)| *cb_id != id);
            }
            if let Some(journal) = journal {
                journal
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(format!("{}:unsubscribe", name));
            }
        }))
    }

    fn play(&self) -> Result<()> {
        self.command(TransportCall::Play, "play", |s| s.code = PlaybackStateCode::Playing)
    }

    fn pause(&self) -> Result<()> {
        self.command(TransportCall::Pause, "pause", |s| s.code = PlaybackStateCode::Paused)
    }

    fn seek_to(&self, position_ms: i64) -> Result<()> {
        self.command(TransportCall::SeekTo(position_ms), "seek_to", |s| {
            s.position_ms = position_ms
        })
    }

    fn rewind(&self) -> Result<()> {
        self.command(TransportCall::Rewind, "rewind", |s| {
            s.code = PlaybackStateCode::Rewinding
        })
    }

    fn fast_forward(&self) -> Result<()> {
        self.command(TransportCall::FastForward, "fast_forward", |s| {
            s.code = PlaybackStateCode::FastForwarding
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Capabilities;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_release() {
        let controller = ScriptedController::new("yt");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        let subscription = controller
            .subscribe(Arc::new(move |_: ControllerEvent| {
                hits_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        controller.fire(ControllerEvent::MetadataChanged);
        subscription.release();
        controller.fire(ControllerEvent::MetadataChanged);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(controller.subscribe_count(), 1);
        assert_eq!(controller.unsubscribe_count(), 1);
        assert_eq!(controller.subscriber_count(), 0);
    }

    #[test]
    fn test_commands_apply_to_state() {
        let controller = ScriptedController::new("yt").with_state(NativePlaybackState::new(
            PlaybackStateCode::Paused,
            1_000,
            Capabilities::all(),
        ));

        controller.play().unwrap();
        controller.seek_to(5_000).unwrap();

        let state = controller.playback_state().unwrap();
        assert_eq!(state.code, PlaybackStateCode::Playing);
        assert_eq!(state.position_ms, 5_000);
        assert_eq!(
            controller.calls(),
            vec![TransportCall::Play, TransportCall::SeekTo(5_000)]
        );
    }

    #[test]
    fn test_failures_are_reported() {
        let controller = ScriptedController::new("ytm");
        controller.fail_subscribe(true);
        controller.fail_commands(true);

        assert!(controller.subscribe(Arc::new(|_: ControllerEvent| {})).is_err());
        assert!(matches!(
            controller.pause(),
            Err(SessionError::CommandFailed { command: "pause", .. })
        ));
        assert_eq!(controller.calls(), vec![TransportCall::Pause]);
    }

    #[test]
    fn test_journal_orders_across_controllers() {
        let journal: Journal = Arc::default();
        let a = ScriptedController::new("a").with_journal(Arc::clone(&journal));
        let b = ScriptedController::new("b").with_journal(Arc::clone(&journal));

        let sub = a.subscribe(Arc::new(|_: ControllerEvent| {})).unwrap();
        drop(sub);
        let _sub = b.subscribe(Arc::new(|_: ControllerEvent| {})).unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["a:subscribe", "a:unsubscribe", "b:subscribe"]
        );
    }
}
