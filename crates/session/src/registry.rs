//! Session registry.
//!
//! Keeps at most one controller per target app, owns the callback
//! subscription for each, and publishes the globally selected playback
//! snapshot whenever it changes.

use crate::classifier::ContentClassifier;
use crate::controller::{
    map_activity, ControllerCallback, ControllerEvent, ControllerHandle, MediaMetadata,
    NativePlaybackState, Subscription,
};
use crate::progress::PlaybackProgress;
use audiofocus_context::{PlaybackActivity, PlaybackSnapshot, TargetApp};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Receives the selected snapshot each time it changes.
///
/// Called with the registry lock held, so it must not call back into the
/// registry. Forwarding onto a channel is the intended use.
pub type SnapshotSink = Arc<dyn Fn(Option<PlaybackSnapshot>) + Send + Sync + 'static>;

/// Pick the snapshot the overlay should follow.
///
/// First playing snapshot in [`TargetApp::PRIORITY`] order; otherwise the
/// first available one in the same order. Static priority keeps the result
/// deterministic when both apps update at once.
pub fn select_current(snapshots: &HashMap<TargetApp, PlaybackSnapshot>) -> Option<PlaybackSnapshot> {
    TargetApp::PRIORITY
        .iter()
        .filter_map(|app| snapshots.get(app))
        .find(|s| s.activity == PlaybackActivity::Playing)
        .or_else(|| {
            TargetApp::PRIORITY
                .iter()
                .find_map(|app| snapshots.get(app))
        })
        .copied()
}

struct ControllerEntry {
    session_identity: String,
    controller: ControllerHandle,
    subscription: Subscription,
}

struct RegistryState {
    entries: HashMap<TargetApp, ControllerEntry>,
    snapshots: HashMap<TargetApp, PlaybackSnapshot>,
    last_published: Option<PlaybackSnapshot>,
    classifier: ContentClassifier,
    shut_down: bool,
}

impl RegistryState {
    /// Rebuild the snapshot for `app` from its live controller.
    fn refresh(&mut self, app: TargetApp) {
        let Some(entry) = self.entries.get(&app) else {
            self.snapshots.remove(&app);
            return;
        };

        let state = entry.controller.playback_state();
        let metadata = entry.controller.metadata();
        match build_snapshot(app, state.as_ref(), metadata.as_ref(), &mut self.classifier) {
            Some(snapshot) => {
                self.snapshots.insert(app, snapshot);
            }
            None => {
                self.snapshots.remove(&app);
            }
        }
    }

    /// Drop the entry for `app` along with its snapshot. The caller releases
    /// the returned subscription outside the lock.
    fn take_entry(&mut self, app: TargetApp) -> Option<ControllerEntry> {
        self.snapshots.remove(&app);
        self.entries.remove(&app)
    }

    /// Publish the selected snapshot if it changed.
    fn dispatch(&mut self, sink: &SnapshotSink) {
        let selected = select_current(&self.snapshots);
        if selected != self.last_published {
            tracing::debug!(snapshot = ?selected, "selected playback changed");
            self.last_published = selected;
            sink(selected);
        }
    }
}

/// Snapshot for one controller. `None` when it reports neither state nor metadata.
fn build_snapshot(
    app: TargetApp,
    state: Option<&NativePlaybackState>,
    metadata: Option<&MediaMetadata>,
    classifier: &mut ContentClassifier,
) -> Option<PlaybackSnapshot> {
    if state.is_none() && metadata.is_none() {
        return None;
    }
    let activity = map_activity(state);
    let content_type = classifier.classify(app, activity, metadata);
    Some(PlaybackSnapshot::new(app, activity, content_type))
}

struct Shared {
    state: Mutex<RegistryState>,
    sink: SnapshotSink,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Registry of live media controllers for the target apps.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Clone)]
pub struct SessionRegistry {
    shared: Arc<Shared>,
}

impl SessionRegistry {
    pub fn new(sink: SnapshotSink) -> Self {
        Self::with_classifier(sink, ContentClassifier::default())
    }

    pub fn with_classifier(sink: SnapshotSink, classifier: ContentClassifier) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState {
                    entries: HashMap::new(),
                    snapshots: HashMap::new(),
                    last_published: None,
                    classifier,
                    shut_down: false,
                }),
                sink,
            }),
        }
    }

    /// Handle a session event for `app`.
    ///
    /// A controller under a different identity is unsubscribed and discarded
    /// first. `None` removes the app's entry. A new controller is subscribed
    /// and published once. The same identity again only re-publishes.
    pub fn on_session_event(
        &self,
        app: TargetApp,
        session_identity: impl Into<String>,
        controller: Option<ControllerHandle>,
    ) {
        let session_identity = session_identity.into();

        let replaced = {
            let mut state = self.shared.lock();
            if state.shut_down {
                tracing::warn!(app = %app, "session event after shutdown ignored");
                return;
            }

            let same_session = state
                .entries
                .get(&app)
                .is_some_and(|e| e.session_identity == session_identity);
            if same_session && controller.is_some() {
                state.refresh(app);
                state.dispatch(&self.shared.sink);
                return;
            }

            state.take_entry(app)
        };

        if let Some(old) = replaced {
            tracing::debug!(
                app = %app,
                old = %old.session_identity,
                new = %session_identity,
                "releasing previous session"
            );
            old.subscription.release();
        }

        let Some(controller) = controller else {
            let mut state = self.shared.lock();
            state.dispatch(&self.shared.sink);
            return;
        };

        let callback = self.callback_for(app, session_identity.clone());
        let subscription = match controller.subscribe(callback) {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(app = %app, session = %session_identity, error = %e, "controller subscribe failed");
                let mut state = self.shared.lock();
                state.dispatch(&self.shared.sink);
                return;
            }
        };

        let mut state = self.shared.lock();
        if state.shut_down {
            drop(state);
            subscription.release();
            return;
        }

        tracing::debug!(app = %app, session = %session_identity, "controller installed");
        state.entries.insert(
            app,
            ControllerEntry {
                session_identity,
                controller,
                subscription,
            },
        );
        state.refresh(app);
        state.dispatch(&self.shared.sink);
    }

    /// Remove the entry for `app` if it still belongs to `session_identity`.
    pub fn on_session_removed(&self, app: TargetApp, session_identity: &str) {
        let removed = {
            let mut state = self.shared.lock();
            let matches = state
                .entries
                .get(&app)
                .is_some_and(|e| e.session_identity == session_identity);
            if !matches {
                return;
            }
            let entry = state.take_entry(app);
            state.dispatch(&self.shared.sink);
            entry
        };

        if let Some(entry) = removed {
            tracing::debug!(app = %app, session = %session_identity, "session removed");
            entry.subscription.release();
        }
    }

    fn callback_for(&self, app: TargetApp, session_identity: String) -> ControllerCallback {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move |event: ControllerEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            handle_controller_event(&shared, app, &session_identity, event);
        })
    }

    /// The snapshot last published to the sink.
    pub fn current_snapshot(&self) -> Option<PlaybackSnapshot> {
        self.shared.lock().last_published
    }

    /// Controller behind the currently selected snapshot.
    pub fn current_controller(&self) -> Option<ControllerHandle> {
        let state = self.shared.lock();
        let app = state.last_published?.app;
        state.entries.get(&app).map(|e| Arc::clone(&e.controller))
    }

    pub fn has_active_controller(&self) -> bool {
        self.current_controller().is_some()
    }

    pub fn controller_for(&self, app: TargetApp) -> Option<ControllerHandle> {
        self.shared
            .lock()
            .entries
            .get(&app)
            .map(|e| Arc::clone(&e.controller))
    }

    pub fn session_identity(&self, app: TargetApp) -> Option<String> {
        self.shared
            .lock()
            .entries
            .get(&app)
            .map(|e| e.session_identity.clone())
    }

    pub fn snapshot_for(&self, app: TargetApp) -> Option<PlaybackSnapshot> {
        self.shared.lock().snapshots.get(&app).copied()
    }

    /// Estimated position of the selected session at `now_ms` (controller clock).
    pub fn current_progress(&self, now_ms: i64) -> Option<PlaybackProgress> {
        let controller = self.current_controller()?;
        let state = controller.playback_state()?;
        let duration = controller.metadata().and_then(|m| m.duration_ms);
        Some(PlaybackProgress::estimate(&state, duration, now_ms))
    }

    /// Release every subscription and publish "no session".
    ///
    /// Later session events are ignored.
    pub fn shutdown(&self) {
        let entries: Vec<(TargetApp, ControllerEntry)> = {
            let mut state = self.shared.lock();
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            state.snapshots.clear();
            state.classifier.clear();
            state.dispatch(&self.shared.sink);
            state.entries.drain().collect()
        };

        tracing::info!(released = entries.len(), "session registry shut down");
        for (_, entry) in entries {
            entry.subscription.release();
        }
    }
}

fn handle_controller_event(
    shared: &Shared,
    app: TargetApp,
    session_identity: &str,
    event: ControllerEvent,
) {
    let released = {
        let mut state = shared.lock();
        let current = state
            .entries
            .get(&app)
            .is_some_and(|e| e.session_identity == session_identity);
        if !current {
            tracing::trace!(app = %app, session = session_identity, "stale controller callback");
            return;
        }

        match event {
            ControllerEvent::SessionDestroyed => {
                let entry = state.take_entry(app);
                state.dispatch(&shared.sink);
                entry
            }
            ControllerEvent::PlaybackStateChanged | ControllerEvent::MetadataChanged => {
                state.refresh(app);
                state.dispatch(&shared.sink);
                None
            }
        }
    };

    if let Some(entry) = released {
        tracing::debug!(app = %app, session = session_identity, "session destroyed");
        entry.subscription.release();
    }
}
