//! Transport surface for the presentation layer.

use crate::commander::{self, TransportOutcome};
use audiofocus_context::PlaybackSnapshot;
use audiofocus_session::{PlaybackProgress, SessionRegistry};
use std::sync::Arc;

/// Narrow view of the registry a presentation layer needs to drive playback.
pub trait TransportControl: Send + Sync {
    fn has_active_controller(&self) -> bool;

    fn toggle_play_pause(&self) -> TransportOutcome;

    fn seek_by(&self, delta_ms: i64) -> TransportOutcome;

    fn seek_to(&self, position_ms: i64) -> TransportOutcome;
}

/// Type alias for a shared transport surface.
pub type TransportControlRef = Arc<dyn TransportControl>;

/// [`TransportControl`] acting on the registry's selected session.
///
/// The controller is looked up on every call, so commands follow the
/// selection as sessions come and go.
#[derive(Clone)]
pub struct RegistryTransport {
    registry: SessionRegistry,
}

impl RegistryTransport {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Selected snapshot, for rendering track state.
    pub fn current_snapshot(&self) -> Option<PlaybackSnapshot> {
        self.registry.current_snapshot()
    }

    pub fn progress(&self, now_ms: i64) -> Option<PlaybackProgress> {
        self.registry.current_progress(now_ms)
    }

    fn with_controller<F>(&self, intent: &'static str, f: F) -> TransportOutcome
    where
        F: FnOnce(&dyn audiofocus_session::MediaController) -> TransportOutcome,
    {
        match self.registry.current_controller() {
            Some(controller) => f(controller.as_ref()),
            None => {
                tracing::debug!(intent, "no active controller");
                TransportOutcome::NoController
            }
        }
    }
}

impl TransportControl for RegistryTransport {
    fn has_active_controller(&self) -> bool {
        self.registry.has_active_controller()
    }

    fn toggle_play_pause(&self) -> TransportOutcome {
        self.with_controller("toggle_play_pause", commander::toggle_play_pause)
    }

    fn seek_by(&self, delta_ms: i64) -> TransportOutcome {
        self.with_controller("seek_by", |c| commander::seek_by(c, delta_ms))
    }

    fn seek_to(&self, position_ms: i64) -> TransportOutcome {
        self.with_controller("seek_to", |c| commander::seek_to(c, position_ms))
    }
}

/// Transport surface with nothing behind it.
pub struct NullTransport;

impl TransportControl for NullTransport {
    fn has_active_controller(&self) -> bool {
        false
    }

    fn toggle_play_pause(&self) -> TransportOutcome {
        TransportOutcome::NoController
    }

    fn seek_by(&self, _delta_ms: i64) -> TransportOutcome {
        TransportOutcome::NoController
    }

    fn seek_to(&self, _position_ms: i64) -> TransportOutcome {
        TransportOutcome::NoController
    }
}
