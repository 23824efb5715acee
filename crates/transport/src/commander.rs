//! Capability-aware transport commands for one controller.

use audiofocus_context::PlaybackActivity;
use audiofocus_session::{map_activity, Capabilities, MediaController};
use serde::Serialize;

/// Controller call issued for an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "position_ms", rename_all = "snake_case")]
pub enum TransportAction {
    Play,
    Pause,
    SeekTo(i64),
    Rewind,
    FastForward,
}

impl TransportAction {
    pub fn name(&self) -> &'static str {
        match self {
            TransportAction::Play => "play",
            TransportAction::Pause => "pause",
            TransportAction::SeekTo(_) => "seek_to",
            TransportAction::Rewind => "rewind",
            TransportAction::FastForward => "fast_forward",
        }
    }
}

/// What happened to a transport intent.
///
/// Informational only; none of these are errors to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransportOutcome {
    /// The controller accepted the call.
    Sent { action: TransportAction },
    /// The controller does not advertise a capability that could serve the intent.
    Unsupported,
    /// No session is selected.
    NoController,
    /// The controller rejected the call (typically a stale handle).
    Failed { action: TransportAction },
}

impl TransportOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TransportOutcome::Sent { .. })
    }
}

/// Pause if playing, otherwise play.
pub fn toggle_play_pause(controller: &dyn MediaController) -> TransportOutcome {
    let state = controller.playback_state();
    let action = match map_activity(state.as_ref()) {
        PlaybackActivity::Playing => TransportAction::Pause,
        PlaybackActivity::Paused | PlaybackActivity::Stopped => TransportAction::Play,
    };
    issue(controller, action)
}

/// Move the position by `delta_ms`.
///
/// Absolute seek when supported, clamped at zero. Otherwise falls back to a
/// coarse rewind or fast-forward in the direction of `delta_ms`.
pub fn seek_by(controller: &dyn MediaController, delta_ms: i64) -> TransportOutcome {
    let Some(state) = controller.playback_state() else {
        return TransportOutcome::Unsupported;
    };

    let action = if state.supports(Capabilities::SEEK_TO) {
        TransportAction::SeekTo(state.position_ms.saturating_add(delta_ms).max(0))
    } else if delta_ms < 0 && state.supports(Capabilities::REWIND) {
        TransportAction::Rewind
    } else if delta_ms > 0 && state.supports(Capabilities::FAST_FORWARD) {
        TransportAction::FastForward
    } else {
        tracing::debug!(delta_ms, actions = ?state.actions, "seek_by unsupported");
        return TransportOutcome::Unsupported;
    };
    issue(controller, action)
}

/// Seek to an absolute position. No-op unless absolute seeking is advertised.
pub fn seek_to(controller: &dyn MediaController, position_ms: i64) -> TransportOutcome {
    let supported = controller
        .playback_state()
        .is_some_and(|s| s.supports(Capabilities::SEEK_TO));
    if !supported {
        tracing::debug!(position_ms, "seek_to unsupported");
        return TransportOutcome::Unsupported;
    }
    issue(controller, TransportAction::SeekTo(position_ms))
}

/// Issue one call. A failure is logged and reported, never retried.
fn issue(controller: &dyn MediaController, action: TransportAction) -> TransportOutcome {
    let result = match action {
        TransportAction::Play => controller.play(),
        TransportAction::Pause => controller.pause(),
        TransportAction::SeekTo(position_ms) => controller.seek_to(position_ms),
        TransportAction::Rewind => controller.rewind(),
        TransportAction::FastForward => controller.fast_forward(),
    };

    match result {
        Ok(()) => {
            tracing::debug!(action = action.name(), "transport command sent");
            TransportOutcome::Sent { action }
        }
        Err(e) => {
            tracing::debug!(action = action.name(), error = %e, "transport command failed");
            TransportOutcome::Failed { action }
        }
    }
}
