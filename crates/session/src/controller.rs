//! Controller handle contract.
//!
//! A controller is the OS object that exposes one media session's playback
//! state and metadata and accepts transport commands. The OS side implements
//! [`MediaController`]; everything in this workspace only sees the trait.

use crate::error::Result;
use audiofocus_context::PlaybackActivity;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

bitflags! {
    /// Transport actions a controller advertises.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u64 {
        const STOP = 1 << 0;
        const PAUSE = 1 << 1;
        const PLAY = 1 << 2;
        const REWIND = 1 << 3;
        const SKIP_TO_PREVIOUS = 1 << 4;
        const SKIP_TO_NEXT = 1 << 5;
        const FAST_FORWARD = 1 << 6;
        /// Absolute seeking to a position.
        const SEEK_TO = 1 << 8;
        const PLAY_PAUSE = 1 << 9;
    }
}

/// Native playback state code reported by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStateCode {
    #[default]
    None,
    Stopped,
    Stopping,
    Paused,
    Playing,
    FastForwarding,
    Rewinding,
    Buffering,
    Error,
    Connecting,
    SkippingToPrevious,
    SkippingToNext,
    SkippingToQueueItem,
    #[serde(other)]
    Unrecognized,
}

impl PlaybackStateCode {
    /// Collapse the native code into the three-way activity.
    pub fn activity(&self) -> PlaybackActivity {
        match self {
            PlaybackStateCode::Playing
            | PlaybackStateCode::Buffering
            | PlaybackStateCode::FastForwarding
            | PlaybackStateCode::Rewinding => PlaybackActivity::Playing,
            PlaybackStateCode::Stopped
            | PlaybackStateCode::Stopping
            | PlaybackStateCode::None
            | PlaybackStateCode::Connecting => PlaybackActivity::Stopped,
            _ => PlaybackActivity::Paused,
        }
    }
}

/// Snapshot of a controller's native playback state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NativePlaybackState {
    pub code: PlaybackStateCode,
    /// Position at `updated_at_ms`.
    pub position_ms: i64,
    /// Playback speed multiplier; 1.0 is normal.
    pub speed: f32,
    /// Controller clock time of the last position update.
    pub updated_at_ms: i64,
    pub actions: Capabilities,
}

impl NativePlaybackState {
    pub fn new(code: PlaybackStateCode, position_ms: i64, actions: Capabilities) -> Self {
        Self {
            code,
            position_ms,
            speed: 1.0,
            updated_at_ms: 0,
            actions,
        }
    }

    pub fn supports(&self, capability: Capabilities) -> bool {
        self.actions.contains(capability)
    }
}

/// Activity for a possibly absent native state. No state means stopped.
pub fn map_activity(state: Option<&NativePlaybackState>) -> PlaybackActivity {
    state
        .map(|s| s.code.activity())
        .unwrap_or(PlaybackActivity::Stopped)
}

/// Track metadata fields the core cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Stable per-track identifier.
    #[serde(default)]
    pub media_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub video_width: Option<i64>,
    #[serde(default)]
    pub video_height: Option<i64>,
    /// Presentation hint; [`PRESENTATION_DISPLAY_TYPE_VIDEO`] marks video.
    #[serde(default)]
    pub presentation_display_type: Option<i64>,
}

/// Presentation display type value that marks visual content.
pub const PRESENTATION_DISPLAY_TYPE_VIDEO: i64 = 1;

/// Change notifications delivered to a subscribed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    PlaybackStateChanged,
    MetadataChanged,
    SessionDestroyed,
}

/// Callback type for controller change events.
pub type ControllerCallback = Arc<dyn Fn(ControllerEvent) + Send + Sync + 'static>;

pub fn new_callback<F>(f: F) -> ControllerCallback
where
    F: Fn(ControllerEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An active callback registration.
///
/// Owned by exactly one holder. The release step (unregistering the callback
/// from the controller) runs exactly once: on [`Subscription::release`], or on
/// drop if it was never released explicitly.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unregister the callback now.
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.release.is_none())
            .finish()
    }
}

/// Handle to one media session.
///
/// Getters are expected to be cheap reads of cached state; they are called
/// from inside the registry on every change notification.
pub trait MediaController: Send + Sync {
    fn playback_state(&self) -> Option<NativePlaybackState>;

    fn metadata(&self) -> Option<MediaMetadata>;

    /// Register `callback` for change notifications.
    ///
    /// Fails when the session vanished between discovery and subscription.
    fn subscribe(&self, callback: ControllerCallback) -> Result<Subscription>;

    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn seek_to(&self, position_ms: i64) -> Result<()>;

    fn rewind(&self) -> Result<()>;

    fn fast_forward(&self) -> Result<()>;
}

/// Type alias for a shared controller handle.
pub type ControllerHandle = Arc<dyn MediaController>;
