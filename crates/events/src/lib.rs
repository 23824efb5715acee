//! Shared event contracts between the overlay core and its presentation layer.
//!
//! This crate defines the DTOs for events the core emits. Using shared types
//! prevents runtime deserialization errors from mismatched field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{
    emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus,
    TracingEventBus,
};

use audiofocus_context::{OverlayCommand, PlaybackSnapshot};
use serde::{Deserialize, Serialize};

/// Event emitted when the engine settles on a new overlay command.
///
/// Producers: decision engine
/// Consumers: presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayCommandEvent {
    pub command: OverlayCommand,
    /// Command this one replaces.
    pub previous: OverlayCommand,
    /// Timestamp in milliseconds since epoch.
    pub ts_ms: i64,
}

impl OverlayCommandEvent {
    pub fn new(command: OverlayCommand, previous: OverlayCommand) -> Self {
        Self {
            command,
            previous,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Event emitted when the selected playback snapshot changes.
///
/// Producers: session registry
/// Consumers: presentation layer (track metadata, position ticker)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackChangedEvent {
    #[serde(default)]
    pub snapshot: Option<PlaybackSnapshot>,
    #[serde(default)]
    pub ts_ms: i64,
}

impl PlaybackChangedEvent {
    pub fn new(snapshot: Option<PlaybackSnapshot>) -> Self {
        Self {
            snapshot,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Event emitted when the user toggles the manual pause.
///
/// Producers: override gate
/// Consumers: presentation layer, foreground notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualPauseChangedEvent {
    pub paused: bool,
    #[serde(default)]
    pub ts_ms: i64,
}

impl ManualPauseChangedEvent {
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Overlay command settled.
    pub const OVERLAY_COMMAND: &str = "overlay:command";
    /// Selected playback snapshot changed.
    pub const PLAYBACK_CHANGED: &str = "playback:changed";
    /// Manual pause toggled.
    pub const MANUAL_PAUSE: &str = "overlay:manual_pause";
}
