//! Media session tracking for AudioFocus.
//!
//! Owns the live controller for each target app, classifies what it plays,
//! and publishes the one [`PlaybackSnapshot`](audiofocus_context::PlaybackSnapshot)
//! the overlay should follow.
//!
//! # Flow
//!
//! ```text
//! session event ──► SessionRegistry ──subscribe──► MediaController
//!                        │    ▲                         │
//!                        │    └──── ControllerEvent ────┘
//!                        ▼
//!               ContentClassifier (TTL cache)
//!                        │
//!                        ▼
//!              select_current() ──► SnapshotSink (on change only)
//! ```

mod cache;
mod classifier;
mod clock;
mod controller;
mod error;
mod progress;
mod registry;
mod scripted;

pub use cache::ExpiringCache;
pub use classifier::{ContentClassifier, CONTENT_CACHE_TTL, DEFAULT_CACHE_KEY};
pub use clock::{Clock, ClockRef, ManualClock, SystemClock};
pub use controller::{
    map_activity, new_callback, Capabilities, ControllerCallback, ControllerEvent,
    ControllerHandle, MediaController, MediaMetadata, NativePlaybackState, PlaybackStateCode,
    Subscription, PRESENTATION_DISPLAY_TYPE_VIDEO,
};
pub use error::{Result, SessionError};
pub use progress::PlaybackProgress;
pub use registry::{select_current, SessionRegistry, SnapshotSink};
pub use scripted::{Journal, ScriptedController, TransportCall};
