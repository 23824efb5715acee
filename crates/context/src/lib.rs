//! Overlay context for AudioFocus.
//!
//! This crate holds the domain model and the pure overlay decision. It tracks:
//! - Which target app window is visible, and in what shape
//! - Which media session is selected, and whether it is playing video
//! - Whether the user has manually paused the overlay
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  state.rs    - Snapshots, OverlayCommand, OverlayInputs     │
//! │  policy.rs   - Per-app tables and decide() (pure)           │
//! │  provider.rs - Traits for window state detection            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  poller.rs - Background polling and change emission         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use audiofocus_context::*;
//!
//! let inputs = OverlayInputs::new(
//!     Some(WindowSnapshot::new(TargetApp::YouTubeMusic, WindowMode::Minimized)),
//!     Some(PlaybackSnapshot::new(
//!         TargetApp::YouTubeMusic,
//!         PlaybackActivity::Playing,
//!         ContentType::Video,
//!     )),
//!     false,
//! );
//! assert_eq!(decide(&inputs), OverlayCommand::Show(OverlayMode::Partial));
//! ```

mod policy;
mod poller;
mod provider;
mod state;

pub use policy::{decide, effective_window_mode, policy_for};
pub use poller::{WindowCallback, WindowChangedEvent, WindowPoller, DEFAULT_POLL_INTERVAL};
pub use provider::{ForegroundAppProvider, NullProvider, WindowSignalProvider, WindowStateProvider};
pub use state::{
    ContentType, OverlayCommand, OverlayInputs, OverlayMode, PlaybackActivity, PlaybackSnapshot,
    TargetApp, WindowMode, WindowSnapshot,
};
