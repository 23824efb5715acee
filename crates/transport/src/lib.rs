//! Transport commands for AudioFocus.
//!
//! Turns play/pause and seek intents into controller calls the selected
//! session actually advertises. Unsupported intents degrade to no-ops and
//! rejected calls are logged, so nothing here returns an error.
//!
//! # Example
//!
//! ```
//! use audiofocus_session::{Capabilities, NativePlaybackState, PlaybackStateCode, ScriptedController, TransportCall};
//! use audiofocus_transport::seek_by;
//!
//! let controller = ScriptedController::new("music").with_state(NativePlaybackState::new(
//!     PlaybackStateCode::Playing,
//!     4_000,
//!     Capabilities::REWIND,
//! ));
//! seek_by(&controller, -10_000);
//! assert_eq!(controller.calls(), vec![TransportCall::Rewind]);
//! ```

mod commander;
mod control;

pub use commander::{seek_by, seek_to, toggle_play_pause, TransportAction, TransportOutcome};
pub use control::{NullTransport, RegistryTransport, TransportControl, TransportControlRef};
