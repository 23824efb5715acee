//! Error types for session handling.

use thiserror::Error;

/// Errors raised by a controller handle.
///
/// None of these escape the core: the registry turns them into "no session"
/// and the transport commander logs and swallows them.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session behind the handle was destroyed.
    #[error("media session is gone")]
    SessionGone,

    /// Registering the change callback failed.
    #[error("failed to subscribe to controller: {0}")]
    SubscribeFailed(String),

    /// A transport command was rejected by the controller.
    #[error("controller rejected {command}: {reason}")]
    CommandFailed {
        command: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
