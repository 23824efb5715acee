//! Provider traits for window state detection.
//!
//! The OS-facing side (accessibility tree walking, usage-stats queries) lives
//! outside this workspace. These traits are the seam it plugs into, keeping
//! the decision logic pure and testable.

use crate::state::WindowSnapshot;

/// Provider for the coarse window state of the target apps.
pub trait WindowStateProvider: Send + Sync {
    /// The target app window currently relevant, if any is visible.
    fn get_window_snapshot(&self) -> Option<WindowSnapshot>;
}

/// Provider for the package currently in front of the user.
pub trait ForegroundAppProvider: Send + Sync {
    fn get_foreground_package(&self) -> Option<String>;
}

/// Combined provider polled by [`crate::WindowPoller`].
pub trait WindowSignalProvider: Send + Sync {
    fn get_window_snapshot(&self) -> Option<WindowSnapshot>;

    /// `None` when the platform offers no foreground signal.
    fn get_foreground_package(&self) -> Option<String>;
}

impl<T> WindowSignalProvider for T
where
    T: WindowStateProvider + ForegroundAppProvider,
{
    fn get_window_snapshot(&self) -> Option<WindowSnapshot> {
        WindowStateProvider::get_window_snapshot(self)
    }

    fn get_foreground_package(&self) -> Option<String> {
        ForegroundAppProvider::get_foreground_package(self)
    }
}

/// Null implementation for testing or hosts without window access.
pub struct NullProvider;

impl WindowStateProvider for NullProvider {
    fn get_window_snapshot(&self) -> Option<WindowSnapshot> {
        None
    }
}

impl ForegroundAppProvider for NullProvider {
    fn get_foreground_package(&self) -> Option<String> {
        None
    }
}
