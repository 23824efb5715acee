//! Window poller - background thread that samples window state.

use crate::provider::WindowSignalProvider;
use crate::state::WindowSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default polling interval for window changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Window observation pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowChangedEvent {
    pub window: Option<WindowSnapshot>,
    pub foreground_package: Option<String>,
}

/// Callback type for window change events.
pub type WindowCallback = Arc<dyn Fn(WindowChangedEvent) + Send + Sync + 'static>;

/// Background poller turning a pull-based provider into change events.
pub struct WindowPoller {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for WindowPoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl WindowPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling with the given provider and callback.
    pub fn start<P>(&mut self, provider: Arc<P>, callback: WindowCallback)
    where
        P: WindowSignalProvider + ?Sized + 'static,
    {
        self.start_with_interval(provider, callback, DEFAULT_POLL_INTERVAL);
    }

    /// Start polling with a custom interval.
    pub fn start_with_interval<P>(
        &mut self,
        provider: Arc<P>,
        callback: WindowCallback,
        interval: Duration,
    ) where
        P: WindowSignalProvider + ?Sized + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("WindowPoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("WindowPoller started with interval {:?}", interval);

            let mut last_event: Option<WindowChangedEvent> = None;

            while running.load(Ordering::SeqCst) {
                let event = WindowChangedEvent {
                    window: provider.get_window_snapshot(),
                    foreground_package: provider.get_foreground_package(),
                };

                if last_event.as_ref() != Some(&event) {
                    tracing::debug!(
                        window = ?event.window,
                        foreground = ?event.foreground_package,
                        "window changed"
                    );
                    callback(event.clone());
                    last_event = Some(event);
                }

                // Woken early by `stop`.
                std::thread::park_timeout(interval);
            }

            tracing::info!("WindowPoller stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the poller and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for WindowPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
