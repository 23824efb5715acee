//! Example: Poll a scripted window source and print the overlay decision.
//!
//! Run with: cargo run -p audiofocus-context --example poll_window

use audiofocus_context::{
    decide, ContentType, ForegroundAppProvider, OverlayInputs, PlaybackActivity, PlaybackSnapshot,
    TargetApp, WindowChangedEvent, WindowMode, WindowPoller, WindowSnapshot, WindowStateProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cycles the music app through every window mode.
struct CyclingProvider {
    tick: AtomicUsize,
}

impl WindowStateProvider for CyclingProvider {
    fn get_window_snapshot(&self) -> Option<WindowSnapshot> {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let mode = WindowMode::ALL[(tick / 3) % WindowMode::ALL.len()];
        Some(WindowSnapshot::new(TargetApp::YouTubeMusic, mode))
    }
}

impl ForegroundAppProvider for CyclingProvider {
    fn get_foreground_package(&self) -> Option<String> {
        None
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("audiofocus_context=debug")
        .init();

    println!("=== Window Poller Example ===");

    let provider = Arc::new(CyclingProvider {
        tick: AtomicUsize::new(0),
    });
    let playback = PlaybackSnapshot::new(
        TargetApp::YouTubeMusic,
        PlaybackActivity::Playing,
        ContentType::Video,
    );

    let mut poller = WindowPoller::new();
    poller.start_with_interval(
        provider,
        Arc::new(move |event: WindowChangedEvent| {
            let inputs = OverlayInputs::new(event.window, Some(playback), false);
            println!(
                "Window: {:?} | Overlay: {}",
                event.window.map(|w| w.mode),
                decide(&inputs)
            );
        }),
        Duration::from_millis(200),
    );

    std::thread::sleep(Duration::from_secs(4));
    poller.stop();
    println!("\nDone.");
}
