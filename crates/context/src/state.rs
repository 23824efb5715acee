//! Observed state of the target apps.
//!
//! Every type here is a plain value: producers build a fresh snapshot on each
//! observation and the engine only ever compares them by value.

use serde::{Deserialize, Serialize};

/// One of the two applications the overlay is drawn over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetApp {
    /// Video-first app. Sessions are always visual while playing.
    #[serde(rename = "youtube")]
    YouTube,
    /// Music-first app. Serves audio-only and video tracks under one session type.
    #[serde(rename = "youtube_music")]
    YouTubeMusic,
}

impl TargetApp {
    /// Static selection priority, highest first.
    ///
    /// When both apps report a playing session the earlier entry wins. This is
    /// a fixed product order, not "most recently updated".
    pub const PRIORITY: [TargetApp; 2] = [TargetApp::YouTube, TargetApp::YouTubeMusic];

    pub fn package_name(&self) -> &'static str {
        match self {
            TargetApp::YouTube => "com.google.android.youtube",
            TargetApp::YouTubeMusic => "com.google.android.apps.youtube.music",
        }
    }

    pub fn from_package(package: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|app| app.package_name() == package)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TargetApp::YouTube => "YouTube",
            TargetApp::YouTubeMusic => "YouTube Music",
        }
    }
}

impl std::fmt::Display for TargetApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Coarse visibility/shape of a target app's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    Fullscreen,
    Minimized,
    PictureInPicture,
    NotVisible,
    #[default]
    Unknown,
}

impl WindowMode {
    pub const ALL: [WindowMode; 5] = [
        WindowMode::Fullscreen,
        WindowMode::Minimized,
        WindowMode::PictureInPicture,
        WindowMode::NotVisible,
        WindowMode::Unknown,
    ];

    /// Whether any part of the app's video surface can be on screen.
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            WindowMode::Fullscreen | WindowMode::Minimized | WindowMode::PictureInPicture
        )
    }
}

/// Playing/paused/stopped classification of a media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackActivity {
    #[default]
    Stopped,
    Paused,
    Playing,
}

impl PlaybackActivity {
    pub const ALL: [PlaybackActivity; 3] = [
        PlaybackActivity::Stopped,
        PlaybackActivity::Paused,
        PlaybackActivity::Playing,
    ];
}

/// Whether a session renders pictures or only sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Unknown,
    AudioOnly,
    Video,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Unknown, ContentType::AudioOnly, ContentType::Video];
}

/// Latest window observation for one app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub app: TargetApp,
    pub mode: WindowMode,
}

impl WindowSnapshot {
    pub fn new(app: TargetApp, mode: WindowMode) -> Self {
        Self { app, mode }
    }
}

/// Latest playback observation for the currently selected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub app: TargetApp,
    pub activity: PlaybackActivity,
    pub content_type: ContentType,
}

impl PlaybackSnapshot {
    pub fn new(app: TargetApp, activity: PlaybackActivity, content_type: ContentType) -> Self {
        Self {
            app,
            activity,
            content_type,
        }
    }

    /// Playing and showing pictures.
    pub fn is_video_playing(&self) -> bool {
        self.activity == PlaybackActivity::Playing && self.content_type == ContentType::Video
    }
}

/// How much of the screen the overlay covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    Full,
    Partial,
}

/// The only output of the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "mode", rename_all = "snake_case")]
pub enum OverlayCommand {
    #[default]
    Hide,
    Show(OverlayMode),
}

impl OverlayCommand {
    pub fn is_shown(&self) -> bool {
        matches!(self, OverlayCommand::Show(_))
    }
}

impl std::fmt::Display for OverlayCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayCommand::Hide => write!(f, "hide"),
            OverlayCommand::Show(OverlayMode::Full) => write!(f, "show(full)"),
            OverlayCommand::Show(OverlayMode::Partial) => write!(f, "show(partial)"),
        }
    }
}

/// Last-known value of every engine input.
///
/// `None` means "nothing observed" for that source, which always biases the
/// decision towards hiding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayInputs {
    pub window: Option<WindowSnapshot>,
    pub playback: Option<PlaybackSnapshot>,
    pub manual_pause: bool,
    /// Package currently in front, when a usage-stats source is available.
    #[serde(default)]
    pub foreground_package: Option<String>,
}

impl OverlayInputs {
    pub fn new(
        window: Option<WindowSnapshot>,
        playback: Option<PlaybackSnapshot>,
        manual_pause: bool,
    ) -> Self {
        Self {
            window,
            playback,
            manual_pause,
            foreground_package: None,
        }
    }

    pub fn with_foreground(mut self, package: impl Into<String>) -> Self {
        self.foreground_package = Some(package.into());
        self
    }
}
