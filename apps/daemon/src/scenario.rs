//! Scenario files: one JSON object per line, each with an `at_ms` offset.
//!
//! ```text
//! {"at_ms": 0, "event": "session", "app": "youtube_music", "session": "m-1", "state": {"code": "playing", "actions": ["play", "pause", "seek_to"]}}
//! {"at_ms": 40, "event": "window", "app": "youtube_music", "mode": "minimized"}
//! {"at_ms": 900, "event": "pause", "paused": true}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use audiofocus_context::{TargetApp, WindowMode};
use audiofocus_session::{Capabilities, MediaMetadata, NativePlaybackState, PlaybackStateCode};
use serde::Deserialize;
use std::path::Path;

/// Playback state as written in a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedState {
    pub code: PlaybackStateCode,
    #[serde(default)]
    pub position_ms: i64,
    /// Capability names, e.g. `"seek_to"` or `"fast_forward"`.
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ScriptedState {
    pub fn to_native(&self) -> Result<NativePlaybackState> {
        let mut actions = Capabilities::empty();
        for name in &self.actions {
            let Some(flag) = Capabilities::from_name(&name.to_ascii_uppercase()) else {
                bail!("unknown capability {:?}", name);
            };
            actions |= flag;
        }
        Ok(NativePlaybackState::new(self.code, self.position_ms, actions))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportIntent {
    Toggle,
    SeekBy(i64),
    SeekTo(i64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// A session appeared or was re-announced for `app`.
    Session {
        app: TargetApp,
        session: String,
        #[serde(default)]
        state: Option<ScriptedState>,
        #[serde(default)]
        metadata: Option<MediaMetadata>,
    },
    /// The live session's playback state changed.
    State { app: TargetApp, state: ScriptedState },
    /// The live session's track metadata changed.
    Metadata { app: TargetApp, metadata: MediaMetadata },
    /// The live session was destroyed by its app.
    SessionGone { app: TargetApp },
    /// The media notification for `session` was removed.
    SessionRemoved { app: TargetApp, session: String },
    Window { app: TargetApp, mode: WindowMode },
    NoWindow,
    Foreground {
        #[serde(default)]
        package: Option<String>,
    },
    Pause { paused: bool },
    TogglePause,
    Transport { intent: TransportIntent },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ScenarioEvent,
}

/// Parse scenario text. Steps must be in non-decreasing `at_ms` order.
pub fn parse(text: &str) -> Result<Vec<ScenarioStep>> {
    let mut steps: Vec<ScenarioStep> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let step: ScenarioStep = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid scenario step", index + 1))?;

        if let Some(previous) = steps.last() {
            if step.at_ms < previous.at_ms {
                bail!(
                    "line {}: at_ms {} goes back in time (previous {})",
                    index + 1,
                    step.at_ms,
                    previous.at_ms
                );
            }
        }
        steps.push(step);
    }

    Ok(steps)
}

pub fn load(path: &Path) -> Result<Vec<ScenarioStep>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse scenario {}", path.display()))
}
