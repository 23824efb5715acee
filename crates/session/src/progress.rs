//! Position ticker for the presentation layer.
//!
//! Extrapolates from the last reported position instead of polling the
//! controller every frame. Good enough for a progress bar, not frame-accurate.

use crate::controller::{NativePlaybackState, PlaybackStateCode};
use serde::Serialize;

/// Estimated playback position at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackProgress {
    pub position_ms: i64,
    pub duration_ms: Option<i64>,
    pub playing: bool,
}

impl PlaybackProgress {
    /// Estimate the position at `now_ms` (controller clock).
    ///
    /// Only a `Playing` state advances; buffering holds the last position.
    pub fn estimate(state: &NativePlaybackState, duration_ms: Option<i64>, now_ms: i64) -> Self {
        let playing = state.code == PlaybackStateCode::Playing;

        let mut position_ms = state.position_ms;
        if playing && state.updated_at_ms > 0 {
            let elapsed = now_ms.saturating_sub(state.updated_at_ms).max(0);
            let advanced = (elapsed as f64 * state.speed as f64) as i64;
            position_ms = position_ms.saturating_add(advanced);
        }

        position_ms = position_ms.max(0);
        if let Some(duration) = duration_ms.filter(|d| *d > 0) {
            position_ms = position_ms.min(duration);
        }

        Self {
            position_ms,
            duration_ms,
            playing,
        }
    }

    /// Completed fraction in `[0, 1]`, when the duration is known.
    pub fn fraction(&self) -> Option<f32> {
        let duration = self.duration_ms.filter(|d| *d > 0)?;
        Some((self.position_ms as f32 / duration as f32).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Capabilities;

    fn state(code: PlaybackStateCode, position_ms: i64, updated_at_ms: i64) -> NativePlaybackState {
        NativePlaybackState {
            updated_at_ms,
            ..NativePlaybackState::new(code, position_ms, Capabilities::empty())
        }
    }

    #[test]
    fn test_playing_advances_with_speed() {
        let mut s = state(PlaybackStateCode::Playing, 10_000, 1_000);
        s.speed = 2.0;
        let progress = PlaybackProgress::estimate(&s, Some(60_000), 3_000);
        assert_eq!(progress.position_ms, 14_000);
        assert!(progress.playing);
    }

    #[test]
    fn test_paused_holds_position() {
        let s = state(PlaybackStateCode::Paused, 10_000, 1_000);
        let progress = PlaybackProgress::estimate(&s, None, 50_000);
        assert_eq!(progress.position_ms, 10_000);
        assert_eq!(progress.fraction(), None);
    }

    #[test]
    fn test_clamped_to_duration() {
        let s = state(PlaybackStateCode::Playing, 59_000, 1_000);
        let progress = PlaybackProgress::estimate(&s, Some(60_000), 10_000);
        assert_eq!(progress.position_ms, 60_000);
        assert_eq!(progress.fraction(), Some(1.0));
    }

    #[test]
    fn test_clock_skew_does_not_rewind() {
        let s = state(PlaybackStateCode::Playing, 5_000, 10_000);
        let progress = PlaybackProgress::estimate(&s, Some(60_000), 9_000);
        assert_eq!(progress.position_ms, 5_000);
    }

    #[test]
    fn test_extreme_clock_values_saturate() {
        let s = state(PlaybackStateCode::Playing, i64::MAX - 10, 1);
        let progress = PlaybackProgress::estimate(&s, None, i64::MAX);
        assert_eq!(progress.position_ms, i64::MAX);

        let clamped = PlaybackProgress::estimate(&s, Some(60_000), i64::MAX);
        assert_eq!(clamped.position_ms, 60_000);

        let s = state(PlaybackStateCode::Playing, 5_000, i64::MAX);
        let progress = PlaybackProgress::estimate(&s, None, i64::MIN);
        assert_eq!(progress.position_ms, 5_000);
    }
}
