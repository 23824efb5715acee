//! Content classification: audio-only or visible video.

use crate::cache::ExpiringCache;
use crate::clock::{ClockRef, SystemClock};
use crate::controller::{MediaMetadata, PRESENTATION_DISPLAY_TYPE_VIDEO};
use audiofocus_context::{ContentType, PlaybackActivity, TargetApp};
use std::sync::Arc;
use std::time::Duration;

/// How long a music-app classification stays valid.
pub const CONTENT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Cache key for tracks that carry neither an id nor a title.
pub const DEFAULT_CACHE_KEY: &str = "youtube_music_default";

/// Maps a session's app, activity and metadata to a [`ContentType`].
///
/// The video app's sessions are visual whenever they play. The music app
/// serves both kinds under one session type, so its metadata is inspected and
/// the verdict cached per track; state-change bursts for the same track would
/// otherwise repeat the inspection.
pub struct ContentClassifier {
    cache: ExpiringCache<String, ContentType>,
    inspections: u64,
}

impl ContentClassifier {
    pub fn new(ttl: Duration, clock: ClockRef) -> Self {
        Self {
            cache: ExpiringCache::new(ttl, clock),
            inspections: 0,
        }
    }

    pub fn classify(
        &mut self,
        app: TargetApp,
        activity: PlaybackActivity,
        metadata: Option<&MediaMetadata>,
    ) -> ContentType {
        match app {
            TargetApp::YouTube => {
                if activity == PlaybackActivity::Playing {
                    ContentType::Video
                } else {
                    ContentType::Unknown
                }
            }
            TargetApp::YouTubeMusic => self.classify_music(metadata),
        }
    }

    fn classify_music(&mut self, metadata: Option<&MediaMetadata>) -> ContentType {
        let Some(metadata) = metadata else {
            return ContentType::AudioOnly;
        };

        let key = cache_key(metadata);
        let inspections = &mut self.inspections;
        self.cache.get_or_insert_with(key, || {
            *inspections += 1;
            inspect(metadata)
        })
    }

    /// Number of metadata inspections performed (cache misses).
    pub fn inspection_count(&self) -> u64 {
        self.inspections
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(CONTENT_CACHE_TTL, Arc::new(SystemClock::new()))
    }
}

fn cache_key(metadata: &MediaMetadata) -> String {
    metadata
        .media_id
        .as_deref()
        .or(metadata.title.as_deref())
        .unwrap_or(DEFAULT_CACHE_KEY)
        .to_string()
}

fn inspect(metadata: &MediaMetadata) -> ContentType {
    let has_dimensions = matches!(
        (metadata.video_width, metadata.video_height),
        (Some(w), Some(h)) if w > 0 && h > 0
    );
    let marked_video = metadata.presentation_display_type == Some(PRESENTATION_DISPLAY_TYPE_VIDEO);

    if has_dimensions || marked_video {
        ContentType::Video
    } else {
        ContentType::AudioOnly
    }
}
