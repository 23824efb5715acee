//! Engine configuration.
//!
//! Read once at startup from `<config_dir>/audiofocus/config.json`. Every
//! field has a default, so a missing file or a partial file is fine.

use audiofocus_context::TargetApp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quiescence interval before a recomputed command is emitted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Upper bound for `content_cache_ttl_ms`.
pub const MAX_CONTENT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error loading or validating [`OverlayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Serialize for ConfigError {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub debounce_ms: u64,
    pub content_cache_ttl_ms: u64,
    pub window_poll_interval_ms: u64,
    /// Apps the overlay reacts to. Signals from other apps count as absent.
    pub enabled_apps: BTreeSet<TargetApp>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            content_cache_ttl_ms: audiofocus_session::CONTENT_CACHE_TTL.as_millis() as u64,
            window_poll_interval_ms: audiofocus_context::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            enabled_apps: TargetApp::PRIORITY.into_iter().collect(),
        }
    }
}

impl OverlayConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn content_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.content_cache_ttl_ms)
    }

    pub fn window_poll_interval(&self) -> Duration {
        Duration::from_millis(self.window_poll_interval_ms)
    }

    pub fn is_enabled(&self, app: TargetApp) -> bool {
        self.enabled_apps.contains(&app)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be > 0".to_string()));
        }
        if self.content_cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "content_cache_ttl_ms must be > 0".to_string(),
            ));
        }
        if self.content_cache_ttl() > MAX_CONTENT_CACHE_TTL {
            return Err(ConfigError::Invalid(format!(
                "content_cache_ttl_ms must be <= {}",
                MAX_CONTENT_CACHE_TTL.as_millis()
            )));
        }
        if self.window_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "window_poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.enabled_apps.is_empty() {
            return Err(ConfigError::Invalid(
                "enabled_apps must name at least one app".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}

/// Platform-specific location of the config file.
///
/// - macOS: ~/Library/Application Support/audiofocus/config.json
/// - Linux: ~/.config/audiofocus/config.json
/// - Windows: %APPDATA%/audiofocus/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("audiofocus").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.content_cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.window_poll_interval(), Duration::from_millis(500));
        assert!(config.is_enabled(TargetApp::YouTube));
        assert!(config.is_enabled(TargetApp::YouTubeMusic));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = OverlayConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"debounce_ms": 350, "enabled_apps": ["youtube_music"]}"#).unwrap();

        let config = OverlayConfig::load_from(&path).unwrap();
        assert_eq!(config.debounce_ms, 350);
        assert_eq!(config.content_cache_ttl_ms, 30_000);
        assert!(!config.is_enabled(TargetApp::YouTube));
        assert!(config.is_enabled(TargetApp::YouTubeMusic));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            OverlayConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"window_poll_interval_ms": 0}"#).unwrap();
        assert!(matches!(
            OverlayConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        let no_apps = OverlayConfig {
            enabled_apps: BTreeSet::new(),
            ..Default::default()
        };
        assert!(no_apps.validate().is_err());

        let no_debounce = OverlayConfig {
            debounce_ms: 0,
            ..Default::default()
        };
        assert!(no_debounce.validate().is_err());
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        let at_limit = OverlayConfig {
            content_cache_ttl_ms: MAX_CONTENT_CACHE_TTL.as_millis() as u64,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let huge = OverlayConfig {
            content_cache_ttl_ms: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = ConfigError::Invalid("debounce_ms must be > 0".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#""invalid configuration: debounce_ms must be > 0""#);
    }
}
