//! Overlay decision logic.
//!
//! Pure domain logic - no I/O, no timers, no platform dependencies.

use crate::state::{
    OverlayCommand, OverlayInputs, OverlayMode, TargetApp, WindowMode, WindowSnapshot,
};

/// Per-app table mapping a window mode to an overlay command.
///
/// Only consulted once playback is known to be visible video. The music app's
/// minimized and PiP windows keep a small control strip on screen, so a
/// partial overlay covers them; the video app has no such strip.
pub fn policy_for(app: TargetApp, mode: WindowMode) -> OverlayCommand {
    match app {
        TargetApp::YouTube => match mode {
            WindowMode::Fullscreen | WindowMode::Minimized | WindowMode::PictureInPicture => {
                OverlayCommand::Show(OverlayMode::Full)
            }
            WindowMode::NotVisible | WindowMode::Unknown => OverlayCommand::Hide,
        },
        TargetApp::YouTubeMusic => match mode {
            WindowMode::Fullscreen => OverlayCommand::Show(OverlayMode::Full),
            WindowMode::Minimized | WindowMode::PictureInPicture => {
                OverlayCommand::Show(OverlayMode::Partial)
            }
            WindowMode::NotVisible | WindowMode::Unknown => OverlayCommand::Hide,
        },
    }
}

/// Window mode after accounting for another app being in front.
///
/// A fullscreen or minimized window that is not the foreground package is
/// behind something else. PiP floats above other apps and is kept. An
/// unknown foreground leaves the mode untouched.
pub fn effective_window_mode(window: &WindowSnapshot, foreground_package: Option<&str>) -> WindowMode {
    match foreground_package {
        Some(package) if package != window.app.package_name() => match window.mode {
            WindowMode::Fullscreen | WindowMode::Minimized => {
                tracing::trace!(
                    app = %window.app,
                    foreground = package,
                    "demoting window behind foreground app"
                );
                WindowMode::NotVisible
            }
            other => other,
        },
        _ => window.mode,
    }
}

/// Resolve the overlay command from the latest inputs.
///
/// Priority:
/// 1. Manual pause hides
/// 2. Missing window or playback hides
/// 3. Window and playback must refer to the same app
/// 4. Playback must be playing video
/// 5. Per-app policy table
///
/// Total over its inputs: every gap resolves to `Hide`.
pub fn decide(inputs: &OverlayInputs) -> OverlayCommand {
    if inputs.manual_pause {
        return OverlayCommand::Hide;
    }

    let (Some(window), Some(playback)) = (inputs.window.as_ref(), inputs.playback.as_ref()) else {
        return OverlayCommand::Hide;
    };

    if window.app != playback.app {
        return OverlayCommand::Hide;
    }

    if !playback.is_video_playing() {
        return OverlayCommand::Hide;
    }

    let mode = effective_window_mode(window, inputs.foreground_package.as_deref());
    policy_for(window.app, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ContentType, PlaybackActivity, PlaybackSnapshot};

    fn playing_video(app: TargetApp) -> PlaybackSnapshot {
        PlaybackSnapshot::new(app, PlaybackActivity::Playing, ContentType::Video)
    }

    fn inputs(app: TargetApp, mode: WindowMode) -> OverlayInputs {
        OverlayInputs::new(
            Some(WindowSnapshot::new(app, mode)),
            Some(playing_video(app)),
            false,
        )
    }

    #[test]
    fn test_video_app_fullscreen_shows_full() {
        let command = decide(&inputs(TargetApp::YouTube, WindowMode::Fullscreen));
        assert_eq!(command, OverlayCommand::Show(OverlayMode::Full));
    }

    #[test]
    fn test_video_app_table() {
        for mode in [
            WindowMode::Fullscreen,
            WindowMode::Minimized,
            WindowMode::PictureInPicture,
        ] {
            assert_eq!(
                decide(&inputs(TargetApp::YouTube, mode)),
                OverlayCommand::Show(OverlayMode::Full),
                "mode {:?}",
                mode
            );
        }
        assert_eq!(
            decide(&inputs(TargetApp::YouTube, WindowMode::Unknown)),
            OverlayCommand::Hide
        );
        assert_eq!(
            decide(&inputs(TargetApp::YouTube, WindowMode::NotVisible)),
            OverlayCommand::Hide
        );
    }

    #[test]
    fn test_music_app_table() {
        assert_eq!(
            decide(&inputs(TargetApp::YouTubeMusic, WindowMode::Fullscreen)),
            OverlayCommand::Show(OverlayMode::Full)
        );
        assert_eq!(
            decide(&inputs(TargetApp::YouTubeMusic, WindowMode::Minimized)),
            OverlayCommand::Show(OverlayMode::Partial)
        );
        assert_eq!(
            decide(&inputs(TargetApp::YouTubeMusic, WindowMode::PictureInPicture)),
            OverlayCommand::Show(OverlayMode::Partial)
        );
        assert_eq!(
            decide(&inputs(TargetApp::YouTubeMusic, WindowMode::Unknown)),
            OverlayCommand::Hide
        );
    }

    #[test]
    fn test_manual_pause_always_hides() {
        for app in TargetApp::PRIORITY {
            for mode in WindowMode::ALL {
                let mut input = inputs(app, mode);
                input.manual_pause = true;
                assert_eq!(decide(&input), OverlayCommand::Hide);
            }
        }
    }

    #[test]
    fn test_music_minimized_with_manual_pause_hides() {
        let mut input = inputs(TargetApp::YouTubeMusic, WindowMode::Minimized);
        assert_eq!(decide(&input), OverlayCommand::Show(OverlayMode::Partial));
        input.manual_pause = true;
        assert_eq!(decide(&input), OverlayCommand::Hide);
    }

    #[test]
    fn test_missing_inputs_hide() {
        let window = Some(WindowSnapshot::new(TargetApp::YouTube, WindowMode::Fullscreen));
        let playback = Some(playing_video(TargetApp::YouTube));

        assert_eq!(decide(&OverlayInputs::new(None, playback, false)), OverlayCommand::Hide);
        assert_eq!(decide(&OverlayInputs::new(window, None, false)), OverlayCommand::Hide);
        assert_eq!(decide(&OverlayInputs::default()), OverlayCommand::Hide);
    }

    #[test]
    fn test_app_mismatch_hides() {
        for mode in WindowMode::ALL {
            let input = OverlayInputs::new(
                Some(WindowSnapshot::new(TargetApp::YouTube, mode)),
                Some(playing_video(TargetApp::YouTubeMusic)),
                false,
            );
            assert_eq!(decide(&input), OverlayCommand::Hide);
        }
    }

    #[test]
    fn test_only_playing_video_at_visible_mode_shows() {
        for app in TargetApp::PRIORITY {
            for mode in WindowMode::ALL {
                for activity in PlaybackActivity::ALL {
                    for content_type in ContentType::ALL {
                        let input = OverlayInputs::new(
                            Some(WindowSnapshot::new(app, mode)),
                            Some(PlaybackSnapshot::new(app, activity, content_type)),
                            false,
                        );
                        let shows = activity == PlaybackActivity::Playing
                            && content_type == ContentType::Video
                            && mode.is_visible();
                        assert_eq!(
                            decide(&input).is_shown(),
                            shows,
                            "{:?} {:?} {:?} {:?}",
                            app,
                            mode,
                            activity,
                            content_type
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_foreground_demotes_fullscreen() {
        let input = inputs(TargetApp::YouTube, WindowMode::Fullscreen)
            .with_foreground("com.android.launcher3");
        assert_eq!(decide(&input), OverlayCommand::Hide);
    }

    #[test]
    fn test_foreground_keeps_pip() {
        let input = inputs(TargetApp::YouTubeMusic, WindowMode::PictureInPicture)
            .with_foreground("com.android.launcher3");
        assert_eq!(decide(&input), OverlayCommand::Show(OverlayMode::Partial));
    }

    #[test]
    fn test_foreground_matching_app_is_noop() {
        let input = inputs(TargetApp::YouTube, WindowMode::Minimized)
            .with_foreground(TargetApp::YouTube.package_name());
        assert_eq!(decide(&input), OverlayCommand::Show(OverlayMode::Full));
    }
}
