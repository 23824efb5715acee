//! Scenario replay against a live [`OverlayService`].

use crate::scenario::{ScenarioEvent, ScenarioStep, TransportIntent};
use anyhow::Result;
use audiofocus_context::{TargetApp, WindowSnapshot};
use audiofocus_engine::OverlayService;
use audiofocus_session::{ControllerEvent, ControllerHandle, ScriptedController};
use audiofocus_transport::TransportControl;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct LiveSession {
    identity: String,
    controller: Arc<ScriptedController>,
}

/// Drives the service through scenario steps, owning the scripted controllers.
pub struct Replayer<'a> {
    service: &'a OverlayService,
    sessions: HashMap<TargetApp, LiveSession>,
}

impl<'a> Replayer<'a> {
    pub fn new(service: &'a OverlayService) -> Self {
        Self {
            service,
            sessions: HashMap::new(),
        }
    }

    /// Apply every step at its offset from now, then wait `settle` for the
    /// engine to flush.
    pub async fn run(&mut self, steps: &[ScenarioStep], settle: Duration) -> Result<()> {
        let start = Instant::now();
        for step in steps {
            tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
            self.apply(step)?;
        }
        tokio::time::sleep(settle).await;
        Ok(())
    }

    pub fn apply(&mut self, step: &ScenarioStep) -> Result<()> {
        tracing::debug!(at_ms = step.at_ms, event = ?step.event, "replay step");

        match &step.event {
            ScenarioEvent::Session {
                app,
                session,
                state,
                metadata,
            } => {
                let state = state.as_ref().map(|s| s.to_native()).transpose()?;
                let controller = match self.sessions.get(app) {
                    Some(live) if live.identity == *session => Arc::clone(&live.controller),
                    _ => Arc::new(ScriptedController::new(format!("{}:{}", app, session))),
                };
                controller.set_playback_state(state);
                controller.set_metadata(metadata.clone());

                self.sessions.insert(
                    *app,
                    LiveSession {
                        identity: session.clone(),
                        controller: Arc::clone(&controller),
                    },
                );
                self.service.registry().on_session_event(
                    *app,
                    session.as_str(),
                    Some(controller as ControllerHandle),
                );
            }
            ScenarioEvent::State { app, state } => {
                let state = state.to_native()?;
                if let Some(live) = self.live(*app) {
                    live.controller.set_playback_state(Some(state));
                    live.controller.fire(ControllerEvent::PlaybackStateChanged);
                }
            }
            ScenarioEvent::Metadata { app, metadata } => {
                if let Some(live) = self.live(*app) {
                    live.controller.set_metadata(Some(metadata.clone()));
                    live.controller.fire(ControllerEvent::MetadataChanged);
                }
            }
            ScenarioEvent::SessionGone { app } => {
                if let Some(live) = self.sessions.remove(app) {
                    live.controller.fire(ControllerEvent::SessionDestroyed);
                } else {
                    tracing::warn!(app = %app, "no live session to destroy");
                }
            }
            ScenarioEvent::SessionRemoved { app, session } => {
                if self
                    .sessions
                    .get(app)
                    .is_some_and(|live| live.identity == *session)
                {
                    self.sessions.remove(app);
                }
                self.service.registry().on_session_removed(*app, session);
            }
            ScenarioEvent::Window { app, mode } => {
                self.service
                    .report_window(Some(WindowSnapshot::new(*app, *mode)));
            }
            ScenarioEvent::NoWindow => self.service.report_window(None),
            ScenarioEvent::Foreground { package } => {
                self.service.report_foreground(package.clone());
            }
            ScenarioEvent::Pause { paused } => self.service.gate().set(*paused),
            ScenarioEvent::TogglePause => {
                self.service.gate().toggle();
            }
            ScenarioEvent::Transport { intent } => {
                let transport = self.service.transport();
                let outcome = match intent {
                    TransportIntent::Toggle => transport.toggle_play_pause(),
                    TransportIntent::SeekBy(delta_ms) => transport.seek_by(*delta_ms),
                    TransportIntent::SeekTo(position_ms) => transport.seek_to(*position_ms),
                };
                tracing::info!(?intent, ?outcome, "transport");
            }
        }
        Ok(())
    }

    fn live(&self, app: TargetApp) -> Option<&LiveSession> {
        let live = self.sessions.get(&app);
        if live.is_none() {
            tracing::warn!(app = %app, "no live session for step");
        }
        live
    }
}
