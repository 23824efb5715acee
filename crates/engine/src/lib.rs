//! Overlay decision engine for AudioFocus.
//!
//! # Architecture
//!
//! ```text
//!  WindowPoller ─┐
//!  SessionRegistry ──► SignalBus ──► DecisionEngine ──► watch / EventBus
//!  OverrideGate ─┘                  (debounce, dedupe)
//!
//!  presentation layer ──► RegistryTransport ──► selected controller
//! ```
//!
//! [`OverlayService`] wires all of it from an [`OverlayConfig`].

mod config;
mod engine;
mod gate;
mod service;

pub use config::{
    default_config_path, ConfigError, OverlayConfig, Result, CONFIG_FILE_NAME, DEFAULT_DEBOUNCE,
    MAX_CONTENT_CACHE_TTL,
};
pub use engine::{DecisionEngine, EngineHandle, EngineSettings};
pub use gate::OverrideGate;
pub use service::OverlayService;
