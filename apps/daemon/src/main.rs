//! Headless host for the overlay core.
//!
//! Replays a recorded or hand-written scenario against the full stack and
//! prints every overlay command the engine settles on.

mod replay;
mod scenario;

use anyhow::{Context, Result};
use audiofocus_engine::{OverlayConfig, OverlayService};
use audiofocus_events::{
    event_names, EventBus, InMemoryEventBus, OverlayCommandEvent, TracingEventBus,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "audiofocus-daemon")]
#[command(about = "Replay window and media session scenarios through the overlay engine")]
struct Args {
    /// Scenario file (JSON lines)
    scenario: PathBuf,

    /// Config file; defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the command log as one JSON document instead of JSON lines
    #[arg(long)]
    summary: bool,
}

/// Records events for the final report and logs them as they happen.
struct ReplayEventBus {
    recorded: InMemoryEventBus,
    log: TracingEventBus,
}

impl EventBus for ReplayEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.log.emit(topic, payload.clone());
        self.recorded.emit(topic, payload);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,audiofocus=debug")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => OverlayConfig::load_from(path),
        None => OverlayConfig::load(),
    }
    .context("failed to load config")?;

    let steps = scenario::load(&args.scenario)?;
    tracing::info!(
        scenario = %args.scenario.display(),
        steps = steps.len(),
        "starting replay"
    );

    let events = Arc::new(ReplayEventBus {
        recorded: InMemoryEventBus::new(),
        log: TracingEventBus,
    });
    let service = OverlayService::start(config, events.clone())
        .context("failed to start overlay service")?;

    let settle = service.config().debounce() + Duration::from_millis(100);
    replay::Replayer::new(&service)
        .run(&steps, settle)
        .await
        .context("replay failed")?;

    let status = service.engine().status();
    service.shutdown();

    let commands: Vec<OverlayCommandEvent> =
        events.recorded.payloads_for(event_names::OVERLAY_COMMAND);
    if args.summary {
        let report = serde_json::json!({
            "commands": commands.iter().map(|e| e.command).collect::<Vec<_>>(),
            "status": status,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for event in &commands {
            println!("{}", serde_json::to_string(event)?);
        }
    }

    tracing::info!(?status, "replay finished");
    Ok(())
}
