//! splashtrack - timed phase progress tracker CLI
//!
//! Drives the estimator -> planner -> clock pipeline and renders run
//! progress in the terminal.

mod cli;
mod display;
mod events;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::events::EventHandler;
use clap::Parser;
use splashtrack_config::Config;
use splashtrack_errors::Error;
use splashtrack_tracker::Tracker;
use splashtrack_types::DeviceClass;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("application error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), Error> {
    info!("starting splashtrack v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence: file, environment, CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let renderer = OutputRenderer::new(cli.global.json);
    let (event_sender, event_receiver) = splashtrack_events::channel();
    let handler = tokio::spawn(EventHandler::new(event_receiver, renderer.clone()).run());

    let tracker = Tracker::new(config)?.with_events(event_sender);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Detect => {
            let sample = tracker.sample().await;
            drop(tracker);
            renderer.render_sample(&sample);
        }
        Commands::Plan => {
            let sample = tracker.sample().await;
            let phases = tracker.plan_phases(&sample)?;
            drop(tracker);
            renderer.render_plan(&phases);
        }
        Commands::Run => {
            let handle = tracker.start(()).await?;
            handle.wait().await;
            drop(tracker);
        }
    }

    // All senders are gone; let the handler drain the channel
    let _ = handler.await;
    Ok(())
}

/// Apply CLI flags on top of file and environment configuration.
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(speed) = global.speed {
        config.run.speed_override = Some(speed);
    }
    if global.compact {
        config.run.device = DeviceClass::Compact;
    }
    if let Some(min_duration_ms) = global.min_duration_ms {
        config.planner.minimum_total_ms = min_duration_ms;
    }
}
