//! Command line interface definition

use clap::{Parser, Subcommand};
use splashtrack_types::SpeedTier;
use std::path::PathBuf;

/// splashtrack - timed phase progress tracker
#[derive(Parser)]
#[command(name = "splashtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Timed phase progress tracker with network-aware pacing")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force a speed tier instead of probing the network
    #[arg(long, global = true, value_enum)]
    pub speed: Option<SpeedTier>,

    /// Plan for a compact device
    #[arg(long, global = true)]
    pub compact: bool,

    /// Minimum total run duration in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub min_duration_ms: Option<u64>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and render progress until completion
    Run,

    /// Probe the network and report the quality sample
    Detect,

    /// Show the phase plan for the current network conditions
    Plan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::parse_from([
            "splashtrack",
            "--speed",
            "fast",
            "--compact",
            "--min-duration-ms",
            "12000",
            "run",
        ]);
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.global.speed, Some(SpeedTier::Fast));
        assert!(cli.global.compact);
        assert_eq!(cli.global.min_duration_ms, Some(12_000));
    }

    #[test]
    fn test_cli_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["splashtrack"]);
        assert!(cli.command.is_none());
        assert!(!cli.global.json);
    }
}
