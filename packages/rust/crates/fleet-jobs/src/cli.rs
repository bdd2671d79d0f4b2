use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fleet-jobs")]
#[command(about = "Fleet job supervision: timeout escalation and snapshot reconciliation sweeps.")]
pub(crate) struct Cli {
    /// Override config directory (user settings are read from `<conf>/fleet-jobs/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run both sweeps periodically until Ctrl+C.
    ///
    /// The stores are in-memory and start empty, so this only exercises the
    /// sweep schedule; no jobs or snapshots exist for it to act on.
    Run {
        /// Stop after this many sweeps (timeout and snapshot sweeps both count).
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Override the timeout sweep interval in seconds.
        #[arg(long)]
        timeout_check_interval_secs: Option<u64>,

        /// Override the snapshot sweep interval in seconds.
        #[arg(long)]
        snapshot_check_interval_secs: Option<u64>,
    },
    /// Parse an `EvmSnapshot` description and print the owning job guid and timestamp.
    ParseSnapshot {
        /// Snapshot description text.
        description: String,
    },
    /// Print the resolved supervisor configuration.
    ShowConfig,
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
