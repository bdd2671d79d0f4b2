use clap::{CommandFactory, Parser};

use super::{Cli, Command};

#[test]
fn run_help_says_the_stores_start_empty() {
    let mut cli = Cli::command();
    let run = cli
        .find_subcommand_mut("run")
        .map(|run| run.render_long_help().to_string())
        .unwrap_or_default();
    assert!(run.contains("in-memory and start empty"), "run help:\n{run}");
}

#[test]
fn run_accepts_tick_and_interval_overrides() {
    let cli = Cli::try_parse_from([
        "fleet-jobs",
        "run",
        "--max-ticks",
        "4",
        "--timeout-check-interval-secs",
        "5",
    ]);
    assert!(matches!(
        cli.map(|cli| cli.command),
        Ok(Command::Run {
            max_ticks: Some(4),
            timeout_check_interval_secs: Some(5),
            snapshot_check_interval_secs: None,
        })
    ));
}
