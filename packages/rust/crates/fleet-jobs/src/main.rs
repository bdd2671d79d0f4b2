//! fleet-jobs CLI: run the supervision sweeps or inspect configuration.
//!
//! Logging: set `RUST_LOG=fleet_jobs=debug` to see per-candidate sweep decisions.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_jobs::{
    JobService, MemoryBackends, SchedulerConfig, SupervisorConfig, SystemClock,
    load_supervisor_settings, parse_evm_snapshot_description, run_supervisor_loop,
    set_config_home_override,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fleet_jobs=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = SupervisorConfig::from_settings(&load_supervisor_settings()).with_env_overrides();

    match cli.command {
        Command::Run {
            max_ticks,
            timeout_check_interval_secs,
            snapshot_check_interval_secs,
        } => {
            run_mode(
                config,
                max_ticks,
                timeout_check_interval_secs,
                snapshot_check_interval_secs,
            )
            .await
        }
        Command::ParseSnapshot { description } => {
            let parsed = parse_evm_snapshot_description(&description);
            println!(
                "job_guid={} created_at={}",
                parsed
                    .job_guid
                    .map_or_else(|| "-".to_string(), |guid| guid.to_string()),
                parsed
                    .created_at
                    .map_or_else(|| "-".to_string(), |at| at.to_rfc3339())
            );
            Ok(())
        }
        Command::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_mode(
    config: SupervisorConfig,
    max_ticks: Option<u64>,
    timeout_check_interval_secs: Option<u64>,
    snapshot_check_interval_secs: Option<u64>,
) -> anyhow::Result<()> {
    let mut schedule = SchedulerConfig::from_supervisor_config(&config).with_max_ticks(max_ticks);
    if let Some(secs) = timeout_check_interval_secs {
        schedule.timeout_check_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = snapshot_check_interval_secs {
        schedule.snapshot_check_interval = Duration::from_secs(secs);
    }

    let backends = MemoryBackends::new(Arc::new(SystemClock));
    let service = Arc::new(JobService::new(backends.backends(), config));

    println!(
        "Starting supervisor: timeout_every={}s snapshot_every={}s max_ticks={:?}",
        schedule.timeout_check_interval.as_secs(),
        schedule.snapshot_check_interval.as_secs(),
        schedule.max_ticks
    );
    let outcome = run_supervisor_loop(service, schedule).await?;
    println!(
        "Supervisor finished: timeout_sweeps={} snapshot_sweeps={} failed_sweeps={} timeouts_enqueued={} removals_enqueued={}",
        outcome.timeout_sweeps,
        outcome.snapshot_sweeps,
        outcome.failed_sweeps,
        outcome.timeouts_enqueued,
        outcome.removals_enqueued,
    );
    Ok(())
}

fn show_config(config: &SupervisorConfig) {
    println!("base_timeout_secs={}", config.base_timeout.as_secs());
    println!(
        "job_not_found_delay_secs={}",
        config.job_not_found_delay.as_secs()
    );
    println!(
        "timeout_check_interval_secs={}",
        config.timeout_check_interval.as_secs()
    );
    println!(
        "snapshot_check_interval_secs={}",
        config.snapshot_check_interval.as_secs()
    );
    println!("my_zone={}", config.my_zone.as_deref().unwrap_or("-"));
    let mut adjustments: Vec<_> = config.timeout_adjustments.iter().collect();
    adjustments.sort_by_key(|(kind, _)| kind.as_str());
    for (kind, factor) in adjustments {
        println!("timeout_adjustment.{}={factor}", kind.as_str());
    }
}
