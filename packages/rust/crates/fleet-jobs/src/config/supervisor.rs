//! Resolved supervisor configuration.
//!
//! Settings are sourced once, at supervisor construction, and passed by value;
//! the sweep algorithms never consult settings files or env vars mid-run.

use std::collections::HashMap;
use std::time::Duration;

use crate::target::TargetKind;

use super::settings::SupervisorSettings;

pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 3_600;
pub const DEFAULT_JOB_NOT_FOUND_DELAY_SECS: u64 = 3_600;
pub const DEFAULT_TIMEOUT_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SNAPSHOT_CHECK_INTERVAL_SECS: u64 = 300;

const ENV_TIMEOUT_SECS: &str = "FLEET_JOBS_TIMEOUT_SECS";
const ENV_SNAPSHOT_DELAY_SECS: &str = "FLEET_JOBS_SNAPSHOT_DELAY_SECS";
const ENV_ZONE: &str = "FLEET_JOBS_ZONE";

/// Thresholds and cadence for the timeout and snapshot sweeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Inactivity threshold before an active job is timed out (before adjustment).
    pub base_timeout: Duration,
    /// Per-kind multipliers; kinds not listed use 1.
    pub timeout_adjustments: HashMap<TargetKind, u32>,
    /// Grace window before a cleanup-candidate snapshot is removed.
    pub job_not_found_delay: Duration,
    pub timeout_check_interval: Duration,
    pub snapshot_check_interval: Duration,
    /// Zone this process serves; `None` serves every zone.
    pub my_zone: Option<String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            base_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            timeout_adjustments: HashMap::new(),
            job_not_found_delay: Duration::from_secs(DEFAULT_JOB_NOT_FOUND_DELAY_SECS),
            timeout_check_interval: Duration::from_secs(DEFAULT_TIMEOUT_CHECK_INTERVAL_SECS),
            snapshot_check_interval: Duration::from_secs(DEFAULT_SNAPSHOT_CHECK_INTERVAL_SECS),
            my_zone: None,
        }
    }
}

impl SupervisorConfig {
    /// Resolve file settings over defaults.
    pub fn from_settings(settings: &SupervisorSettings) -> Self {
        let defaults = Self::default();
        let mut timeout_adjustments = HashMap::new();
        for (key, factor) in settings.jobs.timeout_adjustments.iter().flatten() {
            match TargetKind::parse(key) {
                Some(kind) => {
                    timeout_adjustments.insert(kind, (*factor).max(1));
                }
                None => tracing::warn!(
                    key = %key,
                    "unknown target kind in jobs.timeout_adjustments; ignoring"
                ),
            }
        }

        Self {
            base_timeout: secs_or(settings.jobs.timeout_secs, defaults.base_timeout),
            timeout_adjustments,
            job_not_found_delay: settings
                .snapshots
                .job_not_found_delay_secs
                .map_or(defaults.job_not_found_delay, Duration::from_secs),
            timeout_check_interval: secs_or(
                settings.schedule.timeout_check_interval_secs,
                defaults.timeout_check_interval,
            ),
            snapshot_check_interval: secs_or(
                settings.schedule.snapshot_check_interval_secs,
                defaults.snapshot_check_interval,
            ),
            my_zone: non_empty(settings.server.zone.as_deref()),
        }
    }

    /// Apply `FLEET_JOBS_*` env overrides; invalid values are logged and ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = env_secs(ENV_TIMEOUT_SECS) {
            self.base_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = env_secs(ENV_SNAPSHOT_DELAY_SECS) {
            self.job_not_found_delay = Duration::from_secs(secs);
        }
        if let Ok(zone) = std::env::var(ENV_ZONE) {
            self.my_zone = non_empty(Some(&zone));
        }
        self
    }

    /// Multiplier applied to `base_timeout` for jobs targeting `kind`.
    pub fn timeout_adjustment(&self, kind: Option<TargetKind>) -> u32 {
        kind.and_then(|kind| self.timeout_adjustments.get(&kind).copied())
            .unwrap_or(1)
            .max(1)
    }

    /// Effective inactivity threshold for a given multiplier.
    pub fn timeout_threshold(&self, adjustment: u32) -> Duration {
        self.base_timeout.saturating_mul(adjustment.max(1))
    }
}

fn secs_or(value: Option<u64>, fallback: Duration) -> Duration {
    value.map_or(fallback, |secs| Duration::from_secs(secs.max(1)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_secs(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                env_var = name,
                value = %raw,
                "invalid seconds env value; using settings/default"
            );
            None
        }
    }
}
