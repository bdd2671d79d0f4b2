//! Settings loader for fleet-jobs.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/fleet-jobs.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/fleet-jobs/settings.yaml`
//!
//! Merge precedence is user over system.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/fleet-jobs.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "fleet-jobs/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupervisorSettings {
    #[serde(default)]
    pub jobs: JobSettings,
    #[serde(default)]
    pub snapshots: SnapshotSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSettings {
    pub timeout_secs: Option<u64>,
    /// Multiplier per target kind key (`vm_or_template`, `container_image`, ...).
    pub timeout_adjustments: Option<HashMap<String, u32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotSettings {
    pub job_not_found_delay_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleSettings {
    pub timeout_check_interval_secs: Option<u64>,
    pub snapshot_check_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSettings {
    pub zone: Option<String>,
}

impl SupervisorSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            jobs: self.jobs.merge(overlay.jobs),
            snapshots: self.snapshots.merge(overlay.snapshots),
            schedule: self.schedule.merge(overlay.schedule),
            server: self.server.merge(overlay.server),
        }
    }
}

impl JobSettings {
    fn merge(self, overlay: Self) -> Self {
        let timeout_adjustments = match (self.timeout_adjustments, overlay.timeout_adjustments) {
            (None, None) => None,
            (Some(base), None) => Some(base),
            (None, Some(overlay)) => Some(overlay),
            (Some(mut base), Some(overlay)) => {
                base.extend(overlay);
                Some(base)
            }
        };
        Self {
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
            timeout_adjustments,
        }
    }
}

impl SnapshotSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            job_not_found_delay_secs: overlay
                .job_not_found_delay_secs
                .or(self.job_not_found_delay_secs),
        }
    }
}

impl ScheduleSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            timeout_check_interval_secs: overlay
                .timeout_check_interval_secs
                .or(self.timeout_check_interval_secs),
            snapshot_check_interval_secs: overlay
                .snapshot_check_interval_secs
                .or(self.snapshot_check_interval_secs),
        }
    }
}

impl ServerSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            zone: overlay.zone.or(self.zone),
        }
    }
}

/// Load merged supervisor settings (user overrides system).
pub fn load_supervisor_settings() -> SupervisorSettings {
    let (system_path, user_path) = supervisor_settings_paths();
    load_supervisor_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn supervisor_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_supervisor_settings_from_paths(system: &Path, user: &Path) -> SupervisorSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> SupervisorSettings {
    if !path.exists() {
        return SupervisorSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return SupervisorSettings::default();
        }
    };
    match serde_yaml::from_str::<SupervisorSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            SupervisorSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
