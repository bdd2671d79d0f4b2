//! Config namespace: YAML settings loading and the resolved supervisor config.

mod settings;
mod supervisor;

pub use settings::{
    JobSettings, ScheduleSettings, ServerSettings, SnapshotSettings, SupervisorSettings,
    load_supervisor_settings, load_supervisor_settings_from_paths, set_config_home_override,
    supervisor_settings_paths,
};
pub use supervisor::{
    DEFAULT_JOB_NOT_FOUND_DELAY_SECS, DEFAULT_JOB_TIMEOUT_SECS,
    DEFAULT_SNAPSHOT_CHECK_INTERVAL_SECS, DEFAULT_TIMEOUT_CHECK_INTERVAL_SECS, SupervisorConfig,
};
