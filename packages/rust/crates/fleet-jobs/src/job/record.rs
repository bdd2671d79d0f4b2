use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::target::TargetRef;

/// State a freshly created job starts in.
pub const STATE_WAITING_TO_START: &str = "waiting_to_start";
/// The only terminal state the supervision core recognizes.
pub const STATE_FINISHED: &str = "finished";
/// Message set on creation.
pub const INITIAL_MESSAGE: &str = "process initiated";

/// Outcome classification; meaningful once `state == finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Ok,
    Warn,
    Error,
    Unknown,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a status value, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ok" => Some(Self::Ok),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a work-queue message for the job is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Pending,
    Active,
}

impl DispatchStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

/// Creation input for [`crate::JobService::create_job`].
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Job name, shared with the linked task.
    pub name: String,
    pub userid: Option<String>,
    pub zone: Option<String>,
    pub target: Option<TargetRef>,
    pub miq_server_id: Option<u64>,
    pub context: Option<String>,
    /// Job-subtype configuration; read-only to the core.
    pub options: serde_json::Value,
}

impl JobOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    #[must_use]
    pub fn with_userid(mut self, userid: impl Into<String>) -> Self {
        self.userid = Some(userid.into());
        self
    }
}

/// Durable job state machine row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Store row id; doubles as the queue `instance_id`.
    pub id: u64,
    pub guid: Uuid,
    /// Job subtype, e.g. `VmScan`.
    pub job_type: String,
    pub name: String,
    pub state: String,
    pub status: JobStatus,
    pub dispatch_status: DispatchStatus,
    pub message: String,
    pub userid: Option<String>,
    pub context: Option<String>,
    pub miq_server_id: Option<u64>,
    /// `None` means repository-local: any zone may run it.
    pub zone: Option<String>,
    pub target: Option<TargetRef>,
    pub options: serde_json::Value,
    pub miq_task_id: Option<u64>,
    pub started_on: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
    /// Bumped on every committed update.
    pub updated_on: DateTime<Utc>,
    pub lock_version: u64,
}

impl JobRecord {
    /// Build an unsaved record in the initial state.
    pub fn new(job_type: &str, options: JobOptions, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            guid: Uuid::new_v4(),
            job_type: job_type.to_string(),
            name: options.name,
            state: STATE_WAITING_TO_START.to_string(),
            status: JobStatus::Ok,
            dispatch_status: DispatchStatus::Pending,
            message: INITIAL_MESSAGE.to_string(),
            userid: options.userid,
            context: options.context,
            miq_server_id: options.miq_server_id,
            zone: options.zone,
            target: options.target,
            options: options.options,
            miq_task_id: None,
            started_on: None,
            created_on: now,
            updated_on: now,
            lock_version: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == STATE_FINISHED
    }

    /// In flight: neither waiting to start nor finished.
    pub fn is_active(&self) -> bool {
        self.state != STATE_WAITING_TO_START && !self.is_finished()
    }

    /// Candidate for the timeout sweep.
    pub fn is_dispatched_unfinished(&self) -> bool {
        self.dispatch_status == DispatchStatus::Active && !self.is_finished()
    }

    /// Diagnostic string containing type, name and guid.
    pub fn attributes_log(&self) -> String {
        format!(
            "type: [{}], name: [{}], guid: [{}]",
            self.job_type, self.name, self.guid
        )
    }
}
