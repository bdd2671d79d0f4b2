//! User-facing task mirror of a job and the one-way job → task bridge.

mod attributes;
mod store;
mod sync;

use chrono::{DateTime, Utc};

pub use attributes::{TaskAttributes, TaskPatch, capitalize};
pub use store::{MemoryTaskStore, PatchOutcome, TaskStore};
pub use sync::{TaskSyncOutcome, sync_linked_task};

/// Progress record read by user-facing consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u64,
    pub name: String,
    pub state: String,
    pub status: String,
    pub message: String,
    pub userid: Option<String>,
    pub miq_server_id: Option<u64>,
    pub context_data: Option<String>,
    pub zone: Option<String>,
    pub started_on: Option<DateTime<Utc>>,
    /// Job `lock_version` the mirrored fields were last written from.
    pub job_lock_version: u64,
}

impl TaskRecord {
    /// Unsaved task seeded from job attributes.
    pub fn from_attributes(attributes: &TaskAttributes) -> Self {
        let mut task = Self {
            id: 0,
            name: String::new(),
            state: String::new(),
            status: String::new(),
            message: String::new(),
            userid: None,
            miq_server_id: None,
            context_data: None,
            zone: None,
            started_on: None,
            job_lock_version: 0,
        };
        TaskPatch::full(attributes).apply(&mut task);
        task
    }
}
