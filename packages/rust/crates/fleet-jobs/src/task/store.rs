use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

use super::{TaskPatch, TaskRecord};

/// Persistence for task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert and assign an id.
    async fn insert(&self, task: TaskRecord) -> Result<TaskRecord>;

    async fn get(&self, id: u64) -> Result<Option<TaskRecord>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<TaskRecord>>;

    /// Apply a field patch atomically, unless the task already mirrors a job
    /// version at or past `job_lock_version`.
    async fn apply_patch(
        &self,
        id: u64,
        job_lock_version: u64,
        patch: &TaskPatch,
    ) -> Result<PatchOutcome>;

    async fn count(&self) -> Result<usize>;
}

/// Result of [`TaskStore::apply_patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// A newer job commit was mirrored first; nothing written.
    Superseded,
    Missing,
}

#[derive(Debug, Default)]
struct TaskTable {
    next_id: u64,
    rows: BTreeMap<u64, TaskRecord>,
}

/// In-process task store.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    table: RwLock<TaskTable>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a task row (simulates an externally removed task).
    pub async fn remove(&self, id: u64) -> Option<TaskRecord> {
        self.table.write().await.rows.remove(&id)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, mut task: TaskRecord) -> Result<TaskRecord> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        task.id = table.next_id;
        table.rows.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: u64) -> Result<Option<TaskRecord>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TaskRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|task| task.name == name)
            .cloned())
    }

    async fn apply_patch(
        &self,
        id: u64,
        job_lock_version: u64,
        patch: &TaskPatch,
    ) -> Result<PatchOutcome> {
        let mut table = self.table.write().await;
        let Some(task) = table.rows.get_mut(&id) else {
            return Ok(PatchOutcome::Missing);
        };
        if task.job_lock_version >= job_lock_version {
            return Ok(PatchOutcome::Superseded);
        }
        patch.apply(task);
        task.job_lock_version = job_lock_version;
        Ok(PatchOutcome::Applied)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.read().await.rows.len())
    }
}
