use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{JobError, Result};

use super::JobRecord;

/// Transactional persistence for job records.
///
/// Writes are conditional on `lock_version` so a worker and a supervisor
/// racing on the same row cannot lose each other's updates.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert and assign an id. The stored `lock_version` starts at 0.
    async fn insert(&self, record: JobRecord) -> Result<JobRecord>;

    async fn get(&self, id: u64) -> Result<Option<JobRecord>>;

    async fn find_by_guid(&self, guid: Uuid) -> Result<Option<JobRecord>>;

    /// Replace the row when its stored version equals `record.lock_version`.
    ///
    /// Returns the committed row with `lock_version` incremented.
    async fn compare_and_swap(&self, record: JobRecord) -> Result<JobRecord>;

    /// Delete the row when its stored version equals `expected_version`.
    async fn delete(&self, id: u64, expected_version: u64) -> Result<()>;

    /// Rows with `dispatch_status == active` and `state != finished`.
    async fn list_active_unfinished(&self) -> Result<Vec<JobRecord>>;

    async fn count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
struct JobTable {
    next_id: u64,
    rows: BTreeMap<u64, JobRecord>,
}

/// In-process job store.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    table: RwLock<JobTable>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, mut record: JobRecord) -> Result<JobRecord> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|row| row.guid == record.guid) {
            return Err(JobError::Store(format!(
                "duplicate job guid {}",
                record.guid
            )));
        }
        table.next_id += 1;
        record.id = table.next_id;
        record.lock_version = 0;
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<JobRecord>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_guid(&self, guid: Uuid) -> Result<Option<JobRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|row| row.guid == guid)
            .cloned())
    }

    async fn compare_and_swap(&self, mut record: JobRecord) -> Result<JobRecord> {
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&record.id)
            .ok_or(JobError::NotFound(record.id))?;
        if stored.lock_version != record.lock_version {
            return Err(JobError::StaleRecord {
                id: record.id,
                expected: record.lock_version,
            });
        }
        record.lock_version += 1;
        *stored = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: u64, expected_version: u64) -> Result<()> {
        let mut table = self.table.write().await;
        let stored = table.rows.get(&id).ok_or(JobError::NotFound(id))?;
        if stored.lock_version != expected_version {
            return Err(JobError::StaleRecord {
                id,
                expected: expected_version,
            });
        }
        table.rows.remove(&id);
        Ok(())
    }

    async fn list_active_unfinished(&self) -> Result<Vec<JobRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.is_dispatched_unfinished())
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.read().await.rows.len())
    }
}
