use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::target::TargetRef;

use super::Snapshot;

/// Read/delete access to snapshot rows.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn list_by_name(&self, name: &str) -> Result<Vec<Snapshot>>;

    async fn get(&self, id: u64) -> Result<Option<Snapshot>>;

    /// Returns `false` when the row was already gone.
    async fn delete(&self, id: u64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct SnapshotTable {
    next_id: u64,
    rows: BTreeMap<u64, Snapshot>,
}

/// In-process snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    table: RwLock<SnapshotTable>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot taken on `target`.
    pub async fn create(
        &self,
        target: TargetRef,
        name: &str,
        description: &str,
        created_on: DateTime<Utc>,
    ) -> Snapshot {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let snapshot = Snapshot {
            id: table.next_id,
            target,
            name: name.to_string(),
            description: description.to_string(),
            created_on,
        };
        table.rows.insert(snapshot.id, snapshot.clone());
        snapshot
    }

    /// Overwrite a description (used to simulate corrupted descriptors).
    pub async fn set_description(&self, id: u64, description: &str) -> bool {
        match self.table.write().await.rows.get_mut(&id) {
            Some(snapshot) => {
                snapshot.description = description.to_string();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn list_by_name(&self, name: &str) -> Result<Vec<Snapshot>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|snapshot| snapshot.name == name)
            .cloned()
            .collect())
    }

    async fn get(&self, id: u64) -> Result<Option<Snapshot>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
