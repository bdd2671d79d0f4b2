use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

use super::{TargetEntity, TargetKind, TargetLookup, TargetRef};

/// In-process entity inventory serving any target kind.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    entities: RwLock<HashMap<TargetRef, TargetEntity>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity; returns its reference.
    pub async fn insert(&self, entity: TargetEntity) -> TargetRef {
        let target = entity.target_ref();
        self.entities.write().await.insert(target, entity);
        target
    }

    /// Convenience insert for tests and demos.
    pub async fn add(
        &self,
        kind: TargetKind,
        id: u64,
        name: &str,
        zone: Option<&str>,
    ) -> TargetRef {
        self.insert(TargetEntity {
            kind,
            id,
            name: name.to_string(),
            zone: zone.map(str::to_string),
        })
        .await
    }

    /// Remove an entity (simulates deletion of the underlying VM/image).
    pub async fn remove(&self, target: &TargetRef) -> Option<TargetEntity> {
        self.entities.write().await.remove(target)
    }
}

#[async_trait]
impl TargetLookup for MemoryInventory {
    async fn find(&self, target: &TargetRef) -> Result<Option<TargetEntity>> {
        Ok(self.entities.read().await.get(target).cloned())
    }
}
