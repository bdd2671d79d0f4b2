use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{JobError, Result};

use super::{TargetEntity, TargetKind, TargetRef};

/// Entity lookup for one or more target kinds.
#[async_trait]
pub trait TargetLookup: Send + Sync {
    /// Return the entity, or `None` when it no longer exists.
    async fn find(&self, target: &TargetRef) -> Result<Option<TargetEntity>>;
}

/// Maps target kinds to their lookup.
#[derive(Clone, Default)]
pub struct TargetRegistry {
    lookups: HashMap<TargetKind, Arc<dyn TargetLookup>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `lookup` for `kind`, replacing any earlier registration.
    #[must_use]
    pub fn with_lookup(mut self, kind: TargetKind, lookup: Arc<dyn TargetLookup>) -> Self {
        self.lookups.insert(kind, lookup);
        self
    }

    /// Register one lookup for several kinds.
    #[must_use]
    pub fn with_lookup_for_all(
        mut self,
        kinds: &[TargetKind],
        lookup: &Arc<dyn TargetLookup>,
    ) -> Self {
        for kind in kinds {
            self.lookups.insert(*kind, Arc::clone(lookup));
        }
        self
    }

    pub fn is_registered(&self, kind: TargetKind) -> bool {
        self.lookups.contains_key(&kind)
    }

    /// Resolve a reference to its entity.
    ///
    /// A deleted entity resolves to `Ok(None)`; an unregistered kind is an error.
    pub async fn resolve(&self, target: &TargetRef) -> Result<Option<TargetEntity>> {
        let lookup = self.lookups.get(&target.kind).ok_or_else(|| {
            JobError::Target(format!("no lookup registered for {}", target.kind))
        })?;
        lookup.find(target).await
    }
}
