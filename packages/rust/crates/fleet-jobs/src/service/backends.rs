use std::sync::Arc;

use crate::clock::Clock;
use crate::job::{JobStore, MemoryJobStore};
use crate::queue::{MemoryWorkQueue, WorkQueue};
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};
use crate::target::{MemoryInventory, TargetKind, TargetLookup, TargetRegistry};
use crate::task::{MemoryTaskStore, TaskStore};

/// Collaborators the job service runs against.
#[derive(Clone)]
pub struct JobBackends {
    pub jobs: Arc<dyn JobStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub queue: Arc<dyn WorkQueue>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub targets: TargetRegistry,
    pub clock: Arc<dyn Clock>,
}

/// In-process backends with concrete handles kept for inspection.
pub struct MemoryBackends {
    pub jobs: Arc<MemoryJobStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub queue: Arc<MemoryWorkQueue>,
    pub snapshots: Arc<MemorySnapshotStore>,
    pub inventory: Arc<MemoryInventory>,
    pub clock: Arc<dyn Clock>,
}

impl MemoryBackends {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: Arc::new(MemoryJobStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            queue: Arc::new(MemoryWorkQueue::new(Arc::clone(&clock))),
            snapshots: Arc::new(MemorySnapshotStore::new()),
            inventory: Arc::new(MemoryInventory::new()),
            clock,
        }
    }

    /// Trait-object view; the inventory serves every target kind.
    pub fn backends(&self) -> JobBackends {
        let inventory: Arc<dyn TargetLookup> = self.inventory.clone();
        JobBackends {
            jobs: self.jobs.clone(),
            tasks: self.tasks.clone(),
            queue: self.queue.clone(),
            snapshots: self.snapshots.clone(),
            targets: TargetRegistry::new().with_lookup_for_all(&TargetKind::ALL, &inventory),
            clock: Arc::clone(&self.clock),
        }
    }
}
