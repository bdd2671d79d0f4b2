//! Work queue interface consumed by the job service and both supervisors.
//!
//! Deduplication is the coordination primitive: every enqueue from the core
//! goes through [`WorkQueue::put_unless_exists`] keyed by a [`MessageFilter`].

mod memory;
mod message;
mod worker;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryWorkQueue;
pub use message::{
    EnqueueRequest, MessageFilter, MessageState, QueueMessage, ROLE_EMS_OPERATIONS,
    ROLE_SMARTSTATE,
};
pub use worker::{DeliveryReport, MessageHandler, QueueWorker};

/// Result of a deduplicated enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new message was created.
    Enqueued(u64),
    /// A live message with the same fingerprint already exists.
    AlreadyQueued(u64),
}

impl PutOutcome {
    pub const fn message_id(self) -> u64 {
        match self {
            Self::Enqueued(id) | Self::AlreadyQueued(id) => id,
        }
    }

    pub const fn is_enqueued(self) -> bool {
        matches!(self, Self::Enqueued(_))
    }
}

/// Persistent, zone- and role-partitioned message queue.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Create a pending message unconditionally.
    async fn enqueue(&self, request: EnqueueRequest) -> Result<u64>;

    /// First pending or active message matching `filter`.
    async fn find_live(&self, filter: &MessageFilter) -> Result<Option<QueueMessage>>;

    /// Enqueue unless a live message matches `filter`.
    ///
    /// This default is check-then-insert; backends should override it with an
    /// atomic conditional insert to close the window between the two steps.
    async fn put_unless_exists(
        &self,
        request: EnqueueRequest,
        filter: &MessageFilter,
    ) -> Result<PutOutcome> {
        if let Some(existing) = self.find_live(filter).await? {
            return Ok(PutOutcome::AlreadyQueued(existing.id));
        }
        self.enqueue(request).await.map(PutOutcome::Enqueued)
    }

    /// Claim the oldest pending message for `role` deliverable in `zone`,
    /// moving it to `active`.
    async fn get(&self, role: &str, zone: Option<&str>) -> Result<Option<QueueMessage>>;

    /// Acknowledge a claimed message with a terminal state.
    async fn delivered(&self, id: u64, state: MessageState, message: Option<String>)
    -> Result<()>;

    /// Drop every message addressed to one instance. Returns how many were removed.
    async fn remove_for_instance(&self, class_name: &str, instance_id: u64) -> Result<usize>;

    /// Snapshot of all retained messages.
    async fn messages(&self) -> Result<Vec<QueueMessage>>;
}
