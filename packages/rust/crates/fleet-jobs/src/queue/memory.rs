use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::{JobError, Result};
use crate::observability::SupervisorEvent;

use super::{EnqueueRequest, MessageFilter, MessageState, PutOutcome, QueueMessage, WorkQueue};

#[derive(Debug, Default)]
struct QueueTable {
    next_id: u64,
    messages: BTreeMap<u64, QueueMessage>,
}

impl QueueTable {
    fn insert(&mut self, request: EnqueueRequest, clock: &dyn Clock) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.insert(
            id,
            QueueMessage {
                id,
                class_name: request.class_name,
                instance_id: request.instance_id,
                method_name: request.method_name,
                args: request.args,
                role: request.role,
                zone: request.zone,
                state: MessageState::Pending,
                created_on: clock.now(),
                delivered_message: None,
            },
        );
        id
    }

    fn find_live(&self, filter: &MessageFilter) -> Option<&QueueMessage> {
        self.messages
            .values()
            .find(|message| filter.matches_live(message))
    }
}

/// In-process work queue.
///
/// Messages acknowledged `ok` are removed; `error` messages are retained for
/// inspection and never count as live.
pub struct MemoryWorkQueue {
    clock: Arc<dyn Clock>,
    table: Mutex<QueueTable>,
}

impl MemoryWorkQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            table: Mutex::new(QueueTable::default()),
        }
    }

    /// Force a message into `state` (test hook for simulating failed deliveries).
    pub async fn set_state(&self, id: u64, state: MessageState) -> Result<()> {
        let mut table = self.table.lock().await;
        let message = table
            .messages
            .get_mut(&id)
            .ok_or_else(|| JobError::Queue(format!("message {id} not found")))?;
        message.state = state;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
    async fn enqueue(&self, request: EnqueueRequest) -> Result<u64> {
        let mut table = self.table.lock().await;
        let id = table.insert(request, self.clock.as_ref());
        if let Some(message) = table.messages.get(&id) {
            tracing::debug!(
                event = SupervisorEvent::QueueMessageEnqueued.as_str(),
                message_id = id,
                class_name = %message.class_name,
                method_name = %message.method_name,
                role = %message.role,
                zone = ?message.zone,
                "queue message enqueued"
            );
        }
        Ok(id)
    }

    async fn find_live(&self, filter: &MessageFilter) -> Result<Option<QueueMessage>> {
        Ok(self.table.lock().await.find_live(filter).cloned())
    }

    async fn put_unless_exists(
        &self,
        request: EnqueueRequest,
        filter: &MessageFilter,
    ) -> Result<PutOutcome> {
        // Lookup and insert share one lock: the in-process uniqueness constraint.
        let mut table = self.table.lock().await;
        if let Some(existing) = table.find_live(filter) {
            tracing::debug!(
                event = SupervisorEvent::QueueMessageDeduplicated.as_str(),
                message_id = existing.id,
                method_name = %existing.method_name,
                state = existing.state.as_str(),
                "live queue message already present"
            );
            return Ok(PutOutcome::AlreadyQueued(existing.id));
        }
        let id = table.insert(request, self.clock.as_ref());
        tracing::debug!(
            event = SupervisorEvent::QueueMessageEnqueued.as_str(),
            message_id = id,
            role = %filter.role,
            zone = ?filter.zone,
            "queue message enqueued"
        );
        Ok(PutOutcome::Enqueued(id))
    }

    async fn get(&self, role: &str, zone: Option<&str>) -> Result<Option<QueueMessage>> {
        let mut table = self.table.lock().await;
        let claimed = table.messages.values_mut().find(|message| {
            message.state == MessageState::Pending
                && message.role == role
                && message.deliverable_in(zone)
        });
        Ok(claimed.map(|message| {
            message.state = MessageState::Active;
            message.clone()
        }))
    }

    async fn delivered(
        &self,
        id: u64,
        state: MessageState,
        message: Option<String>,
    ) -> Result<()> {
        if state.is_live() {
            return Err(JobError::Queue(format!(
                "message {id} acknowledged with non-terminal state {}",
                state.as_str()
            )));
        }
        let mut table = self.table.lock().await;
        if state == MessageState::Ok {
            return table
                .messages
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| JobError::Queue(format!("message {id} not found")));
        }
        let stored = table
            .messages
            .get_mut(&id)
            .ok_or_else(|| JobError::Queue(format!("message {id} not found")))?;
        stored.state = state;
        stored.delivered_message = message;
        Ok(())
    }

    async fn remove_for_instance(&self, class_name: &str, instance_id: u64) -> Result<usize> {
        let mut table = self.table.lock().await;
        let before = table.messages.len();
        table.messages.retain(|_, message| {
            !(message.class_name == class_name && message.instance_id == Some(instance_id))
        });
        Ok(before - table.messages.len())
    }

    async fn messages(&self) -> Result<Vec<QueueMessage>> {
        Ok(self.table.lock().await.messages.values().cloned().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory_queue.rs"]
mod tests;
