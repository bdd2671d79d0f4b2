use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::observability::SupervisorEvent;

use super::{MessageState, QueueMessage, WorkQueue};

/// Executes one kind of queue message, keyed by `(class_name, method_name)`.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Run the message. `Ok` carries an optional result note.
    async fn handle(&self, message: &QueueMessage) -> Result<Option<String>>;
}

/// What happened to one claimed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub message_id: u64,
    pub class_name: String,
    pub method_name: String,
    pub state: MessageState,
    pub detail: Option<String>,
}

/// Claims messages for a role/zone and routes them to registered handlers.
pub struct QueueWorker {
    queue: Arc<dyn WorkQueue>,
    handlers: HashMap<(String, String), Arc<dyn MessageHandler>>,
}

impl QueueWorker {
    pub fn new(queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            queue,
            handlers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_handler(
        mut self,
        class_name: &str,
        method_name: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        self.handlers
            .insert((class_name.to_string(), method_name.to_string()), handler);
        self
    }

    /// Claim, run and acknowledge one message. `Ok(None)` when nothing is pending.
    pub async fn process_next(
        &self,
        role: &str,
        zone: Option<&str>,
    ) -> Result<Option<DeliveryReport>> {
        let Some(message) = self.queue.get(role, zone).await? else {
            return Ok(None);
        };

        let key = (message.class_name.clone(), message.method_name.clone());
        let (state, detail) = match self.handlers.get(&key) {
            Some(handler) => match handler.handle(&message).await {
                Ok(note) => (MessageState::Ok, note),
                Err(error) => (MessageState::Error, Some(error.to_string())),
            },
            None => {
                tracing::warn!(
                    event = SupervisorEvent::QueueHandlerMissing.as_str(),
                    message_id = message.id,
                    class_name = %message.class_name,
                    method_name = %message.method_name,
                    "no handler registered for queue message"
                );
                (
                    MessageState::Error,
                    Some(format!(
                        "no handler for {}.{}",
                        message.class_name, message.method_name
                    )),
                )
            }
        };

        self.queue
            .delivered(message.id, state, detail.clone())
            .await?;
        tracing::info!(
            event = SupervisorEvent::QueueMessageDelivered.as_str(),
            message_id = message.id,
            class_name = %message.class_name,
            method_name = %message.method_name,
            state = state.as_str(),
            "queue message delivered"
        );

        Ok(Some(DeliveryReport {
            message_id: message.id,
            class_name: message.class_name,
            method_name: message.method_name,
            state,
            detail,
        }))
    }

    /// Deliver until the role/zone has nothing pending or `limit` is reached.
    pub async fn drain(
        &self,
        role: &str,
        zone: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DeliveryReport>> {
        let mut reports = Vec::new();
        while reports.len() < limit {
            match self.process_next(role, zone).await? {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        Ok(reports)
    }
}
