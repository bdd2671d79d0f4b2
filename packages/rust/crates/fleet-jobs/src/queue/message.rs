use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role served by scan/smartstate workers; carries job progression and timeouts.
pub const ROLE_SMARTSTATE: &str = "smartstate";
/// Role served by provider-operation workers; carries snapshot removal.
pub const ROLE_EMS_OPERATIONS: &str = "ems_operations";

/// Delivery state of a queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    Pending,
    Active,
    Ok,
    Error,
}

impl MessageState {
    /// Pending or claimed: still expected to run.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Persisted queue message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub id: u64,
    pub class_name: String,
    pub instance_id: Option<u64>,
    pub method_name: String,
    pub args: Vec<Value>,
    pub role: String,
    /// `None` means any zone may deliver it.
    pub zone: Option<String>,
    pub state: MessageState,
    pub created_on: DateTime<Utc>,
    /// Result or failure text recorded at delivery.
    pub delivered_message: Option<String>,
}

impl QueueMessage {
    /// Whether a worker in `zone` may claim this message.
    pub fn deliverable_in(&self, zone: Option<&str>) -> bool {
        match (self.zone.as_deref(), zone) {
            (None, _) | (_, None) => true,
            (Some(own), Some(worker)) => own == worker,
        }
    }
}

/// Input to [`super::WorkQueue::enqueue`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnqueueRequest {
    pub class_name: String,
    pub instance_id: Option<u64>,
    pub method_name: String,
    pub args: Vec<Value>,
    pub role: String,
    pub zone: Option<String>,
}

impl EnqueueRequest {
    pub fn new(
        class_name: impl Into<String>,
        instance_id: Option<u64>,
        method_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            instance_id,
            method_name: method_name.into(),
            args: Vec::new(),
            role: role.into(),
            zone: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: Option<String>) -> Self {
        self.zone = zone;
        self
    }

    /// Filter matching live messages with the same role, zone and target.
    ///
    /// Arguments are not part of the fingerprint unless added with
    /// [`MessageFilter::with_args`].
    pub fn live_filter(&self) -> MessageFilter {
        MessageFilter {
            role: self.role.clone(),
            zone: self.zone.clone(),
            class_name: Some(self.class_name.clone()),
            instance_id: self.instance_id,
            method_name: Some(self.method_name.clone()),
            args: None,
        }
    }
}

/// Lookup key for live-message deduplication.
///
/// `zone` is matched exactly: a zone-less filter only finds zone-less messages.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFilter {
    pub role: String,
    pub zone: Option<String>,
    pub class_name: Option<String>,
    pub instance_id: Option<u64>,
    pub method_name: Option<String>,
    pub args: Option<Vec<Value>>,
}

impl MessageFilter {
    pub fn for_role(role: impl Into<String>, zone: Option<String>) -> Self {
        Self {
            role: role.into(),
            zone,
            class_name: None,
            instance_id: None,
            method_name: None,
            args: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Match ignoring message state.
    pub fn matches(&self, message: &QueueMessage) -> bool {
        message.role == self.role
            && message.zone == self.zone
            && self
                .class_name
                .as_ref()
                .is_none_or(|class_name| &message.class_name == class_name)
            && self
                .instance_id
                .is_none_or(|id| message.instance_id == Some(id))
            && self
                .method_name
                .as_ref()
                .is_none_or(|method| &message.method_name == method)
            && self.args.as_ref().is_none_or(|args| &message.args == args)
    }

    /// Match a message that is still pending or active.
    pub fn matches_live(&self, message: &QueueMessage) -> bool {
        message.state.is_live() && self.matches(message)
    }
}
