//! Queue message handlers backed by the job service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{JobError, Result};
use crate::job::{JobRecord, JobStatus};
use crate::observability::SupervisorEvent;
use crate::queue::{MessageHandler, QueueMessage, QueueWorker};
use crate::snapshot::SnapshotStore;
use crate::target::TargetKind;

use super::{JOB_CLASS_NAME, JobService, METHOD_REMOVE_EVM_SNAPSHOT, METHOD_SIGNAL_ABORT};

/// Job-type specific progression logic, driven by `Job.signal` messages.
#[async_trait]
pub trait JobSubtype: Send + Sync {
    /// Advance `job` in response to `signal`. Mutations go through
    /// [`JobService::update_job`].
    async fn signal(&self, service: &JobService, job: &JobRecord, signal: &str) -> Result<()>;
}

/// Routes `Job.signal` to the subtype registered for the job's type.
pub struct SignalHandler {
    service: Arc<JobService>,
    subtypes: HashMap<String, Arc<dyn JobSubtype>>,
}

impl SignalHandler {
    pub fn new(service: Arc<JobService>) -> Self {
        Self {
            service,
            subtypes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, job_type: &str, subtype: Arc<dyn JobSubtype>) -> Self {
        self.subtypes.insert(job_type.to_string(), subtype);
        self
    }
}

#[async_trait]
impl MessageHandler for SignalHandler {
    async fn handle(&self, message: &QueueMessage) -> Result<Option<String>> {
        let id = job_instance_id(message)?;
        let signal = string_arg(message, 0)?;
        let Some(job) = self.service.get_job(id).await? else {
            return Ok(Some(format!("job {id} no longer exists")));
        };
        let subtype = self.subtypes.get(&job.job_type).ok_or_else(|| {
            JobError::Queue(format!("no subtype registered for job type {}", job.job_type))
        })?;
        subtype.signal(&self.service, &job, signal).await?;
        Ok(None)
    }
}

/// Delivers `Job.signal_abort`: `args = [message, status]`.
pub struct SignalAbortHandler {
    service: Arc<JobService>,
}

impl SignalAbortHandler {
    pub fn new(service: Arc<JobService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for SignalAbortHandler {
    async fn handle(&self, message: &QueueMessage) -> Result<Option<String>> {
        let id = job_instance_id(message)?;
        let text = string_arg(message, 0)?;
        let status = match message.args.get(1).and_then(|value| value.as_str()) {
            Some(raw) => JobStatus::parse(raw)
                .ok_or_else(|| JobError::Queue(format!("unknown job status {raw:?}")))?,
            None => JobStatus::Error,
        };
        let outcome = self.service.signal_abort(id, text, status).await?;
        Ok(outcome.map(|job| format!("job {} finished with status {}", job.guid, job.status)))
    }
}

/// Delivers `<target class>.remove_evm_snapshot`: `args = [snapshot_id]`.
pub struct RemoveSnapshotHandler {
    snapshots: Arc<dyn SnapshotStore>,
}

impl RemoveSnapshotHandler {
    pub fn new(snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self { snapshots }
    }
}

#[async_trait]
impl MessageHandler for RemoveSnapshotHandler {
    async fn handle(&self, message: &QueueMessage) -> Result<Option<String>> {
        let snapshot_id = message
            .args
            .first()
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                JobError::Queue(format!("message {} has no snapshot id argument", message.id))
            })?;

        let Some(snapshot) = self.snapshots.get(snapshot_id).await? else {
            return Ok(Some(format!("snapshot {snapshot_id} already removed")));
        };
        if message.instance_id != Some(snapshot.target.id) {
            return Err(JobError::Queue(format!(
                "snapshot {snapshot_id} does not belong to {}:{}",
                message.class_name,
                message.instance_id.unwrap_or_default()
            )));
        }

        let removed = self.snapshots.delete(snapshot_id).await?;
        tracing::info!(
            event = SupervisorEvent::SnapshotRemoved.as_str(),
            snapshot_id,
            target = %snapshot.target,
            removed,
            "evm snapshot removed"
        );
        Ok(Some(format!("snapshot {snapshot_id} removed")))
    }
}

impl JobService {
    /// Worker with the built-in `signal_abort` and `remove_evm_snapshot` handlers.
    ///
    /// Subtype progression is added by registering a [`SignalHandler`].
    pub fn default_worker(self: &Arc<Self>) -> QueueWorker {
        let removal: Arc<dyn MessageHandler> =
            Arc::new(RemoveSnapshotHandler::new(Arc::clone(&self.snapshots)));
        let worker = QueueWorker::new(Arc::clone(&self.queue)).with_handler(
            JOB_CLASS_NAME,
            METHOD_SIGNAL_ABORT,
            Arc::new(SignalAbortHandler::new(Arc::clone(self))),
        );
        TargetKind::ALL.iter().fold(worker, |worker, kind| {
            worker.with_handler(
                kind.class_name(),
                METHOD_REMOVE_EVM_SNAPSHOT,
                Arc::clone(&removal),
            )
        })
    }
}

fn job_instance_id(message: &QueueMessage) -> Result<u64> {
    message
        .instance_id
        .ok_or_else(|| JobError::Queue(format!("message {} has no job instance id", message.id)))
}

fn string_arg(message: &QueueMessage, index: usize) -> Result<&str> {
    message
        .args
        .get(index)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            JobError::Queue(format!(
                "message {} argument {index} is not a string",
                message.id
            ))
        })
}
