use crate::job::JobRecord;
use crate::observability::SupervisorEvent;

use super::{PatchOutcome, TaskPatch, TaskStore};

/// Result of one post-commit synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSyncOutcome {
    /// Changed fields were written.
    Synced(Vec<&'static str>),
    /// Nothing mirrored changed.
    Unchanged,
    /// A later commit of the same job reached the task first.
    Superseded,
    /// Job has no linked task, or the task row is gone.
    NoTask,
    /// The write failed; the job commit stands.
    Failed(String),
}

/// Mirror the commit `old` → `new` onto the linked task.
///
/// When anything mirrored changed, the full attribute set of `new` is written,
/// conditioned on `new.lock_version`: a sync that arrives after a later commit
/// was mirrored is dropped, and the later write already carries every field.
/// Never fails the caller: write errors are logged and reported in the outcome.
pub async fn sync_linked_task(
    tasks: &dyn TaskStore,
    old: &JobRecord,
    new: &JobRecord,
) -> TaskSyncOutcome {
    let Some(task_id) = new.miq_task_id else {
        return TaskSyncOutcome::NoTask;
    };
    let attributes = new.attributes_for_task();
    let changed = TaskPatch::diff(&old.attributes_for_task(), &attributes);
    if changed.is_empty() {
        return TaskSyncOutcome::Unchanged;
    }

    let patch = TaskPatch::full(&attributes);
    match tasks.apply_patch(task_id, new.lock_version, &patch).await {
        Ok(PatchOutcome::Applied) => {
            let fields = changed.field_names();
            tracing::debug!(
                event = SupervisorEvent::TaskSynced.as_str(),
                job_guid = %new.guid,
                task_id,
                lock_version = new.lock_version,
                fields = ?fields,
                "linked task synchronized"
            );
            TaskSyncOutcome::Synced(fields)
        }
        Ok(PatchOutcome::Superseded) => {
            tracing::debug!(
                event = SupervisorEvent::TaskSyncSuperseded.as_str(),
                job_guid = %new.guid,
                task_id,
                lock_version = new.lock_version,
                "linked task already mirrors a later commit; skipping"
            );
            TaskSyncOutcome::Superseded
        }
        Ok(PatchOutcome::Missing) => {
            tracing::debug!(
                event = SupervisorEvent::TaskSyncSkipped.as_str(),
                job_guid = %new.guid,
                task_id,
                "linked task missing; skipping synchronization"
            );
            TaskSyncOutcome::NoTask
        }
        Err(error) => {
            tracing::warn!(
                event = SupervisorEvent::TaskSyncFailed.as_str(),
                job_guid = %new.guid,
                task_id,
                error = %error,
                "linked task synchronization failed"
            );
            TaskSyncOutcome::Failed(error.to_string())
        }
    }
}
