/// Event ids emitted as the `event` field of supervision log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorEvent {
    JobCreated,
    JobDispatched,
    JobCommitConflict,
    JobDestroyed,
    JobDestroyRejected,
    JobAborted,
    JobAbortIgnored,
    JobTargetMissing,
    TimeoutSweepStarted,
    TimeoutDetected,
    TimeoutQueued,
    TimeoutAlreadyQueued,
    TimeoutCandidateFailed,
    TimeoutSweepCompleted,
    TimeoutSweepFailed,
    SnapshotSweepStarted,
    SnapshotKeptActive,
    SnapshotWithinGrace,
    SnapshotRemovalQueued,
    SnapshotRemovalAlreadyQueued,
    SnapshotTargetMissing,
    SnapshotCandidateFailed,
    SnapshotSweepCompleted,
    SnapshotSweepFailed,
    SnapshotRemoved,
    TaskSynced,
    TaskSyncSkipped,
    TaskSyncSuperseded,
    TaskSyncFailed,
    QueueMessageEnqueued,
    QueueMessageDeduplicated,
    QueueMessageDelivered,
    QueueHandlerMissing,
    SchedulerStarted,
    SchedulerStopped,
}

impl SupervisorEvent {
    /// Every registered event, for registry checks.
    pub const ALL: [Self; 35] = [
        Self::JobCreated,
        Self::JobDispatched,
        Self::JobCommitConflict,
        Self::JobDestroyed,
        Self::JobDestroyRejected,
        Self::JobAborted,
        Self::JobAbortIgnored,
        Self::JobTargetMissing,
        Self::TimeoutSweepStarted,
        Self::TimeoutDetected,
        Self::TimeoutQueued,
        Self::TimeoutAlreadyQueued,
        Self::TimeoutCandidateFailed,
        Self::TimeoutSweepCompleted,
        Self::TimeoutSweepFailed,
        Self::SnapshotSweepStarted,
        Self::SnapshotKeptActive,
        Self::SnapshotWithinGrace,
        Self::SnapshotRemovalQueued,
        Self::SnapshotRemovalAlreadyQueued,
        Self::SnapshotTargetMissing,
        Self::SnapshotCandidateFailed,
        Self::SnapshotSweepCompleted,
        Self::SnapshotSweepFailed,
        Self::SnapshotRemoved,
        Self::TaskSynced,
        Self::TaskSyncSkipped,
        Self::TaskSyncSuperseded,
        Self::TaskSyncFailed,
        Self::QueueMessageEnqueued,
        Self::QueueMessageDeduplicated,
        Self::QueueMessageDelivered,
        Self::QueueHandlerMissing,
        Self::SchedulerStarted,
        Self::SchedulerStopped,
    ];

    /// Stable string id.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JobCreated => "job.created",
            Self::JobDispatched => "job.dispatched",
            Self::JobCommitConflict => "job.commit_conflict",
            Self::JobDestroyed => "job.destroyed",
            Self::JobDestroyRejected => "job.destroy_rejected",
            Self::JobAborted => "job.aborted",
            Self::JobAbortIgnored => "job.abort_ignored",
            Self::JobTargetMissing => "job.target_missing",
            Self::TimeoutSweepStarted => "timeout.sweep.started",
            Self::TimeoutDetected => "timeout.detected",
            Self::TimeoutQueued => "timeout.queued",
            Self::TimeoutAlreadyQueued => "timeout.already_queued",
            Self::TimeoutCandidateFailed => "timeout.candidate_failed",
            Self::TimeoutSweepCompleted => "timeout.sweep.completed",
            Self::TimeoutSweepFailed => "timeout.sweep.failed",
            Self::SnapshotSweepStarted => "snapshot.sweep.started",
            Self::SnapshotKeptActive => "snapshot.kept_active",
            Self::SnapshotWithinGrace => "snapshot.within_grace",
            Self::SnapshotRemovalQueued => "snapshot.removal_queued",
            Self::SnapshotRemovalAlreadyQueued => "snapshot.removal_already_queued",
            Self::SnapshotTargetMissing => "snapshot.target_missing",
            Self::SnapshotCandidateFailed => "snapshot.candidate_failed",
            Self::SnapshotSweepCompleted => "snapshot.sweep.completed",
            Self::SnapshotSweepFailed => "snapshot.sweep.failed",
            Self::SnapshotRemoved => "snapshot.removed",
            Self::TaskSynced => "task.synced",
            Self::TaskSyncSkipped => "task.sync_skipped",
            Self::TaskSyncSuperseded => "task.sync_superseded",
            Self::TaskSyncFailed => "task.sync_failed",
            Self::QueueMessageEnqueued => "queue.message.enqueued",
            Self::QueueMessageDeduplicated => "queue.message.deduplicated",
            Self::QueueMessageDelivered => "queue.message.delivered",
            Self::QueueHandlerMissing => "queue.handler_missing",
            Self::SchedulerStarted => "scheduler.started",
            Self::SchedulerStopped => "scheduler.stopped",
        }
    }
}
