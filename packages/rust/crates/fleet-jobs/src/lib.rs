//! Fleet job supervision core.
//!
//! Jobs are durable state machines advanced by work-queue messages. Two sweeps
//! keep the fleet honest: the timeout sweep aborts jobs whose dispatch went
//! quiet, and the snapshot sweep queues removal of `EvmSnapshot` artifacts
//! whose job is finished or gone. All coordination goes through the record
//! stores and the queue's deduplicated enqueue.

#![allow(missing_docs)]

mod clock;
mod config;
mod error;
mod job;
mod observability;
mod queue;
mod service;
mod snapshot;
mod supervisor;
mod target;
mod task;

pub use clock::{Clock, ManualClock, SystemClock, elapsed_between};
pub use config::{
    DEFAULT_JOB_NOT_FOUND_DELAY_SECS, DEFAULT_JOB_TIMEOUT_SECS,
    DEFAULT_SNAPSHOT_CHECK_INTERVAL_SECS, DEFAULT_TIMEOUT_CHECK_INTERVAL_SECS, JobSettings,
    ScheduleSettings, ServerSettings, SnapshotSettings, SupervisorConfig, SupervisorSettings,
    load_supervisor_settings, load_supervisor_settings_from_paths, set_config_home_override,
    supervisor_settings_paths,
};
pub use error::{JobError, Result};
pub use job::{
    DispatchStatus, INITIAL_MESSAGE, JobOptions, JobRecord, JobStatus, JobStore, MemoryJobStore,
    STATE_FINISHED, STATE_WAITING_TO_START,
};
pub use observability::SupervisorEvent;
pub use queue::{
    DeliveryReport, EnqueueRequest, MemoryWorkQueue, MessageFilter, MessageHandler, MessageState,
    PutOutcome, QueueMessage, QueueWorker, ROLE_EMS_OPERATIONS, ROLE_SMARTSTATE, WorkQueue,
};
pub use service::{
    DestroyOutcome, JOB_CLASS_NAME, JobBackends, JobService, JobSubtype, METHOD_REMOVE_EVM_SNAPSHOT,
    METHOD_SIGNAL, METHOD_SIGNAL_ABORT, MemoryBackends, RemoveSnapshotHandler, SIGNAL_START,
    SignalAbortHandler, SignalHandler,
};
pub use snapshot::{
    EVM_SNAPSHOT_NAME, MemorySnapshotStore, ParsedSnapshotDescription, Snapshot, SnapshotStore,
    format_evm_snapshot_description, parse_evm_snapshot_description,
};
pub use supervisor::{
    SchedulerConfig, SchedulerOutcome, SnapshotSweepOutcome, TimeoutSweepOutcome,
    run_supervisor_loop,
};
pub use target::{MemoryInventory, TargetEntity, TargetKind, TargetLookup, TargetRef, TargetRegistry};
pub use task::{
    MemoryTaskStore, PatchOutcome, TaskAttributes, TaskPatch, TaskRecord, TaskStore,
    TaskSyncOutcome, capitalize, sync_linked_task,
};
