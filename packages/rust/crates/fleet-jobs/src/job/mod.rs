//! Job record: the durable state machine row behind every unit of work.

mod record;
mod store;

pub use record::{
    DispatchStatus, INITIAL_MESSAGE, JobOptions, JobRecord, JobStatus, STATE_FINISHED,
    STATE_WAITING_TO_START,
};
pub use store::{JobStore, MemoryJobStore};
