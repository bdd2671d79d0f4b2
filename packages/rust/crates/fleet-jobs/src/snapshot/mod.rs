//! Snapshot artifacts created as a side effect of scan jobs.
//!
//! A snapshot references its job by guid inside the description text, not by
//! foreign key, so it can outlive the job row.

mod description;
mod store;

use chrono::{DateTime, Utc};

use crate::target::TargetRef;

pub use description::{
    ParsedSnapshotDescription, format_evm_snapshot_description, parse_evm_snapshot_description,
};
pub use store::{MemorySnapshotStore, SnapshotStore};

/// Name carried by every snapshot the fleet manages.
pub const EVM_SNAPSHOT_NAME: &str = "EvmSnapshot";

/// Snapshot artifact bound to a VM or template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: u64,
    pub target: TargetRef,
    pub name: String,
    pub description: String,
    pub created_on: DateTime<Utc>,
}

impl Snapshot {
    pub fn parsed_description(&self) -> ParsedSnapshotDescription {
        parse_evm_snapshot_description(&self.description)
    }
}
