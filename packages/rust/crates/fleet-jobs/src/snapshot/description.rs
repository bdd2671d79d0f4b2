use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use uuid::Uuid;

static JOB_GUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)scan job:\s*([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})")
        .unwrap_or_else(|err| panic!("invalid JOB_GUID_REGEX: {err}"))
});

static SERVER_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Server Time:\s*(\S+)")
        .unwrap_or_else(|err| panic!("invalid SERVER_TIME_REGEX: {err}"))
});

/// Fields recovered from a managed snapshot description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedSnapshotDescription {
    pub job_guid: Option<Uuid>,
    /// `None` when the timestamp is missing or malformed: treat age as unbounded.
    pub created_at: Option<DateTime<Utc>>,
}

/// Description written on snapshots taken for a scan job.
pub fn format_evm_snapshot_description(
    job_guid: Uuid,
    build: &str,
    scan_type: Option<&str>,
    server_time: DateTime<Utc>,
) -> String {
    format!(
        "Snapshot for scan job: {job_guid}, EVM Server build: {build} {} Server Time: {}",
        scan_type.unwrap_or_default(),
        server_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Extract the owning job guid and creation time.
///
/// Never fails: unrecognized parts come back as `None`.
pub fn parse_evm_snapshot_description(description: &str) -> ParsedSnapshotDescription {
    let job_guid = JOB_GUID_REGEX
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Uuid::parse_str(m.as_str()).ok());
    let created_at = SERVER_TIME_REGEX
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| DateTime::parse_from_rfc3339(m.as_str()).ok())
        .map(|at| at.with_timezone(&Utc));
    ParsedSnapshotDescription {
        job_guid,
        created_at,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot_description.rs"]
mod tests;
