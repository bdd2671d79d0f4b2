use chrono::Utc;

use super::{TaskPatch, capitalize};
use crate::job::{JobOptions, JobRecord, JobStatus};

#[test]
fn capitalize_matches_title_case_of_first_word() {
    assert_eq!(capitalize("waiting_to_start"), "Waiting_to_start");
    assert_eq!(
        capitalize("any status to trigger state update"),
        "Any status to trigger state update"
    );
    assert_eq!(capitalize("ERROR"), "Error");
    assert_eq!(capitalize(""), "");
}

#[test]
fn attributes_for_task_capitalizes_state_and_status() {
    let mut job = JobRecord::new("VmScan", JobOptions::named("Hello, World!"), Utc::now());
    job.context = Some("ctx".to_string());
    job.zone = Some("east".to_string());

    let attrs = job.attributes_for_task();
    assert_eq!(attrs.name, "Hello, World!");
    assert_eq!(attrs.state, "Waiting_to_start");
    assert_eq!(attrs.status, "Ok");
    assert_eq!(attrs.message, "process initiated");
    assert_eq!(attrs.context_data.as_deref(), Some("ctx"));
    assert_eq!(attrs.zone.as_deref(), Some("east"));
    assert_eq!(attrs.started_on, None);
}

#[test]
fn diff_only_carries_changed_fields() {
    let job = JobRecord::new("VmScan", JobOptions::named("diff"), Utc::now());
    let mut updated = job.clone();
    updated.status = JobStatus::Error;
    updated.zone = None;

    let patch = TaskPatch::diff(&job.attributes_for_task(), &updated.attributes_for_task());
    assert_eq!(patch.status.as_deref(), Some("Error"));
    assert_eq!(patch.field_names(), vec!["status"]);

    let same = TaskPatch::diff(&job.attributes_for_task(), &job.attributes_for_task());
    assert!(same.is_empty());
}
