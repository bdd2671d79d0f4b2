use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::{format_evm_snapshot_description, parse_evm_snapshot_description};

#[test]
fn parses_guid_and_server_time() {
    let guid = Uuid::new_v4();
    let at = Utc
        .with_ymd_and_hms(2016, 5, 4, 10, 30, 0)
        .single()
        .expect("valid time");
    let description = format_evm_snapshot_description(guid, "12345", None, at);

    let parsed = parse_evm_snapshot_description(&description);
    assert_eq!(parsed.job_guid, Some(guid));
    assert_eq!(parsed.created_at, Some(at));
}

#[test]
fn accepts_offset_timestamps() {
    let guid = Uuid::new_v4();
    let description = format!(
        "Snapshot for scan job: {guid}, EVM Server build: 5.0 full Server Time: 2016-05-04T12:30:00+02:00"
    );
    let parsed = parse_evm_snapshot_description(&description);
    let expected = Utc
        .with_ymd_and_hms(2016, 5, 4, 10, 30, 0)
        .single()
        .expect("valid time");
    assert_eq!(parsed.created_at, Some(expected));
}

#[test]
fn unparseable_description_yields_nothing() {
    let parsed = parse_evm_snapshot_description("Foo");
    assert_eq!(parsed.job_guid, None);
    assert_eq!(parsed.created_at, None);
}

#[test]
fn malformed_timestamp_keeps_guid() {
    let guid = Uuid::new_v4();
    let parsed = parse_evm_snapshot_description(&format!(
        "Snapshot for scan job: {guid}, EVM Server build: 1 Server Time: yesterday"
    ));
    assert_eq!(parsed.job_guid, Some(guid));
    assert_eq!(parsed.created_at, None);
}
