#![allow(missing_docs)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use fleet_jobs::{
    Clock, EVM_SNAPSHOT_NAME, METHOD_REMOVE_EVM_SNAPSHOT, MessageState, ROLE_EMS_OPERATIONS,
    Snapshot, SnapshotStore, TargetKind, TargetLookup, TargetRef, TargetRegistry, WorkQueue,
    format_evm_snapshot_description,
};

use support::Harness;

const ONE_HOUR: Duration = Duration::from_secs(3_600);

async fn evm_snapshot(harness: &Harness, target: TargetRef, job_guid: Uuid) -> Snapshot {
    let now = harness.clock.now();
    let description = format_evm_snapshot_description(job_guid, "5.11.0.1", Some("Full"), now);
    harness
        .backends
        .snapshots
        .create(target, EVM_SNAPSHOT_NAME, &description, now)
        .await
}

#[tokio::test]
async fn orphaned_snapshot_is_queued_for_removal_after_the_grace_window() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, Some("zone-a")).await;
    let snapshot = evm_snapshot(&harness, vm, Uuid::new_v4()).await;

    let early = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(early.examined, 1);
    assert_eq!(early.within_grace, 1);
    assert_eq!(early.enqueued, 0);

    harness.clock.advance(ONE_HOUR + Duration::from_secs(60));
    let late = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(late.enqueued, 1);

    let removals = harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?;
    assert_eq!(removals.len(), 1);
    let message = &removals[0];
    assert_eq!(message.class_name, "VmOrTemplate");
    assert_eq!(message.instance_id, Some(vm.id));
    assert_eq!(message.args, vec![json!(snapshot.id)]);
    assert_eq!(message.role, ROLE_EMS_OPERATIONS);
    assert_eq!(message.zone.as_deref(), Some("zone-a"));

    let rerun = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!((rerun.enqueued, rerun.already_queued), (0, 1));
    assert_eq!(harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn delivered_removal_deletes_the_snapshot() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, Some("zone-a")).await;
    let snapshot = evm_snapshot(&harness, vm, Uuid::new_v4()).await;
    harness.clock.advance(ONE_HOUR * 2);
    harness.service.check_for_evm_snapshots(ONE_HOUR).await?;

    let reports = harness
        .worker()
        .drain(ROLE_EMS_OPERATIONS, Some("zone-a"), 10)
        .await?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].state, MessageState::Ok);
    assert!(harness.backends.snapshots.get(snapshot.id).await?.is_none());

    let after = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(after.examined, 0);
    assert!(harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn custom_delay_overrides_the_default_grace_window() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    evm_snapshot(&harness, vm, Uuid::new_v4()).await;
    harness.clock.advance(Duration::from_secs(11 * 60));

    let default_delay = harness
        .service
        .check_for_evm_snapshots(harness.service.config().job_not_found_delay)
        .await?;
    assert_eq!(default_delay.within_grace, 1);

    let short_delay = harness
        .service
        .check_for_evm_snapshots(Duration::from_secs(10 * 60))
        .await?;
    assert_eq!(short_delay.enqueued, 1);
    Ok(())
}

#[tokio::test]
async fn unparseable_descriptions_are_eligible_immediately() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    let now = harness.clock.now();
    harness
        .backends
        .snapshots
        .create(vm, EVM_SNAPSHOT_NAME, "Snapshot taken by hand", now)
        .await;
    let without_time = format!("Snapshot for scan job: {}, EVM Server build: 5.11", Uuid::new_v4());
    harness
        .backends
        .snapshots
        .create(vm, EVM_SNAPSHOT_NAME, &without_time, now)
        .await;

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.examined, 2);
    assert_eq!(sweep.within_grace, 0);
    assert_eq!(sweep.enqueued, 2);
    Ok(())
}

#[tokio::test]
async fn snapshot_of_a_running_job_is_kept() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR * 24);
    let vm = harness.add_vm(4, None).await;
    let job = harness.create_scan_job(Some(vm), None).await?;
    harness.activate(job.id).await?;
    evm_snapshot(&harness, vm, job.guid).await;
    harness.clock.advance(ONE_HOUR * 3);

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.kept_active, 1);
    assert_eq!(sweep.enqueued, 0);
    assert!(harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn snapshot_of_a_finished_job_is_removed_once_past_the_grace_window() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    let job = harness.create_scan_job(Some(vm), None).await?;
    harness.activate(job.id).await?;
    evm_snapshot(&harness, vm, job.guid).await;
    harness.finish(job.id).await?;

    let fresh = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(fresh.within_grace, 1);

    harness.clock.advance(ONE_HOUR * 2);
    let stale = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(stale.enqueued, 1);
    Ok(())
}

#[tokio::test]
async fn snapshots_in_different_zones_route_independently() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let east = harness.add_vm(1, Some("east")).await;
    let west = harness.add_vm(2, Some("west")).await;
    let east_snapshot = evm_snapshot(&harness, east, Uuid::new_v4()).await;
    let west_snapshot = evm_snapshot(&harness, west, Uuid::new_v4()).await;
    harness.clock.advance(ONE_HOUR * 2);

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.enqueued, 2);

    let removals = harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?;
    let zone_of = |snapshot_id: u64| {
        removals
            .iter()
            .find(|message| message.args == vec![json!(snapshot_id)])
            .and_then(|message| message.zone.clone())
    };
    assert_eq!(zone_of(east_snapshot.id).as_deref(), Some("east"));
    assert_eq!(zone_of(west_snapshot.id).as_deref(), Some("west"));

    let reports = harness
        .worker()
        .drain(ROLE_EMS_OPERATIONS, Some("east"), 10)
        .await?;
    assert_eq!(reports.len(), 1);
    assert!(harness.backends.snapshots.get(east_snapshot.id).await?.is_none());
    assert!(harness.backends.snapshots.get(west_snapshot.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn snapshot_without_a_target_entity_is_skipped() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    evm_snapshot(&harness, vm, Uuid::new_v4()).await;
    harness.backends.inventory.remove(&vm).await;
    harness.clock.advance(ONE_HOUR * 2);

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.target_missing, 1);
    assert_eq!(sweep.failed, 0);
    assert!(harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn resolved_removal_allows_a_fresh_request_for_a_surviving_snapshot() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    evm_snapshot(&harness, vm, Uuid::new_v4()).await;
    harness.clock.advance(ONE_HOUR * 2);
    harness.service.check_for_evm_snapshots(ONE_HOUR).await?;

    let queue = &harness.backends.queue;
    let claimed = queue
        .get(ROLE_EMS_OPERATIONS, None)
        .await?
        .ok_or_else(|| anyhow::anyhow!("removal message missing"))?;
    queue.delivered(claimed.id, MessageState::Ok, None).await?;

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.enqueued, 1);
    Ok(())
}

#[tokio::test]
async fn snapshots_with_other_names_are_ignored() -> anyhow::Result<()> {
    let harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, None).await;
    let now = harness.clock.now();
    harness
        .backends
        .snapshots
        .create(vm, "nightly-backup", "user snapshot", now)
        .await;
    harness.clock.advance(ONE_HOUR * 2);

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.examined, 0);
    Ok(())
}

#[tokio::test]
async fn failing_candidate_does_not_stop_the_snapshot_sweep() -> anyhow::Result<()> {
    let mut harness = Harness::with_timeout(ONE_HOUR);
    let vm = harness.add_vm(4, Some("zone-a")).await;
    let image = harness
        .backends
        .inventory
        .add(TargetKind::ContainerImage, 7, "nginx:latest", Some("zone-a"))
        .await;
    let healthy = evm_snapshot(&harness, vm, Uuid::new_v4()).await;
    evm_snapshot(&harness, image, Uuid::new_v4()).await;
    harness.clock.advance(ONE_HOUR * 2);

    let vms_only: Arc<dyn TargetLookup> = harness.backends.inventory.clone();
    harness.rewire(|backends| {
        backends.targets = TargetRegistry::new().with_lookup(TargetKind::VmOrTemplate, vms_only);
    });

    let sweep = harness.service.check_for_evm_snapshots(ONE_HOUR).await?;
    assert_eq!(sweep.examined, 2);
    assert_eq!(sweep.failed, 1);
    assert_eq!(sweep.enqueued, 1);

    let removals = harness.messages_for(METHOD_REMOVE_EVM_SNAPSHOT).await?;
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].instance_id, Some(vm.id));
    assert_eq!(removals[0].args, vec![json!(healthy.id)]);
    Ok(())
}
