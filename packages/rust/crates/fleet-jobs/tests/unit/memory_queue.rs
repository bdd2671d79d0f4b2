use std::sync::Arc;

use serde_json::json;

use super::MemoryWorkQueue;
use crate::clock::SystemClock;
use crate::queue::{EnqueueRequest, MessageFilter, MessageState, PutOutcome, WorkQueue};

fn queue() -> MemoryWorkQueue {
    MemoryWorkQueue::new(Arc::new(SystemClock))
}

fn removal(snapshot_id: u64, zone: &str) -> EnqueueRequest {
    EnqueueRequest::new("VmOrTemplate", Some(7), "remove_evm_snapshot", "ems_operations")
        .with_args(vec![json!(snapshot_id)])
        .with_zone(Some(zone.to_string()))
}

#[tokio::test]
async fn put_unless_exists_skips_live_duplicates() -> anyhow::Result<()> {
    let queue = queue();
    let request = removal(11, "east");
    let filter = request.live_filter().with_args(request.args.clone());

    let first = queue.put_unless_exists(request.clone(), &filter).await?;
    let second = queue.put_unless_exists(request, &filter).await?;

    assert!(first.is_enqueued());
    assert_eq!(second, PutOutcome::AlreadyQueued(first.message_id()));
    assert_eq!(queue.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn errored_messages_do_not_block_a_retry() -> anyhow::Result<()> {
    let queue = queue();
    let request = removal(11, "east");
    let filter = request.live_filter();

    let first = queue.put_unless_exists(request.clone(), &filter).await?;
    queue
        .set_state(first.message_id(), MessageState::Error)
        .await?;

    let retry = queue.put_unless_exists(request, &filter).await?;
    assert!(retry.is_enqueued());
    assert_eq!(queue.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn different_args_are_different_fingerprints() -> anyhow::Result<()> {
    let queue = queue();
    for snapshot_id in [1_u64, 2] {
        let request = removal(snapshot_id, "east");
        let filter = request.live_filter().with_args(request.args.clone());
        assert!(queue.put_unless_exists(request, &filter).await?.is_enqueued());
    }
    assert_eq!(queue.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn zoneless_messages_are_deliverable_in_any_zone() -> anyhow::Result<()> {
    let queue = queue();
    queue
        .enqueue(EnqueueRequest::new("Job", Some(1), "signal_abort", "smartstate"))
        .await?;
    queue
        .enqueue(
            EnqueueRequest::new("Job", Some(2), "signal_abort", "smartstate")
                .with_zone(Some("west".to_string())),
        )
        .await?;

    let claimed = queue
        .get("smartstate", Some("east"))
        .await?
        .expect("zone-less message is claimable from east");
    assert_eq!(claimed.instance_id, Some(1));
    assert_eq!(claimed.state, MessageState::Active);
    assert!(queue.get("smartstate", Some("east")).await?.is_none());

    let zone_less_lookup = MessageFilter::for_role("smartstate", None);
    assert!(queue.find_live(&zone_less_lookup).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn delivered_ok_removes_and_error_retains() -> anyhow::Result<()> {
    let queue = queue();
    let ok_id = queue
        .enqueue(EnqueueRequest::new("Job", Some(1), "signal", "smartstate"))
        .await?;
    let err_id = queue
        .enqueue(EnqueueRequest::new("Job", Some(2), "signal", "smartstate"))
        .await?;

    queue.delivered(ok_id, MessageState::Ok, None).await?;
    queue
        .delivered(err_id, MessageState::Error, Some("boom".to_string()))
        .await?;

    let remaining = queue.messages().await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].state, MessageState::Error);
    assert_eq!(remaining[0].delivered_message.as_deref(), Some("boom"));

    assert!(queue.delivered(err_id, MessageState::Pending, None).await.is_err());
    Ok(())
}
