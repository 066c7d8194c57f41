// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery specs
//!
//! Promotion is at-least-once. A pending entry that survives its promotion
//! is dropped on the next pass without a second launch.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn surviving_pending_copy_is_not_relaunched() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.enrol(&h, 1);

    // Running copy written, pending delete lost
    ctx.store.fail(StoreOp::Delete, h.hunt_id.queue_path(QueueKind::Pending));
    ctx.clock.advance(secs(1));
    let report = refresh(&ctx).await;
    assert_eq!(report.failures().len(), 1);
    assert_eq!(placement(&ctx, &h.hunt_id)[&client(1).to_string()], vec![QueueKind::Pending, QueueKind::Running]);

    ctx.store.clear_faults();
    ctx.clock.advance(secs(5));
    let report = refresh(&ctx).await;

    let update = report.for_hunt(&h.hunt_id).unwrap();
    assert_eq!(update.schedule.skipped, 1);
    assert_eq!(update.schedule.scheduled, 0);
    assert_eq!(ctx.launcher.calls().len(), 1);
    assert_eq!(placement(&ctx, &h.hunt_id)[&client(1).to_string()], vec![QueueKind::Running]);
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 1);
}

#[tokio::test]
async fn failed_removal_is_triaged_again_next_refresh() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.put_info(QueueKind::Completed, &completed_info(&h, client(1), FlowState::Terminated, 1));
    ctx.put_info(QueueKind::Completed, &completed_info(&h, client(2), FlowState::Terminated, 0));

    ctx.store.fail(StoreOp::Delete, h.hunt_id.queue_path(QueueKind::Completed));
    let report = refresh(&ctx).await;
    assert!(report.for_hunt(&h.hunt_id).unwrap().triage.removal_failed());
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Completed).len(), 2);

    // Counters are never decremented, so the retry counts both records again
    ctx.store.clear_faults();
    refresh(&ctx).await;

    let counters = Counters::of(&ctx.load_hunt(&h.hunt_id));
    assert_eq!((counters.with_results, counters.without_results), (2, 2));
    assert!(ctx.queue(&h.hunt_id, QueueKind::Completed).is_empty());
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Results), vec![client(1).to_string()]);
}
