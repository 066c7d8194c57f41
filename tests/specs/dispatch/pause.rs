// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pause / unpause specs
//!
//! Inactive hunts cost no store writes, and unpausing restarts the rate
//! window instead of scheduling the paused interval in a burst.

use crate::prelude::*;
use similar_asserts::assert_eq;

async fn set_state(api: &hd_engine::test_support::TestApi, id: &HuntId, state: HuntState) {
    api.modify_hunt(HuntModification { hunt_id: id.to_string(), state: Some(state) })
        .await
        .unwrap();
}

#[tokio::test]
async fn unpause_does_not_burst() {
    let ctx = TestContext::new();
    let api = ctx.api();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.enrol(&h, 20);

    ctx.clock.advance(secs(5));
    refresh(&ctx).await;
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 5);

    set_state(&api, &h.hunt_id, HuntState::Paused).await;
    ctx.clock.advance(secs(100));
    refresh(&ctx).await;
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 5);

    set_state(&api, &h.hunt_id, HuntState::Running).await;
    let resumed = ctx.load_hunt(&h.hunt_id);
    assert_eq!(resumed.last_unpause_time, ctx.clock.epoch_micros());
    assert_eq!(resumed.total_clients_when_unpaused, 5);
    refresh(&ctx).await;
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 5);

    ctx.clock.advance(secs(2));
    refresh(&ctx).await;
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 7);
    assert_eq!(ctx.launcher.calls().len(), 7);
    api.registry().shutdown();
}

#[tokio::test]
async fn inactive_hunts_cost_no_writes() {
    let ctx = TestContext::new();
    let states = [HuntState::Paused, HuntState::Stopped, HuntState::Archived];
    for (n, state) in (1..).zip(states) {
        let h = hunt(n, state, 60);
        ctx.put_hunt(&h);
        ctx.enrol(&h, 3);
        ctx.put_info(QueueKind::Completed, &completed_info(&h, client(9), FlowState::Terminated, 2));
    }
    ctx.clock.advance(secs(600));
    ctx.store.reset_stats();

    let report = refresh(&ctx).await;

    assert!(report.hunts.is_empty());
    assert_eq!(ctx.store.stats().writes(), 0);
    assert!(ctx.launcher.calls().is_empty());
}
