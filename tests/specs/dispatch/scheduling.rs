// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling specs
//!
//! A running hunt's refresh launches exactly the elapsed-time deficit.

use crate::prelude::*;
use proptest::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn refresh_promotes_elapsed_deficit() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.enrol(&h, 5);

    ctx.clock.advance(secs(3));
    let report = refresh(&ctx).await;

    assert_eq!(report.total_scheduled(), 3);
    assert_eq!(ctx.launcher.launched_clients(), vec![client(1), client(2), client(3)]);
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Pending), vec![client(4).to_string(), client(5).to_string()]);
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Running).len(), 3);
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 3);

    // Same instant: nothing more is due
    let report = refresh(&ctx).await;
    assert_eq!(report.total_scheduled(), 0);

    ctx.clock.advance(secs(60));
    refresh(&ctx).await;
    assert!(ctx.queue(&h.hunt_id, QueueKind::Pending).is_empty());
    assert_eq!(ctx.launcher.calls().len(), 5);
}

#[tokio::test]
async fn every_launch_runs_the_hunt_runner() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.enrol(&h, 2);
    ctx.clock.advance(secs(2));

    refresh(&ctx).await;

    for call in ctx.launcher.calls() {
        assert_eq!(call.task_type, hd_core::HUNT_RUNNER_FLOW);
        let info: HuntInfo = serde_json::from_value(call.args).unwrap();
        assert_eq!(info.hunt_id, h.hunt_id);
        assert_eq!(info.client_id, call.client_id);
        assert_eq!(info.start_request.flow_name, TEST_FLOW);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scheduled_never_exceeds_rate_times_elapsed(
        rate in 1u64..=120,
        steps in proptest::collection::vec(0u64..40, 1..8),
    ) {
        let pool = 50;
        block_on(async {
            let ctx = TestContext::new();
            let h = hunt(1, HuntState::Running, rate);
            ctx.put_hunt(&h);
            ctx.enrol(&h, pool);

            let mut elapsed = 0;
            for step in steps {
                ctx.clock.advance(secs(step));
                elapsed += step;
                refresh(&ctx).await;

                let scheduled = ctx.load_hunt(&h.hunt_id).total_clients_scheduled;
                let allowed = rate * elapsed / 60;
                prop_assert!(scheduled <= allowed);
                prop_assert_eq!(scheduled, allowed.min(pool));
                prop_assert_eq!(ctx.launcher.calls().len() as u64, scheduled);
            }
            Ok(())
        })?;
    }
}
