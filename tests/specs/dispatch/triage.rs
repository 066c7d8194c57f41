// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Triage specs
//!
//! Completed records are filed by outcome and counted exactly once, and no
//! client is ever lost or duplicated on the way. Filing retires the running
//! entry, so a finished client may be enrolled again.

use crate::prelude::*;
use hd_adapters::LaunchRequest;
use hd_engine::{resume_flow, start_flow, FlowMessage, FlowObject};
use similar_asserts::assert_eq;
use std::collections::BTreeMap;

#[tokio::test]
async fn completed_records_are_classified_and_counted_once() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    let outcomes = [
        (FlowState::Terminated, 4),
        (FlowState::Terminated, 0),
        (FlowState::Error, 0),
        (FlowState::Terminated, 1),
        (FlowState::Error, 3),
    ];
    for (n, (state, rows)) in (1..).zip(outcomes) {
        ctx.put_info(QueueKind::Completed, &completed_info(&h, client(n), state, rows));
    }

    refresh(&ctx).await;
    refresh(&ctx).await;

    let counters = Counters::of(&ctx.load_hunt(&h.hunt_id));
    assert_eq!(
        counters,
        Counters { scheduled: 0, with_results: 2, without_results: 1, with_errors: 2 }
    );
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Results), vec![client(1).to_string(), client(4).to_string()]);
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::NoResults), vec![client(2).to_string()]);
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Errors), vec![client(3).to_string(), client(5).to_string()]);
    assert!(ctx.queue(&h.hunt_id, QueueKind::Completed).is_empty());
}

#[tokio::test]
async fn every_client_sits_in_exactly_one_queue() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    let enrolled = ctx.enrol(&h, 6);
    ctx.launcher.fail_client(client(2));

    ctx.clock.advance(secs(4));
    refresh(&ctx).await;

    let mut agents = accept_launches(&ctx);
    let accepted: Vec<String> = agents.flows.keys().cloned().collect();
    assert_eq!(accepted, vec![client(1).to_string(), client(3).to_string(), client(4).to_string()]);
    send(&ctx, &mut agents, 1, json!({ "results": 2 }));
    send(&ctx, &mut agents, 1, json!({ "done": true }));
    send(&ctx, &mut agents, 3, json!({ "done": true }));
    refresh(&ctx).await;

    let placed = placement(&ctx, &h.hunt_id);
    assert_eq!(placed.len(), enrolled.len());
    for (client_id, queues) in &placed {
        assert_eq!(queues.len(), 1, "{client_id} is in {queues:?}");
    }
    assert_eq!(placed[&client(1).to_string()], vec![QueueKind::Results]);
    assert_eq!(placed[&client(2).to_string()], vec![QueueKind::Errors]);
    assert_eq!(placed[&client(3).to_string()], vec![QueueKind::NoResults]);
    assert_eq!(placed[&client(4).to_string()], vec![QueueKind::Running]);
    // The failed launch left a slot in the deficit, filled on the second pass
    assert_eq!(placed[&client(5).to_string()], vec![QueueKind::Running]);
    assert_eq!(placed[&client(6).to_string()], vec![QueueKind::Pending]);

    let counters = Counters::of(&ctx.load_hunt(&h.hunt_id));
    assert_eq!(
        counters,
        Counters { scheduled: 4, with_results: 1, without_results: 1, with_errors: 1 }
    );
}

#[tokio::test]
async fn finished_client_can_be_enrolled_again() {
    let ctx = TestContext::new();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);
    ctx.enrol(&h, 1);

    ctx.clock.advance(secs(1));
    refresh(&ctx).await;
    let mut agents = accept_launches(&ctx);
    send(&ctx, &mut agents, 1, json!({ "done": true }));
    refresh(&ctx).await;
    assert_eq!(placement(&ctx, &h.hunt_id)[&client(1).to_string()], vec![QueueKind::NoResults]);

    // An operator puts the client back in line
    ctx.enrol(&h, 1);
    ctx.clock.advance(secs(1));
    let report = refresh(&ctx).await;

    let update = report.for_hunt(&h.hunt_id).unwrap();
    assert_eq!((update.schedule.scheduled, update.schedule.skipped), (1, 0));
    assert_eq!(ctx.launcher.launched_clients(), vec![client(1), client(1)]);
    assert_eq!(ctx.queue(&h.hunt_id, QueueKind::Running), vec![client(1).to_string()]);
    assert_eq!(Counters::of(&ctx.load_hunt(&h.hunt_id)).scheduled, 2);
}

/// Runners started on the simulated agents, keyed by client.
struct Agents {
    flows: BTreeMap<String, FlowObject>,
    requests: u64,
}

/// Start every runner launched so far, as the agents would.
fn accept_launches(ctx: &TestContext) -> Agents {
    let flows = ctx
        .launcher
        .calls()
        .into_iter()
        .filter_map(|call| {
            let request = LaunchRequest {
                client_id: call.client_id.clone(),
                flow_id: call.flow_id?,
                task_type: call.task_type,
                args: call.args,
            };
            Some((call.client_id.to_string(), start_flow(&ctx.flow_env(), &request).unwrap()))
        })
        .collect();
    Agents { flows, requests: 0 }
}

fn send(ctx: &TestContext, agents: &mut Agents, n: u64, payload: serde_json::Value) {
    agents.requests += 1;
    let message = FlowMessage::new(agents.requests, payload);
    let object = agents.flows.get_mut(&client(n).to_string()).unwrap();
    resume_flow(&ctx.flow_env(), object, &message).unwrap();
}
