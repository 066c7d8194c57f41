// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hunt runner specs
//!
//! Launches travel over the channel adapter to a simulated agent, which runs
//! the hunt runner and its delegate. Outcomes are filed to `completed` only
//! once the delegate stops running, then triaged and read back as results.

use crate::prelude::*;
use hd_adapters::{BroadcastNotifyAdapter, ChannelLaunchAdapter, LaunchRequest, StoreResultReader};
use hd_core::FakeClock;
use hd_engine::{
    resume_flow, start_flow, DispatchDeps, FlowMessage, FlowObject, GetHuntResultsRequest, HuntApi,
    HuntRegistry,
};
use similar_asserts::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

type ChannelApi = HuntApi<ChannelLaunchAdapter, BroadcastNotifyAdapter, FakeClock>;

struct Fleet {
    ctx: TestContext,
    api: ChannelApi,
    launches: mpsc::Receiver<LaunchRequest>,
    notifier: BroadcastNotifyAdapter,
    /// Flow objects held by the simulated agents, by client id
    flows: BTreeMap<String, FlowObject>,
    requests: u64,
}

impl Fleet {
    fn new() -> Self {
        let ctx = TestContext::new();
        let (launcher, launches) = ChannelLaunchAdapter::new(16);
        let store: Arc<dyn Store> = Arc::new(ctx.store.clone());
        let deps = DispatchDeps::new(store.clone(), launcher, ctx.clock.clone());
        let notifier = BroadcastNotifyAdapter::new(4);
        let api = HuntApi::new(
            HuntRegistry::new(deps),
            notifier.clone(),
            Arc::new(StoreResultReader::new(store)),
        );
        Self { ctx, api, launches, notifier, flows: BTreeMap::new(), requests: 0 }
    }

    /// Accept every queued launch and start its flow.
    fn accept_launches(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(request) = self.launches.try_recv() {
            let object = start_flow(&self.ctx.flow_env(), &request).unwrap();
            self.flows.insert(request.client_id.to_string(), object);
            accepted += 1;
        }
        accepted
    }

    fn send(&mut self, n: u64, payload: serde_json::Value) -> Result<(), hd_engine::FlowError> {
        self.requests += 1;
        let message = FlowMessage::new(self.requests, payload);
        let env = self.ctx.flow_env();
        let object = self.flows.get_mut(&client(n).to_string()).unwrap();
        resume_flow(&env, object, &message)
    }
}

#[tokio::test]
async fn outcomes_flow_from_agents_to_hunt_results() {
    let mut fleet = Fleet::new();
    let mut wake = fleet.notifier.subscribe();

    let draft = Hunt {
        client_rate: 60,
        state: HuntState::Running,
        start_request: StartRequest::new(TEST_FLOW, json!({})),
        ..Hunt::default()
    };
    let id = fleet.api.create_hunt(draft).await.unwrap();
    assert!(wake.try_recv().is_ok());
    let h = fleet.ctx.load_hunt(&id);
    fleet.ctx.enrol(&h, 4);

    fleet.ctx.clock.advance(secs(3));
    fleet.api.registry().invalidate().await;
    assert_eq!(fleet.accept_launches(), 3);

    fleet.send(1, json!({ "results": 2 })).unwrap();
    fleet.send(3, json!({ "results": 1 })).unwrap();
    // Still running: nothing filed yet
    assert!(fleet.ctx.queue(&id, QueueKind::Completed).is_empty());

    fleet.send(1, json!({ "done": true })).unwrap();
    fleet.send(2, json!({ "done": true })).unwrap();
    assert!(fleet.send(3, json!({ "fail": "agent lost disk" })).is_err());
    assert_eq!(
        fleet.ctx.queue(&id, QueueKind::Completed),
        vec![client(1).to_string(), client(2).to_string(), client(3).to_string()]
    );

    fleet.api.registry().invalidate().await;

    let hunt = fleet.api.get_hunt(id.as_str()).await.unwrap();
    assert_eq!(
        Counters::of(&hunt),
        Counters { scheduled: 3, with_results: 1, without_results: 1, with_errors: 1 }
    );
    let error = fleet.ctx.get_info(&id, QueueKind::Errors, &client(3)).unwrap();
    assert_eq!(error.result.unwrap().backtrace.as_deref(), Some("agent lost disk"));

    let rows = fleet.api.get_hunt_results(GetHuntResultsRequest::new(id.as_str())).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["client"] == json!(client(1).to_string())));
    assert_eq!(rows[1]["row"], json!(1));
    fleet.api.registry().shutdown();
}

#[tokio::test]
async fn delegate_finishing_at_start_is_filed_without_messages() {
    let mut fleet = Fleet::new();
    let h = hunt(1, HuntState::Running, 60);
    let h = Hunt { start_request: StartRequest::new(TEST_FLOW, json!({ "done": true })), ..h };
    fleet.ctx.put_hunt(&h);
    fleet.ctx.enrol(&h, 1);

    fleet.ctx.clock.advance(secs(1));
    fleet.api.registry().invalidate().await;
    assert_eq!(fleet.accept_launches(), 1);

    let filed = fleet.ctx.get_info(&h.hunt_id, QueueKind::Completed, &client(1)).unwrap();
    assert_eq!(filed.result.unwrap().state, FlowState::Terminated);
    assert_eq!(filed.flow_id, Some(fleet.flows[&client(1).to_string()].urn.clone()));

    fleet.api.registry().invalidate().await;
    assert_eq!(fleet.ctx.queue(&h.hunt_id, QueueKind::NoResults), vec![client(1).to_string()]);
    fleet.api.registry().shutdown();
}
