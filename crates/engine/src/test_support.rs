// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test flow and wiring shared by engine tests and workspace specs.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::flow::{Flow, FlowDescriptor, FlowEnv, FlowError, FlowMessage, FlowObject, FlowRegistry};
use crate::{DispatchDeps, DispatcherConfig, HuntApi, HuntRegistry};
use hd_adapters::{result_row_path, FakeLaunchAdapter, FakeNotifyAdapter, FakeResultReader};
use hd_core::test_support::client;
use hd_core::{ClientId, Clock, FakeClock, FlowState, Hunt, HuntId, HuntInfo, QueueKind};
use hd_storage::{MemoryStore, Store, StoreExt};
use serde_json::{json, Value};
use std::sync::Arc;

// ── Test flow ───────────────────────────────────────────────────────────

pub const TEST_FLOW: &str = "TestFlow";

/// Flow driven entirely by message payloads:
///
/// - `{"results": n}` writes `n` result rows
/// - `{"done": true}` terminates
/// - `{"fail": "msg"}` returns [`FlowError::Failed`]
///
/// A start argument of `{"done": true}` terminates immediately.
#[derive(Default)]
pub struct TestFlow {
    messages: u64,
}

impl TestFlow {
    pub fn descriptor() -> FlowDescriptor {
        FlowDescriptor {
            name: TEST_FLOW,
            doc: "Scriptable flow for tests.",
            internal: false,
            constructor: || Box::new(TestFlow::default()),
        }
    }
}

impl Flow for TestFlow {
    fn start(&mut self, _env: &FlowEnv<'_>, object: &mut FlowObject, args: Value) -> Result<(), FlowError> {
        if args.get("done").and_then(Value::as_bool) == Some(true) {
            object.context.state = FlowState::Terminated;
        }
        Ok(())
    }

    fn load(&mut self, _env: &FlowEnv<'_>, object: &FlowObject) -> Result<(), FlowError> {
        self.messages = object
            .state
            .as_ref()
            .and_then(|s| s.get("messages"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(())
    }

    fn save(&mut self, _env: &FlowEnv<'_>, object: &mut FlowObject) -> Result<(), FlowError> {
        object.state = Some(json!({ "messages": self.messages }));
        Ok(())
    }

    fn process_message(
        &mut self,
        env: &FlowEnv<'_>,
        object: &mut FlowObject,
        message: &FlowMessage,
    ) -> Result<(), FlowError> {
        self.messages += 1;
        let payload = &message.payload;
        if let Some(reason) = payload.get("fail").and_then(Value::as_str) {
            return Err(FlowError::Failed(reason.to_string()));
        }
        if let Some(rows) = payload.get("results").and_then(Value::as_u64) {
            let client_id = &object.runner_args.client_id;
            for _ in 0..rows {
                let index = object.context.total_results;
                let path = result_row_path(client_id, &object.urn, index);
                env.store.set_object(&path, json!({ "row": index, "client": client_id }))?;
                object.context.total_results += 1;
            }
        }
        if payload.get("done").and_then(Value::as_bool) == Some(true) {
            object.context.state = FlowState::Terminated;
        }
        Ok(())
    }
}

/// Default registry plus [`TestFlow`].
pub fn test_flows() -> FlowRegistry {
    let mut flows = FlowRegistry::new();
    flows.register(TestFlow::descriptor());
    flows
}

// ── Wiring ──────────────────────────────────────────────────────────────

pub type TestDeps = DispatchDeps<FakeLaunchAdapter, FakeClock>;
pub type TestApi = HuntApi<FakeLaunchAdapter, FakeNotifyAdapter, FakeClock>;

/// Fakes and a memory store, shared by every handle built from it.
#[derive(Clone, Default)]
pub struct TestContext {
    pub store: MemoryStore,
    pub launcher: FakeLaunchAdapter,
    pub notifier: FakeNotifyAdapter,
    pub results: FakeResultReader,
    pub clock: FakeClock,
    pub config: DispatcherConfig,
    pub flows: FlowRegistry,
}

impl TestContext {
    pub fn new() -> Self {
        Self { flows: test_flows(), ..Self::default() }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn deps(&self) -> TestDeps {
        DispatchDeps::new(Arc::new(self.store.clone()), self.launcher.clone(), self.clock.clone())
            .with_config(self.config.clone())
    }

    pub fn registry(&self) -> HuntRegistry<FakeLaunchAdapter, FakeClock> {
        HuntRegistry::new(self.deps())
    }

    /// API over a fresh registry, reading results through [`FakeResultReader`].
    pub fn api(&self) -> TestApi {
        HuntApi::new(self.registry(), self.notifier.clone(), Arc::new(self.results.clone()))
    }

    pub fn flow_env(&self) -> FlowEnv<'_> {
        FlowEnv { store: &self.store, flows: &self.flows, now_micros: self.clock.epoch_micros() }
    }

    pub fn put_hunt(&self, hunt: &Hunt) {
        self.store.set_as(hunt.hunt_id.as_str(), hunt).expect("put hunt");
    }

    pub fn load_hunt(&self, hunt_id: &HuntId) -> Hunt {
        self.store.get_as(hunt_id.as_str()).expect("load hunt")
    }

    /// Enrol clients `1..=n` in `hunt`'s pending queue.
    pub fn enrol(&self, hunt: &Hunt, n: u64) -> Vec<ClientId> {
        (1..=n)
            .map(|i| {
                let info = HuntInfo::pending(hunt, client(i));
                self.put_info(QueueKind::Pending, &info);
                info.client_id
            })
            .collect()
    }

    pub fn put_info(&self, queue: QueueKind, info: &HuntInfo) {
        self.store.set_as(&info.path(queue), info).expect("put hunt info");
    }

    pub fn get_info(&self, hunt_id: &HuntId, queue: QueueKind, client_id: &ClientId) -> Option<HuntInfo> {
        self.store.get_as(&hunt_id.entry_path(queue, client_id)).ok()
    }

    /// Client ids currently in one of `hunt_id`'s queues.
    pub fn queue(&self, hunt_id: &HuntId, queue: QueueKind) -> Vec<String> {
        self.store
            .list_children(&hunt_id.queue_path(queue), 0, u64::MAX)
            .expect("list queue")
            .iter()
            .map(|p| hd_core::basename(p).to_string())
            .collect()
    }
}
