// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for the workspace specs.

pub use hd_core::test_support::{client, completed_info};
pub use hd_core::{Clock, FlowState, Hunt, HuntId, HuntInfo, HuntState, QueueKind, StartRequest};
pub use hd_engine::test_support::{TestContext, TEST_FLOW};
pub use hd_engine::{Dispatcher, HuntModification, UpdateReport};
pub use hd_storage::{Store, StoreOp};
pub use serde_json::json;
pub use std::time::Duration;

use std::collections::BTreeMap;
use std::future::Future;

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Hunt `n` created at the fake clock's start, launching [`TEST_FLOW`].
pub fn hunt(n: u64, state: HuntState, rate: u64) -> Hunt {
    Hunt::builder()
        .hunt_id(format!("aff4:/hunts/H.{n:016x}"))
        .state(state)
        .client_rate(rate)
        .start_request(StartRequest::new(TEST_FLOW, json!({})))
        .build()
}

/// One refresh cycle: rebuild the mirror and run every hunt's update.
pub async fn refresh(ctx: &TestContext) -> UpdateReport {
    Dispatcher::build(&ctx.deps()).await.expect("build mirror").1
}

/// Run an async test body on a fresh runtime (for proptest bodies).
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

/// The four per-hunt counters, in a comparable form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub scheduled: u64,
    pub with_results: u64,
    pub without_results: u64,
    pub with_errors: u64,
}

impl Counters {
    pub fn of(hunt: &Hunt) -> Self {
        Self {
            scheduled: hunt.total_clients_scheduled,
            with_results: hunt.total_clients_with_results,
            without_results: hunt.total_clients_without_results,
            with_errors: hunt.total_clients_with_errors,
        }
    }
}

/// Every queue each client currently sits in.
pub fn placement(ctx: &TestContext, hunt_id: &HuntId) -> BTreeMap<String, Vec<QueueKind>> {
    let mut placed: BTreeMap<String, Vec<QueueKind>> = BTreeMap::new();
    for queue in QueueKind::ALL {
        for client_id in ctx.queue(hunt_id, queue) {
            placed.entry(client_id).or_default().push(queue);
        }
    }
    placed
}
