// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Hunt dispatch engine: the in-memory hunt mirror, per-hunt scheduling and
//! triage, the refreshing registry, the lifecycle API, and the delegate task
//! that runs on each agent.

pub mod api;
pub mod config;
mod deps;
pub mod dispatcher;
pub mod error;
pub mod flow;
pub mod registry;
pub mod report;
pub mod request;
pub mod scheduler;
pub mod triage;

#[cfg(any(test, feature = "test-support"))]
#[allow(clippy::expect_used)]
pub mod test_support;

pub use api::HuntApi;
pub use config::{ConfigError, DispatcherConfig};
pub use deps::DispatchDeps;
pub use dispatcher::Dispatcher;
pub use error::ApiError;
pub use flow::{
    resume_flow, start_flow, Flow, FlowDescriptor, FlowEnv, FlowError, FlowMessage, FlowObject,
    FlowRegistry, HuntRunnerFlow,
};
pub use registry::HuntRegistry;
pub use report::{HuntUpdate, PathFailure, ScheduleReport, TriageReport, UpdateReport};
pub use request::{
    GetHuntResultsRequest, HuntClientsKind, HuntModification, ListHuntClientsRequest,
    ListHuntsRequest,
};
pub use scheduler::schedule_clients;
pub use triage::sort_results;
