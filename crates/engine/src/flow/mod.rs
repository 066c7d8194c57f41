// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task ("flow") execution on the agent side of a launch.
//!
//! A flow is created by name from a closed [`FlowRegistry`], started with
//! JSON arguments, and then driven by messages. Between messages it lives
//! only as a [`FlowObject`]: the flow saves whatever it needs into
//! `FlowObject::state` and loads it back before the next message.

mod hunt_runner;

pub use hunt_runner::HuntRunnerFlow;

use hd_adapters::LaunchRequest;
use hd_core::{FlowContext, FlowId, StartRequest, HUNT_RUNNER_FLOW};
use hd_storage::{Store, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from flow execution
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("unknown flow: {0}")]
    UnknownFlow(String),
    #[error("invalid flow arguments: {0}")]
    InvalidArgs(String),
    #[error("invalid flow state: {0}")]
    InvalidState(String),
    #[error("flow was never started")]
    NotStarted,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Failed(String),
}

/// Persistent form of one task instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowObject {
    pub urn: FlowId,
    pub runner_args: StartRequest,
    pub context: FlowContext,
    /// Flow-private state written by `save`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl FlowObject {
    pub fn new(urn: FlowId, runner_args: StartRequest, now_micros: u64) -> Self {
        Self { urn, runner_args, context: FlowContext::running(now_micros), state: None }
    }

    /// The object an agent creates when a launch request arrives.
    pub fn from_launch(request: &LaunchRequest, now_micros: u64) -> Self {
        let runner_args = StartRequest {
            flow_name: request.task_type.clone(),
            client_id: request.client_id.clone(),
            creator: String::new(),
            args: request.args.clone(),
        };
        Self::new(request.flow_id.clone(), runner_args, now_micros)
    }
}

/// One message delivered to a running flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMessage {
    pub request_id: u64,
    #[serde(default)]
    pub payload: Value,
}

impl FlowMessage {
    pub fn new(request_id: u64, payload: Value) -> Self {
        Self { request_id, payload }
    }
}

/// What a flow can reach while it runs.
#[derive(Clone, Copy)]
pub struct FlowEnv<'a> {
    pub store: &'a dyn Store,
    pub flows: &'a FlowRegistry,
    pub now_micros: u64,
}

pub trait Flow: Send {
    /// Begin the task. Flows that finish immediately leave their context
    /// out of the RUNNING state.
    fn start(&mut self, env: &FlowEnv<'_>, object: &mut FlowObject, args: Value)
        -> Result<(), FlowError>;

    /// Restore in-memory state from `object.state`.
    fn load(&mut self, env: &FlowEnv<'_>, object: &FlowObject) -> Result<(), FlowError>;

    /// Write in-memory state into `object.state`.
    fn save(&mut self, env: &FlowEnv<'_>, object: &mut FlowObject) -> Result<(), FlowError>;

    fn process_message(
        &mut self,
        env: &FlowEnv<'_>,
        object: &mut FlowObject,
        message: &FlowMessage,
    ) -> Result<(), FlowError>;
}

/// A registered flow type.
#[derive(Debug, Clone, Copy)]
pub struct FlowDescriptor {
    pub name: &'static str,
    pub doc: &'static str,
    /// Internal flows are launched by the dispatcher, never by users
    pub internal: bool,
    pub constructor: fn() -> Box<dyn Flow>,
}

/// Closed table of flow types by name.
#[derive(Debug, Clone)]
pub struct FlowRegistry {
    flows: BTreeMap<&'static str, FlowDescriptor>,
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowRegistry {
    /// A registry holding the hunt runner.
    pub fn new() -> Self {
        let mut registry = Self { flows: BTreeMap::new() };
        registry.register(FlowDescriptor {
            name: HUNT_RUNNER_FLOW,
            doc: "Runs a hunt's requested flow on one client and files the outcome.",
            internal: true,
            constructor: || Box::new(HuntRunnerFlow::default()),
        });
        registry
    }

    /// Add or replace a flow type.
    pub fn register(&mut self, descriptor: FlowDescriptor) {
        self.flows.insert(descriptor.name, descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&FlowDescriptor> {
        self.flows.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flows.keys().copied()
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Flow>, FlowError> {
        self.get(name)
            .map(|d| (d.constructor)())
            .ok_or_else(|| FlowError::UnknownFlow(name.to_string()))
    }
}

/// Create and start the flow a launch request names, returning its saved object.
pub fn start_flow(env: &FlowEnv<'_>, request: &LaunchRequest) -> Result<FlowObject, FlowError> {
    let mut flow = env.flows.create(&request.task_type)?;
    let mut object = FlowObject::from_launch(request, env.now_micros);
    flow.start(env, &mut object, request.args.clone())?;
    flow.save(env, &mut object)?;
    Ok(object)
}

/// Load `object`'s flow, deliver `message`, and save it back.
///
/// State is saved even when the flow returns an error, and that error is
/// returned unchanged.
pub fn resume_flow(
    env: &FlowEnv<'_>,
    object: &mut FlowObject,
    message: &FlowMessage,
) -> Result<(), FlowError> {
    let mut flow = env.flows.create(&object.runner_args.flow_name)?;
    flow.load(env, object)?;
    let result = flow.process_message(env, object, message);
    flow.save(env, object)?;
    result
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
