// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent hunt assignment and the task outcome embedded in it.

use crate::hunt::{Hunt, HuntId, StartRequest};
use crate::id::{ClientId, FlowId};
use crate::queue::QueueKind;
use serde::{Deserialize, Serialize};

/// Where one agent stands in a hunt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HuntInfoState {
    #[default]
    Unset,
    Pending,
    Scheduled,
    Completed,
    Error,
}

crate::simple_display! {
    HuntInfoState {
        Unset => "unset",
        Pending => "pending",
        Scheduled => "scheduled",
        Completed => "completed",
        Error => "error",
    }
}

/// Lifecycle of a task instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    #[default]
    Running,
    Terminated,
    Error,
}

crate::simple_display! {
    FlowState {
        Running => "running",
        Terminated => "terminated",
        Error => "error",
    }
}

/// Outcome record of a task instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowContext {
    #[serde(default)]
    pub create_time: u64,
    #[serde(default)]
    pub state: FlowState,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

impl FlowContext {
    pub fn running(create_time: u64) -> Self {
        Self { create_time, ..Self::default() }
    }

    pub fn error(create_time: u64, backtrace: impl Into<String>) -> Self {
        Self {
            create_time,
            state: FlowState::Error,
            backtrace: Some(backtrace.into()),
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == FlowState::Running
    }

    /// Move a still-running context into the error state.
    pub fn fail(&mut self, backtrace: impl Into<String>) {
        self.state = FlowState::Error;
        self.backtrace = Some(backtrace.into());
    }
}

/// One agent's record in a hunt, filed under `<hunt>/<queue>/<client>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntInfo {
    pub client_id: ClientId,
    pub hunt_id: HuntId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<FlowId>,
    #[serde(default)]
    pub start_request: StartRequest,
    #[serde(default)]
    pub state: HuntInfoState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FlowContext>,
}

impl HuntInfo {
    /// Enrol `client_id` in `hunt`, copying its start request.
    pub fn pending(hunt: &Hunt, client_id: ClientId) -> Self {
        Self {
            client_id,
            hunt_id: hunt.hunt_id.clone(),
            flow_id: None,
            start_request: hunt.start_request.clone(),
            state: HuntInfoState::Pending,
            result: None,
        }
    }

    /// Path of this record in `queue`.
    pub fn path(&self, queue: QueueKind) -> String {
        self.hunt_id.entry_path(queue, &self.client_id)
    }

    /// Number of result rows the delegate produced, zero when unknown.
    pub fn total_results(&self) -> u64 {
        self.result.as_ref().map_or(0, |r| r.total_results)
    }

    /// Which triage queue a completed record belongs in.
    ///
    /// Missing or errored outcomes are errors; otherwise the result count
    /// decides between `results` and `no_results`.
    pub fn outcome_queue(&self) -> QueueKind {
        match &self.result {
            None => QueueKind::Errors,
            Some(result) if result.state == FlowState::Error => QueueKind::Errors,
            Some(result) if result.total_results > 0 => QueueKind::Results,
            Some(_) => QueueKind::NoResults,
        }
    }
}

#[cfg(test)]
#[path = "hunt_info_tests.rs"]
mod tests;
