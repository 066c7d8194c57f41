// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hunt definition, identifier, and the rate arithmetic that drives scheduling.

use crate::id::ClientId;
use crate::queue::{basename, QueueKind};
use crate::MICROS_PER_SEC;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Store path under which every hunt object lives.
pub const HUNTS_ROOT: &str = "aff4:/hunts";

/// Every valid hunt id starts with this.
pub const HUNT_ID_PREFIX: &str = "aff4:/hunts/H.";

/// Agents per minute when a hunt leaves `client_rate` at zero.
pub const DEFAULT_CLIENT_RATE: u64 = 20;

/// Task type the scheduler launches on every enrolled agent.
pub const HUNT_RUNNER_FLOW: &str = "HuntRunnerFlow";

/// Legacy task types whose collected artifacts `get_hunt` can derive.
pub const ARTIFACT_COLLECTOR_FLOW: &str = "ArtifactCollector";
pub const FILE_FINDER_FLOW: &str = "FileFinder";
pub const FILE_FINDER_ARTIFACT: &str = "Generic.Forensic.FileFinder";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hunt id: {0:?}")]
pub struct InvalidHuntId(pub String);

/// Globally unique hunt identifier, `aff4:/hunts/H.<16 hex>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HuntId(String);

impl HuntId {
    /// Allocate a new id from 8 bytes of OS randomness.
    ///
    /// Collisions are not checked; at 64 bits they are not a practical concern.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self(format!("{}{}", HUNT_ID_PREFIX, hex::encode(bytes)))
    }

    /// Wrap an id without validation (store paths, deserialized records).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate that `id` lives in the hunt namespace.
    pub fn parse(id: &str) -> Result<Self, InvalidHuntId> {
        if id.starts_with(HUNT_ID_PREFIX) {
            Ok(Self(id.to_string()))
        } else {
            Err(InvalidHuntId(id.to_string()))
        }
    }

    /// Like [`HuntId::parse`], but also accepts the bare `H.<hex>` basename.
    pub fn resolve(id: &str) -> Result<Self, InvalidHuntId> {
        match id.strip_prefix("H.") {
            Some(rest) if !rest.is_empty() && !rest.contains('/') => {
                Ok(Self(format!("{HUNT_ID_PREFIX}{rest}")))
            }
            _ => Self::parse(id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `H.<hex>` component.
    pub fn basename(&self) -> &str {
        basename(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `<hunt>/<queue>`, the prefix listed to page through a queue.
    pub fn queue_path(&self, queue: QueueKind) -> String {
        format!("{}/{}", self.0, queue.as_str())
    }

    /// `<hunt>/<queue>/<client>`, where one agent's record sits.
    pub fn entry_path(&self, queue: QueueKind, client_id: &ClientId) -> String {
        format!("{}/{}/{}", self.0, queue.as_str(), client_id)
    }
}

impl fmt::Display for HuntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HuntId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for HuntId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

/// Hunt lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HuntState {
    #[default]
    Unset,
    Paused,
    Running,
    Stopped,
    Archived,
}

crate::simple_display! {
    HuntState {
        Unset => "unset",
        Paused => "paused",
        Running => "running",
        Stopped => "stopped",
        Archived => "archived",
    }
}

/// Which task to run on each agent, and with what arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub flow_name: String,
    #[serde(default, skip_serializing_if = "ClientId::is_empty")]
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,
    #[serde(default)]
    pub args: Value,
}

impl StartRequest {
    pub fn new(flow_name: impl Into<String>, args: Value) -> Self {
        Self { flow_name: flow_name.into(), args, ..Self::default() }
    }
}

/// A fleet-wide task definition.
///
/// Timestamps are microseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hunt {
    pub hunt_id: HuntId,
    #[serde(default)]
    pub hunt_description: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub create_time: u64,
    #[serde(default)]
    pub expires: u64,
    #[serde(default)]
    pub state: HuntState,
    /// Agents per minute; zero means [`DEFAULT_CLIENT_RATE`]
    #[serde(default)]
    pub client_rate: u64,
    #[serde(default)]
    pub last_unpause_time: u64,
    #[serde(default)]
    pub total_clients_when_unpaused: u64,
    #[serde(default)]
    pub total_clients_scheduled: u64,
    #[serde(default)]
    pub total_clients_with_results: u64,
    #[serde(default)]
    pub total_clients_with_errors: u64,
    #[serde(default)]
    pub total_clients_without_results: u64,
    #[serde(default)]
    pub start_request: StartRequest,
    /// Display-only, filled in by `get_hunt`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,
}

impl Hunt {
    pub fn is_running(&self) -> bool {
        self.state == HuntState::Running
    }

    pub fn effective_client_rate(&self, default_rate: u64) -> u64 {
        if self.client_rate == 0 {
            default_rate
        } else {
            self.client_rate
        }
    }

    /// Start of the current rate window: last unpause, or creation.
    pub fn unpause_baseline(&self) -> u64 {
        if self.last_unpause_time == 0 {
            self.create_time
        } else {
            self.last_unpause_time
        }
    }

    /// How many agents should have been enrolled by `now_micros`.
    pub fn expected_clients(&self, now_micros: u64, default_rate: u64) -> u64 {
        let rate = self.effective_client_rate(default_rate);
        let seconds = now_micros.saturating_sub(self.unpause_baseline()) / MICROS_PER_SEC;
        rate.saturating_mul(seconds) / 60 + self.total_clients_when_unpaused
    }

    /// Deficit between [`Hunt::expected_clients`] and what was scheduled.
    pub fn clients_due(&self, now_micros: u64, default_rate: u64) -> u64 {
        self.expected_clients(now_micros, default_rate).saturating_sub(self.total_clients_scheduled)
    }

    /// Apply a requested state change. Returns false when nothing was requested.
    ///
    /// Unpausing restarts the rate window so the paused interval is not
    /// scheduled in one burst.
    pub fn apply_state_change(&mut self, state: HuntState, now_micros: u64) -> bool {
        if state == HuntState::Unset {
            return false;
        }
        let previous = self.state;
        self.state = state;
        if previous == HuntState::Paused && state == HuntState::Running {
            self.last_unpause_time = now_micros;
            self.total_clients_when_unpaused = self.total_clients_scheduled;
        }
        true
    }

    /// Artifacts this hunt collects, derived from the legacy start request shapes.
    pub fn collected_artifacts(&self) -> Vec<String> {
        match self.start_request.flow_name.as_str() {
            ARTIFACT_COLLECTOR_FLOW => self
                .start_request
                .args
                .pointer("/artifacts/names")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_else(|| self.artifacts.clone()),
            FILE_FINDER_FLOW => vec![FILE_FINDER_ARTIFACT.to_string()],
            _ => self.artifacts.clone(),
        }
    }
}

crate::builder! {
    pub struct HuntBuilder => Hunt {
        into {
            hunt_id: HuntId = "aff4:/hunts/H.0000000000000001",
            hunt_description: String = "",
            creator: String = "tester",
        }
        set {
            create_time: u64 = crate::FakeClock::START_MICROS,
            expires: u64 = 0,
            state: HuntState = HuntState::Running,
            client_rate: u64 = 0,
            last_unpause_time: u64 = 0,
            total_clients_when_unpaused: u64 = 0,
            total_clients_scheduled: u64 = 0,
            total_clients_with_results: u64 = 0,
            total_clients_with_errors: u64 = 0,
            total_clients_without_results: u64 = 0,
            start_request: StartRequest = StartRequest::new("TestFlow", Value::Null),
        }
        computed {
            artifacts: Vec<String> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "hunt_tests.rs"]
mod tests;
