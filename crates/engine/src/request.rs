// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request shapes accepted by [`crate::HuntApi`].
//!
//! A `count` of zero means the configured default page size.

use hd_core::{HuntState, QueueKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListHuntsRequest {
    pub offset: u64,
    pub count: u64,
    /// Only hunts created strictly after this time (µs)
    pub created_after: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntModification {
    pub hunt_id: String,
    pub state: Option<HuntState>,
}

/// Which per-agent queue to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntClientsKind {
    #[default]
    Pending,
    Scheduled,
    Completed,
    Results,
}

impl HuntClientsKind {
    pub fn queue(self) -> QueueKind {
        match self {
            HuntClientsKind::Pending => QueueKind::Pending,
            HuntClientsKind::Scheduled => QueueKind::Running,
            HuntClientsKind::Completed => QueueKind::Completed,
            HuntClientsKind::Results => QueueKind::Results,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListHuntClientsRequest {
    pub hunt_id: String,
    pub kind: HuntClientsKind,
    pub offset: u64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetHuntResultsRequest {
    pub hunt_id: String,
    pub offset: u64,
    pub count: u64,
}

impl GetHuntResultsRequest {
    pub fn new(hunt_id: impl Into<String>) -> Self {
        Self { hunt_id: hunt_id.into(), ..Self::default() }
    }
}
