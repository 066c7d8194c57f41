// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-hunt queue names.
//!
//! A queue is a path prefix under the hunt's id, not a stored entity:
//! `<hunt_id>/<queue>/<client_id>` holds one `HuntInfo` record.

use serde::{Deserialize, Serialize};

/// The queues a hunt's per-agent records move through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// Enrolled, waiting for the scheduler to launch
    Pending,
    /// Launched, delegate task in flight
    Running,
    /// Delegate finished, waiting for triage
    Completed,
    /// Triaged: at least one result row
    Results,
    /// Triaged: launch failure, delegate error, or unreadable record
    Errors,
    /// Triaged: finished cleanly with zero result rows
    NoResults,
}

impl QueueKind {
    pub const ALL: [QueueKind; 6] = [
        QueueKind::Pending,
        QueueKind::Running,
        QueueKind::Completed,
        QueueKind::Results,
        QueueKind::Errors,
        QueueKind::NoResults,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::Pending => "pending",
            QueueKind::Running => "running",
            QueueKind::Completed => "completed",
            QueueKind::Results => "results",
            QueueKind::Errors => "errors",
            QueueKind::NoResults => "no_results",
        }
    }

    /// True for the three queues triage files into.
    pub fn is_triaged(&self) -> bool {
        matches!(self, QueueKind::Results | QueueKind::Errors | QueueKind::NoResults)
    }
}

crate::simple_display! {
    QueueKind {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Results => "results",
        Errors => "errors",
        NoResults => "no_results",
    }
}

/// Last path component (everything after the final `/`).
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
