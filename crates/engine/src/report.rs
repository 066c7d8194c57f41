// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What one scheduling or triage pass did, and what it failed to do.

use hd_core::{HuntId, QueueKind};
use hd_storage::{StoreError, StoreOp};

/// A store operation that failed on one path and was not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFailure {
    pub path: String,
    pub op: StoreOp,
    pub error: String,
}

impl PathFailure {
    pub fn new(path: impl Into<String>, op: StoreOp, error: &StoreError) -> Self {
        Self { path: path.into(), op, error: error.to_string() }
    }
}

impl std::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.op, self.path, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Deficit computed from the rate
    pub due: u64,
    /// Entries taken from `pending`
    pub pulled: u64,
    /// Launched and filed under `running`
    pub scheduled: u64,
    /// Launch failed, filed under `errors`
    pub errored: u64,
    /// Unreadable, or already running
    pub skipped: u64,
    pub failures: Vec<PathFailure>,
}

impl ScheduleReport {
    /// True when hunt counters changed.
    pub fn modified(&self) -> bool {
        self.scheduled + self.errored > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageReport {
    pub processed: u64,
    pub results: u64,
    pub errors: u64,
    pub no_results: u64,
    pub failures: Vec<PathFailure>,
}

impl TriageReport {
    pub fn modified(&self) -> bool {
        self.processed > 0
    }

    /// True when some entry could not be removed from `completed`.
    ///
    /// A stale `running` entry that survives is not a removal failure; the
    /// next batch would not see it again.
    pub fn removal_failed(&self) -> bool {
        self.failures.iter().any(|f| {
            f.op == StoreOp::Delete && f.path.rsplit('/').nth(1) == Some(QueueKind::Completed.as_str())
        })
    }

    /// Fold a later batch into this one.
    pub fn absorb(&mut self, batch: TriageReport) {
        self.processed += batch.processed;
        self.results += batch.results;
        self.errors += batch.errors;
        self.no_results += batch.no_results;
        self.failures.extend(batch.failures);
    }
}

/// Outcome of updating one running hunt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntUpdate {
    pub hunt_id: HuntId,
    pub schedule: ScheduleReport,
    pub triage: TriageReport,
    /// Hunt object written back with new counters
    pub persisted: bool,
    /// Failure writing the hunt object, if any
    pub persist_failure: Option<PathFailure>,
}

impl HuntUpdate {
    pub fn failures(&self) -> impl Iterator<Item = &PathFailure> {
        self.schedule.failures.iter().chain(&self.triage.failures).chain(&self.persist_failure)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub hunts: Vec<HuntUpdate>,
}

impl UpdateReport {
    pub fn for_hunt(&self, hunt_id: &HuntId) -> Option<&HuntUpdate> {
        self.hunts.iter().find(|u| &u.hunt_id == hunt_id)
    }

    pub fn total_scheduled(&self) -> u64 {
        self.hunts.iter().map(|u| u.schedule.scheduled).sum()
    }

    pub fn total_triaged(&self) -> u64 {
        self.hunts.iter().map(|u| u.triage.processed).sum()
    }

    pub fn failures(&self) -> Vec<&PathFailure> {
        self.hunts.iter().flat_map(HuntUpdate::failures).collect()
    }
}
