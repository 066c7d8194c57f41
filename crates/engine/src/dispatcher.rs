// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory mirror of the hunt table.
//!
//! A [`Dispatcher`] is built wholesale from the store, updated once (which
//! schedules and triages every running hunt), and then published read-only.
//! It is never mutated after publication; the registry replaces it instead.

use crate::report::{HuntUpdate, PathFailure, TriageReport, UpdateReport};
use crate::scheduler::schedule_clients;
use crate::triage::sort_results;
use crate::DispatchDeps;
use hd_adapters::LaunchAdapter;
use hd_core::{Clock, Hunt, HuntId, HUNTS_ROOT};
use hd_storage::{StoreError, StoreExt, StoreOp};

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    hunts: Vec<Hunt>,
    built_at: u64,
}

impl Dispatcher {
    /// A mirror with no hunts, published when a build fails.
    pub fn empty(built_at: u64) -> Self {
        Self { hunts: Vec::new(), built_at }
    }

    /// Load every hunt from the store, then run [`Dispatcher::update`].
    ///
    /// Only the first `hunt_page_size` hunts are loaded. A hunt that fails
    /// to load is logged and left out; a failed listing fails the build.
    pub async fn build<L, C>(deps: &DispatchDeps<L, C>) -> Result<(Self, UpdateReport), StoreError>
    where
        L: LaunchAdapter,
        C: Clock,
    {
        let page = deps.config.hunt_page_size;
        let paths = deps.store.list_children(HUNTS_ROOT, 0, page)?;
        if paths.len() as u64 >= page {
            tracing::warn!(page, "hunt listing filled a whole page, later hunts are not dispatched");
        }

        let mut hunts = Vec::with_capacity(paths.len());
        for path in paths {
            match deps.store.get_as::<Hunt>(&path) {
                Ok(mut hunt) => {
                    if hunt.hunt_id.is_empty() {
                        hunt.hunt_id = HuntId::from_string(path);
                    }
                    hunts.push(hunt);
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "failed to load hunt");
                }
            }
        }

        let mut dispatcher = Self { hunts, built_at: deps.clock.epoch_micros() };
        let report = dispatcher.update(deps).await;
        Ok((dispatcher, report))
    }

    /// Schedule and triage every running hunt, persisting changed counters.
    ///
    /// Hunts in any other state are not touched and cost no store calls.
    pub async fn update<L, C>(&mut self, deps: &DispatchDeps<L, C>) -> UpdateReport
    where
        L: LaunchAdapter,
        C: Clock,
    {
        let mut report = UpdateReport::default();
        for hunt in self.hunts.iter_mut() {
            if !hunt.is_running() {
                continue;
            }
            let schedule = schedule_clients(deps, hunt).await;

            let mut triage = TriageReport::default();
            loop {
                let batch = sort_results(
                    deps.store.as_ref(),
                    hunt,
                    deps.config.triage_batch_size,
                    deps.clock.epoch_micros(),
                );
                let done = batch.processed == 0 || batch.removal_failed();
                triage.absorb(batch);
                if done {
                    break;
                }
            }

            let mut update = HuntUpdate {
                hunt_id: hunt.hunt_id.clone(),
                schedule,
                triage,
                persisted: false,
                persist_failure: None,
            };
            if update.schedule.modified() || update.triage.modified() {
                match deps.store.set_as(hunt.hunt_id.as_str(), &*hunt) {
                    Ok(()) => update.persisted = true,
                    Err(e) => {
                        tracing::error!(hunt = %hunt.hunt_id, error = %e, "failed to persist hunt");
                        update.persist_failure =
                            Some(PathFailure::new(hunt.hunt_id.as_str(), StoreOp::Set, &e));
                    }
                }
            }
            report.hunts.push(update);
        }
        report
    }

    pub fn hunts(&self) -> &[Hunt] {
        &self.hunts
    }

    /// Hunts created strictly after `created_after` (µs).
    pub fn applicable_hunts(&self, created_after: u64) -> impl Iterator<Item = &Hunt> {
        self.hunts.iter().filter(move |h| h.create_time > created_after)
    }

    /// Look a hunt up by full id or by its `H.<hex>` basename.
    pub fn find(&self, id: &str) -> Option<&Hunt> {
        self.hunts.iter().find(|h| h.hunt_id.as_str() == id || h.hunt_id.basename() == id)
    }

    pub fn built_at(&self) -> u64 {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.hunts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hunts.is_empty()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
