// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sorting finished agents out of `completed`.
//!
//! Errored, result-less, or unreadable records go to `errors`; otherwise the
//! result count picks `results` or `no_results`. Each entry bumps exactly one
//! hunt counter and is removed from `completed` whether or not filing it
//! succeeded. Filing also retires the client's `running` entry, so a client
//! sits in one queue at a time and can be enrolled again later.

use crate::report::{PathFailure, TriageReport};
use hd_core::{basename, ClientId, FlowContext, Hunt, HuntInfo, HuntInfoState, QueueKind};
use hd_storage::{Store, StoreExt, StoreOp};

/// Triage one batch of up to `batch_size` completed entries.
pub fn sort_results(
    store: &dyn Store,
    hunt: &mut Hunt,
    batch_size: u64,
    now_micros: u64,
) -> TriageReport {
    let mut report = TriageReport::default();
    let completed = hunt.hunt_id.queue_path(QueueKind::Completed);
    let paths = match store.list_children(&completed, 0, batch_size) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!(hunt = %hunt.hunt_id, error = %e, "failed to list completed clients");
            report.failures.push(PathFailure::new(completed, StoreOp::List, &e));
            return report;
        }
    };

    for path in &paths {
        report.processed += 1;
        let mut info = match store.get_as::<HuntInfo>(path) {
            Ok(info) => info,
            Err(e) => {
                tracing::error!(hunt = %hunt.hunt_id, path = %path, error = %e, "unreadable completed entry");
                report.failures.push(PathFailure::new(path.as_str(), StoreOp::Get, &e));
                HuntInfo {
                    client_id: ClientId::new(basename(path)),
                    hunt_id: hunt.hunt_id.clone(),
                    state: HuntInfoState::Error,
                    result: Some(FlowContext::error(
                        now_micros,
                        format!("HuntDispatcher: unreadable completion: {e}"),
                    )),
                    ..HuntInfo::default()
                }
            }
        };
        if info.client_id.is_empty() {
            info.client_id = ClientId::new(basename(path));
        }

        let queue = info.outcome_queue();
        match queue {
            QueueKind::Results => {
                hunt.total_clients_with_results += 1;
                report.results += 1;
            }
            QueueKind::NoResults => {
                hunt.total_clients_without_results += 1;
                report.no_results += 1;
            }
            _ => {
                info.state = HuntInfoState::Error;
                hunt.total_clients_with_errors += 1;
                report.errors += 1;
            }
        }

        let target = hunt.hunt_id.entry_path(queue, &info.client_id);
        if let Err(e) = store.set_as(&target, &info) {
            tracing::error!(hunt = %hunt.hunt_id, path = %target, error = %e, "failed to file triaged client");
            report.failures.push(PathFailure::new(target, StoreOp::Set, &e));
        }

        let running = hunt.hunt_id.entry_path(QueueKind::Running, &info.client_id);
        if let Err(e) = store.delete_object(&running) {
            tracing::warn!(hunt = %hunt.hunt_id, path = %running, error = %e, "failed to retire running entry");
            report.failures.push(PathFailure::new(running, StoreOp::Delete, &e));
        }
    }

    for path in &paths {
        if let Err(e) = store.delete_object(path) {
            tracing::error!(hunt = %hunt.hunt_id, path = %path, error = %e, "failed to remove completed entry");
            report.failures.push(PathFailure::new(path.as_str(), StoreOp::Delete, &e));
        }
    }

    if report.processed > 0 {
        tracing::info!(
            hunt = %hunt.hunt_id,
            processed = report.processed,
            results = report.results,
            errors = report.errors,
            no_results = report.no_results,
            "triaged completed clients"
        );
    }
    report
}

#[cfg(test)]
#[path = "triage_tests.rs"]
mod tests;
