// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limited promotion of agents from `pending` to `running`.
//!
//! A hunt enrols `client_rate` agents per minute, measured from its last
//! unpause. Each pass launches at most the deficit between that expectation
//! and `total_clients_scheduled`.
//!
//! Promotion writes the destination before deleting the source. A crash in
//! between leaves the agent in both queues; the next pass sees the running
//! copy and drops the pending one without launching again.

use crate::report::{PathFailure, ScheduleReport};
use crate::DispatchDeps;
use hd_adapters::LaunchAdapter;
use hd_core::{
    basename, ClientId, Clock, FlowContext, FlowId, Hunt, HuntInfo, HuntInfoState, QueueKind,
    HUNT_RUNNER_FLOW,
};
use hd_storage::{StoreExt, StoreOp};

/// Launch the agents `hunt` is due and update its counters in place.
///
/// Store failures are recorded in the report; they never abort the pass.
pub async fn schedule_clients<L, C>(deps: &DispatchDeps<L, C>, hunt: &mut Hunt) -> ScheduleReport
where
    L: LaunchAdapter,
    C: Clock,
{
    let now = deps.clock.epoch_micros();
    let mut report = ScheduleReport {
        due: hunt.clients_due(now, deps.config.default_client_rate),
        ..ScheduleReport::default()
    };
    if report.due == 0 {
        return report;
    }

    let pending = hunt.hunt_id.queue_path(QueueKind::Pending);
    let paths = match deps.store.list_children(&pending, 0, report.due) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!(hunt = %hunt.hunt_id, error = %e, "failed to list pending clients");
            report.failures.push(PathFailure::new(pending, StoreOp::List, &e));
            return report;
        }
    };
    report.pulled = paths.len() as u64;

    for path in &paths {
        let mut info: HuntInfo = match deps.store.get_as(path) {
            Ok(info) => info,
            Err(e) => {
                tracing::error!(hunt = %hunt.hunt_id, path = %path, error = %e, "unreadable pending entry");
                report.failures.push(PathFailure::new(path.as_str(), StoreOp::Get, &e));
                report.skipped += 1;
                continue;
            }
        };
        if info.client_id.is_empty() {
            info.client_id = ClientId::new(basename(path));
        }
        info.hunt_id = hunt.hunt_id.clone();

        let running = info.path(QueueKind::Running);
        match deps.store.exists(&running) {
            Ok(true) => {
                tracing::warn!(
                    hunt = %hunt.hunt_id,
                    client = %info.client_id,
                    "client already running, dropping duplicate pending entry"
                );
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => report.failures.push(PathFailure::new(running.as_str(), StoreOp::Get, &e)),
        }

        match launch(deps, &info).await {
            Ok(flow_id) => {
                tracing::debug!(hunt = %hunt.hunt_id, client = %info.client_id, flow = %flow_id, "client scheduled");
                info.flow_id = Some(flow_id);
                info.state = HuntInfoState::Scheduled;
                if let Err(e) = deps.store.set_as(&running, &info) {
                    tracing::error!(hunt = %hunt.hunt_id, path = %running, error = %e, "failed to file running client");
                    report.failures.push(PathFailure::new(running.as_str(), StoreOp::Set, &e));
                }
                hunt.total_clients_scheduled += 1;
                report.scheduled += 1;
            }
            Err(err) => {
                tracing::error!(hunt = %hunt.hunt_id, client = %info.client_id, error = %err, "launch failed");
                info.state = HuntInfoState::Error;
                info.result = Some(FlowContext::error(now, format!("HuntDispatcher: {err}")));
                let errors = info.path(QueueKind::Errors);
                if let Err(e) = deps.store.set_as(&errors, &info) {
                    tracing::error!(hunt = %hunt.hunt_id, path = %errors, error = %e, "failed to file launch error");
                    report.failures.push(PathFailure::new(errors.as_str(), StoreOp::Set, &e));
                }
                hunt.total_clients_with_errors += 1;
                report.errored += 1;
            }
        }
    }

    for path in &paths {
        if let Err(e) = deps.store.delete_object(path) {
            tracing::error!(hunt = %hunt.hunt_id, path = %path, error = %e, "failed to remove pending entry");
            report.failures.push(PathFailure::new(path.as_str(), StoreOp::Delete, &e));
        }
    }

    tracing::info!(
        hunt = %hunt.hunt_id,
        due = report.due,
        scheduled = report.scheduled,
        errored = report.errored,
        skipped = report.skipped,
        "scheduled clients"
    );
    report
}

async fn launch<L, C>(deps: &DispatchDeps<L, C>, info: &HuntInfo) -> Result<FlowId, String>
where
    L: LaunchAdapter,
{
    let args = serde_json::to_value(info).map_err(|e| e.to_string())?;
    deps.launcher
        .launch_task(&info.client_id, HUNT_RUNNER_FLOW, args)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
