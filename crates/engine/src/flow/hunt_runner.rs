// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The flow the scheduler launches on every enrolled agent.
//!
//! It wraps the flow the hunt asked for, forwards every message to it, and
//! once that delegate leaves RUNNING (or fails) files the agent's record
//! under `<hunt>/completed/<client>` for triage.

use super::{Flow, FlowEnv, FlowError, FlowMessage, FlowObject};
use hd_core::{HuntInfo, HuntInfoState, QueueKind};
use hd_storage::StoreExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Default)]
pub struct HuntRunnerFlow {
    delegate: Option<Delegate>,
}

struct Delegate {
    info: HuntInfo,
    object: FlowObject,
    flow: Box<dyn Flow>,
    reported: bool,
}

/// What the runner keeps in its own `FlowObject::state`.
#[derive(Serialize, Deserialize)]
struct RunnerState {
    hunt_info: HuntInfo,
    delegate: FlowObject,
    #[serde(default)]
    reported: bool,
}

impl HuntRunnerFlow {
    /// File the delegate's outcome once. Later calls are no-ops.
    fn report(
        delegate: &mut Delegate,
        env: &FlowEnv<'_>,
        object: &mut FlowObject,
    ) -> Result<(), FlowError> {
        object.context = delegate.object.context.clone();
        if delegate.reported {
            return Ok(());
        }

        let mut info = delegate.info.clone();
        info.flow_id = Some(object.urn.clone());
        info.result = Some(delegate.object.context.clone());
        info.state = HuntInfoState::Completed;
        let path = info.path(QueueKind::Completed);
        env.store.set_as(&path, &info)?;
        delegate.reported = true;

        tracing::info!(
            hunt = %info.hunt_id,
            client = %info.client_id,
            flow = %object.urn,
            state = %delegate.object.context.state,
            results = delegate.object.context.total_results,
            "hunt flow completed"
        );
        Ok(())
    }
}

impl Flow for HuntRunnerFlow {
    fn start(
        &mut self,
        env: &FlowEnv<'_>,
        object: &mut FlowObject,
        args: Value,
    ) -> Result<(), FlowError> {
        let info: HuntInfo =
            serde_json::from_value(args).map_err(|e| FlowError::InvalidArgs(e.to_string()))?;

        let mut request = info.start_request.clone();
        request.client_id = info.client_id.clone();
        request.creator = info.hunt_id.to_string();

        let mut flow = env.flows.create(&request.flow_name)?;
        let args = request.args.clone();
        // The delegate shares the runner's urn so its results land where
        // the hunt reads them.
        let mut delegate_object = FlowObject::new(object.urn.clone(), request, env.now_micros);
        flow.start(env, &mut delegate_object, args)?;

        tracing::debug!(
            hunt = %info.hunt_id,
            client = %info.client_id,
            delegate = %delegate_object.runner_args.flow_name,
            "hunt flow started"
        );
        let mut delegate = Delegate { info, object: delegate_object, flow, reported: false };
        if !delegate.object.context.is_running() {
            Self::report(&mut delegate, env, object)?;
        }
        self.delegate = Some(delegate);
        Ok(())
    }

    fn load(&mut self, env: &FlowEnv<'_>, object: &FlowObject) -> Result<(), FlowError> {
        let state = object.state.clone().ok_or(FlowError::NotStarted)?;
        let saved: RunnerState =
            serde_json::from_value(state).map_err(|e| FlowError::InvalidState(e.to_string()))?;

        let mut flow = env.flows.create(&saved.delegate.runner_args.flow_name)?;
        flow.load(env, &saved.delegate)?;
        self.delegate = Some(Delegate {
            info: saved.hunt_info,
            object: saved.delegate,
            flow,
            reported: saved.reported,
        });
        Ok(())
    }

    fn save(&mut self, env: &FlowEnv<'_>, object: &mut FlowObject) -> Result<(), FlowError> {
        let delegate = self.delegate.as_mut().ok_or(FlowError::NotStarted)?;
        delegate.flow.save(env, &mut delegate.object)?;
        let state = RunnerState {
            hunt_info: delegate.info.clone(),
            delegate: delegate.object.clone(),
            reported: delegate.reported,
        };
        object.state =
            Some(serde_json::to_value(state).map_err(|e| FlowError::InvalidState(e.to_string()))?);
        Ok(())
    }

    fn process_message(
        &mut self,
        env: &FlowEnv<'_>,
        object: &mut FlowObject,
        message: &FlowMessage,
    ) -> Result<(), FlowError> {
        let delegate = self.delegate.as_mut().ok_or(FlowError::NotStarted)?;
        let result = delegate.flow.process_message(env, &mut delegate.object, message);

        if let Err(e) = &result {
            if delegate.object.context.is_running() {
                delegate.object.context.fail(e.to_string());
            }
        }
        if result.is_ok() && delegate.object.context.is_running() {
            return Ok(());
        }

        let reported = Self::report(delegate, env, object);
        match result {
            Err(e) => {
                if let Err(report_err) = reported {
                    tracing::error!(flow = %object.urn, error = %report_err, "failed to file hunt outcome");
                }
                Err(e)
            }
            Ok(()) => reported,
        }
    }
}

#[cfg(test)]
#[path = "hunt_runner_tests.rs"]
mod tests;
