// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{ClientId, FlowContext, FlowId, FlowState, Hunt, HuntInfo, HuntInfoState};

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::{FlowState, HuntState};
    use proptest::prelude::*;

    pub fn arb_hunt_state() -> impl Strategy<Value = HuntState> {
        prop_oneof![
            Just(HuntState::Unset),
            Just(HuntState::Paused),
            Just(HuntState::Running),
            Just(HuntState::Stopped),
            Just(HuntState::Archived),
        ]
    }

    pub fn arb_flow_state() -> impl Strategy<Value = FlowState> {
        prop_oneof![Just(FlowState::Running), Just(FlowState::Terminated), Just(FlowState::Error)]
    }
}

// ── Record factories ────────────────────────────────────────────────────

/// A numbered client id: `C.0000000000000007`.
pub fn client(n: u64) -> ClientId {
    ClientId::new(format!("C.{n:016x}"))
}

/// A record as the delegate task leaves it in `completed`.
pub fn completed_info(hunt: &Hunt, client_id: ClientId, state: FlowState, rows: u64) -> HuntInfo {
    let mut info = HuntInfo::pending(hunt, client_id);
    info.state = HuntInfoState::Completed;
    info.flow_id = Some(FlowId::generate());
    info.result = Some(FlowContext {
        create_time: hunt.create_time,
        state,
        total_results: rows,
        ..FlowContext::default()
    });
    info
}
