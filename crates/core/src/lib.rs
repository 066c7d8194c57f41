// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hd-core: data model shared by the hunt dispatcher crates

pub mod macros;

pub mod clock;
pub mod hunt;
pub mod hunt_info;
pub mod id;
pub mod queue;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use hunt::{
    Hunt, HuntId, HuntState, InvalidHuntId, StartRequest, ARTIFACT_COLLECTOR_FLOW,
    DEFAULT_CLIENT_RATE, FILE_FINDER_ARTIFACT, FILE_FINDER_FLOW, HUNTS_ROOT, HUNT_ID_PREFIX,
    HUNT_RUNNER_FLOW,
};
pub use hunt_info::{FlowContext, FlowState, HuntInfo, HuntInfoState};
pub use id::{short, ClientId, FlowId};
pub use queue::{basename, QueueKind};

/// Microseconds per second, the unit of every persisted timestamp.
pub const MICROS_PER_SEC: u64 = 1_000_000;
