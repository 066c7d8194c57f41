// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Boundaries between the dispatcher and the rest of the fleet service:
//! launching tasks on agents, waking agents, and reading task output.

pub mod launch;
pub mod notify;
pub mod results;

pub use launch::{ChannelLaunchAdapter, LaunchAdapter, LaunchError, LaunchRequest};
pub use notify::{BroadcastNotifyAdapter, NotifyAdapter, NotifyError, WakeAll};
pub use results::{flow_results_path, result_row_path, FlowResultReader, ResultReadError, StoreResultReader};

#[cfg(any(test, feature = "test-support"))]
pub use launch::{FakeLaunchAdapter, LaunchCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use results::{FakeResultReader, ResultCall};
