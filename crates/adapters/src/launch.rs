// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting a task on a remote agent.

use async_trait::async_trait;
use hd_core::{ClientId, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from launch operations
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("launch transport closed")]
    TransportClosed,
    #[error("client {0} is unreachable")]
    Unreachable(ClientId),
    #[error("launch rejected: {0}")]
    Rejected(String),
}

/// Instruction handed to the transport: run `task_type` on `client_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub client_id: ClientId,
    pub flow_id: FlowId,
    pub task_type: String,
    pub args: Value,
}

/// Adapter for starting tasks on agents
#[async_trait]
pub trait LaunchAdapter: Clone + Send + Sync + 'static {
    /// Start `task_type` on `client_id` and return the new task's id.
    async fn launch_task(
        &self,
        client_id: &ClientId,
        task_type: &str,
        args: Value,
    ) -> Result<FlowId, LaunchError>;
}

/// Launch adapter that allocates flow ids locally and forwards each
/// request to the transport over a bounded channel.
#[derive(Clone, Debug)]
pub struct ChannelLaunchAdapter {
    tx: mpsc::Sender<LaunchRequest>,
}

impl ChannelLaunchAdapter {
    /// Create the adapter and the receiving end the transport drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LaunchRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: mpsc::Sender<LaunchRequest>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LaunchAdapter for ChannelLaunchAdapter {
    async fn launch_task(
        &self,
        client_id: &ClientId,
        task_type: &str,
        args: Value,
    ) -> Result<FlowId, LaunchError> {
        let flow_id = FlowId::generate();
        let request = LaunchRequest {
            client_id: client_id.clone(),
            flow_id: flow_id.clone(),
            task_type: task_type.to_string(),
            args,
        };
        self.tx.send(request).await.map_err(|_| LaunchError::TransportClosed)?;
        tracing::debug!(client = %client_id, flow = %flow_id, task_type, "launch queued");
        Ok(flow_id)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{LaunchAdapter, LaunchError};
    use async_trait::async_trait;
    use hd_core::{ClientId, FlowId};
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Recorded launch attempt; `flow_id` is `None` when it was refused
    #[derive(Debug, Clone)]
    pub struct LaunchCall {
        pub client_id: ClientId,
        pub task_type: String,
        pub args: Value,
        pub flow_id: Option<FlowId>,
    }

    #[derive(Default)]
    struct FakeLaunchState {
        calls: Vec<LaunchCall>,
        failing: HashSet<ClientId>,
        fail_all: Option<String>,
        next_id: u64,
    }

    /// Fake launch adapter for testing. Flow ids are sequential: `F.0000000000000001`, ...
    #[derive(Clone, Default)]
    pub struct FakeLaunchAdapter {
        inner: Arc<Mutex<FakeLaunchState>>,
    }

    impl FakeLaunchAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded launch attempts
        pub fn calls(&self) -> Vec<LaunchCall> {
            self.inner.lock().calls.clone()
        }

        /// Clients that were launched successfully, in order
        pub fn launched_clients(&self) -> Vec<ClientId> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter(|c| c.flow_id.is_some())
                .map(|c| c.client_id.clone())
                .collect()
        }

        /// Refuse launches for one client
        pub fn fail_client(&self, client_id: impl Into<ClientId>) {
            self.inner.lock().failing.insert(client_id.into());
        }

        /// Refuse every launch with `message`
        pub fn fail_all(&self, message: impl Into<String>) {
            self.inner.lock().fail_all = Some(message.into());
        }

        pub fn clear_failures(&self) {
            let mut inner = self.inner.lock();
            inner.failing.clear();
            inner.fail_all = None;
        }
    }

    #[async_trait]
    impl LaunchAdapter for FakeLaunchAdapter {
        async fn launch_task(
            &self,
            client_id: &ClientId,
            task_type: &str,
            args: Value,
        ) -> Result<FlowId, LaunchError> {
            let mut inner = self.inner.lock();
            let result = if let Some(message) = &inner.fail_all {
                Err(LaunchError::Rejected(message.clone()))
            } else if inner.failing.contains(client_id) {
                Err(LaunchError::Unreachable(client_id.clone()))
            } else {
                inner.next_id += 1;
                Ok(FlowId::new(format!("{}{:016x}", FlowId::PREFIX, inner.next_id)))
            };

            inner.calls.push(LaunchCall {
                client_id: client_id.clone(),
                task_type: task_type.to_string(),
                args,
                flow_id: result.as_ref().ok().cloned(),
            });
            result
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLaunchAdapter, LaunchCall};

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
