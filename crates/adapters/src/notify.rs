// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Message telling every connected agent to poll for new work now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeAll;

/// Adapter for waking the fleet
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Ask every agent to check in ahead of its normal poll.
    async fn notify_all_clients(&self) -> Result<(), NotifyError>;
}

/// Fleet notifier over a tokio broadcast channel.
///
/// Each connected agent session holds a receiver. With no sessions
/// subscribed there is nobody to wake, which is not an error.
#[derive(Clone, Debug)]
pub struct BroadcastNotifyAdapter {
    tx: broadcast::Sender<WakeAll>,
}

impl BroadcastNotifyAdapter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Receiver for one agent session.
    pub fn subscribe(&self) -> broadcast::Receiver<WakeAll> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl NotifyAdapter for BroadcastNotifyAdapter {
    async fn notify_all_clients(&self) -> Result<(), NotifyError> {
        match self.tx.send(WakeAll) {
            Ok(sessions) => tracing::info!(sessions, "woke connected clients"),
            Err(_) => tracing::debug!("no connected clients to wake"),
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{NotifyAdapter, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeNotifyState {
        calls: usize,
        fail: Option<String>,
    }

    /// Fake notification adapter for testing
    #[derive(Clone, Default)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of wake-ups requested, including failed ones
        pub fn calls(&self) -> usize {
            self.inner.lock().calls
        }

        /// Make every later call fail with `message`
        pub fn fail_with(&self, message: impl Into<String>) {
            self.inner.lock().fail = Some(message.into());
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn notify_all_clients(&self) -> Result<(), NotifyError> {
            let mut inner = self.inner.lock();
            inner.calls += 1;
            match &inner.fail {
                Some(message) => Err(NotifyError::SendFailed(message.clone())),
                None => Ok(()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
