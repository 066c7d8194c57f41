// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Holder of the published [`Dispatcher`] and its background refresh.
//!
//! Readers take the current snapshot under a short read lock and never wait
//! for a rebuild. Rebuilds are serialized by an async build lock and swap the
//! snapshot in when finished. A failed rebuild publishes an empty mirror.

use crate::{DispatchDeps, Dispatcher};
use hd_adapters::LaunchAdapter;
use hd_core::Clock;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

struct RegistryInner<L, C> {
    deps: DispatchDeps<L, C>,
    published: RwLock<Option<Arc<Dispatcher>>>,
    build_lock: tokio::sync::Mutex<()>,
    refresh_started: AtomicBool,
    cancel: CancellationToken,
}

/// Shared handle; clones refer to the same snapshot and refresh task.
pub struct HuntRegistry<L, C> {
    inner: Arc<RegistryInner<L, C>>,
}

impl<L, C> Clone for HuntRegistry<L, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<L, C> HuntRegistry<L, C>
where
    L: LaunchAdapter,
    C: Clock,
{
    pub fn new(deps: DispatchDeps<L, C>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                deps,
                published: RwLock::new(None),
                build_lock: tokio::sync::Mutex::new(()),
                refresh_started: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn deps(&self) -> &DispatchDeps<L, C> {
        &self.inner.deps
    }

    /// The current mirror, built on first use. Every call ensures the refresh
    /// task is running, including after an `invalidate` published first.
    pub async fn get_dispatcher(&self) -> Arc<Dispatcher> {
        self.start_refresh();
        if let Some(dispatcher) = self.published() {
            return dispatcher;
        }

        let _guard = self.inner.build_lock.lock().await;
        // Another caller may have finished the first build while we waited.
        match self.published() {
            Some(dispatcher) => dispatcher,
            None => self.rebuild_locked().await,
        }
    }

    /// Rebuild and publish now, after a write to any hunt.
    pub async fn invalidate(&self) -> Arc<Dispatcher> {
        let _guard = self.inner.build_lock.lock().await;
        self.rebuild_locked().await
    }

    /// Stop the refresh task. The published mirror stays readable.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    pub fn refresh_task_running(&self) -> bool {
        self.inner.refresh_started.load(Ordering::Acquire) && !self.inner.cancel.is_cancelled()
    }

    fn published(&self) -> Option<Arc<Dispatcher>> {
        self.inner.published.read().clone()
    }

    /// Caller holds the build lock.
    async fn rebuild_locked(&self) -> Arc<Dispatcher> {
        let deps = &self.inner.deps;
        let dispatcher = match Dispatcher::build(deps).await {
            Ok((dispatcher, report)) => {
                let failures = report.failures().len();
                tracing::debug!(
                    hunts = dispatcher.len(),
                    scheduled = report.total_scheduled(),
                    triaged = report.total_triaged(),
                    failures,
                    "hunt mirror rebuilt"
                );
                Arc::new(dispatcher)
            }
            Err(e) => {
                tracing::error!(error = %e, "hunt mirror rebuild failed, publishing empty mirror");
                Arc::new(Dispatcher::empty(deps.clock.epoch_micros()))
            }
        };
        *self.inner.published.write() = Some(Arc::clone(&dispatcher));
        dispatcher
    }

    fn start_refresh(&self) {
        if self.inner.refresh_started.swap(true, Ordering::AcqRel) {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let cancel = self.inner.cancel.clone();
        let interval = self.inner.deps.config.refresh_interval;
        tracing::info!(interval_ms = interval.as_millis() as u64, "starting hunt refresh task");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                let Some(registry) = upgrade(&weak) else {
                    break;
                };
                registry.invalidate().await;
            }
            tracing::info!("hunt refresh task stopped");
        });
    }
}

fn upgrade<L, C>(weak: &Weak<RegistryInner<L, C>>) -> Option<HuntRegistry<L, C>> {
    weak.upgrade().map(|inner| HuntRegistry { inner })
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
