// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hunt lifecycle API.
//!
//! Listing and fetching hunts reads the published mirror, so it can lag the
//! store by one refresh interval. Every write invalidates the registry before
//! returning, so a caller's own changes are visible to its next read.
//! Per-agent records are always read straight from the store.

use crate::request::{
    GetHuntResultsRequest, HuntModification, ListHuntClientsRequest, ListHuntsRequest,
};
use crate::{ApiError, HuntRegistry};
use hd_adapters::{FlowResultReader, LaunchAdapter, NotifyAdapter};
use hd_core::{Clock, Hunt, HuntId, HuntInfo, HuntState, QueueKind};
use hd_storage::StoreExt;
use serde_json::Value;
use std::sync::Arc;

/// Records read per page while walking a hunt's `results` queue.
const RESULTS_PAGE: u64 = 50;

pub struct HuntApi<L, N, C> {
    registry: HuntRegistry<L, C>,
    notifier: N,
    results: Arc<dyn FlowResultReader>,
}

impl<L, N, C> HuntApi<L, N, C>
where
    L: LaunchAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(registry: HuntRegistry<L, C>, notifier: N, results: Arc<dyn FlowResultReader>) -> Self {
        Self { registry, notifier, results }
    }

    pub fn registry(&self) -> &HuntRegistry<L, C> {
        &self.registry
    }

    /// Persist a new hunt from `draft` and return its id.
    ///
    /// The id, timestamps, and counters are assigned here; anything the draft
    /// carried for them is ignored. A draft left UNSET starts PAUSED.
    pub async fn create_hunt(&self, draft: Hunt) -> Result<HuntId, ApiError> {
        let deps = self.registry.deps();
        let now = deps.clock.epoch_micros();

        let mut hunt = Hunt {
            hunt_id: HuntId::generate(),
            create_time: now,
            last_unpause_time: now,
            total_clients_when_unpaused: 0,
            total_clients_scheduled: 0,
            total_clients_with_results: 0,
            total_clients_with_errors: 0,
            total_clients_without_results: 0,
            artifacts: Vec::new(),
            ..draft
        };
        if hunt.expires <= now {
            hunt.expires = now.saturating_add(deps.config.default_expiry.as_micros() as u64);
        }
        if hunt.state == HuntState::Unset {
            hunt.state = HuntState::Paused;
        }

        deps.store.set_as(hunt.hunt_id.as_str(), &hunt)?;
        tracing::info!(hunt = %hunt.hunt_id, state = %hunt.state, "hunt created");
        self.registry.invalidate().await;

        if let Err(e) = self.notifier.notify_all_clients().await {
            tracing::warn!(hunt = %hunt.hunt_id, error = %e, "failed to notify clients of new hunt");
        }
        Ok(hunt.hunt_id)
    }

    /// One page of hunts created after `created_after`, in mirror order.
    pub async fn list_hunts(&self, request: ListHuntsRequest) -> Vec<Hunt> {
        let count = self.registry.deps().config.page_count(request.count);
        let dispatcher = self.registry.get_dispatcher().await;
        dispatcher
            .applicable_hunts(request.created_after)
            .skip(request.offset as usize)
            .take(count as usize)
            .cloned()
            .collect()
    }

    /// A hunt by full id or basename, with its collected artifacts filled in.
    pub async fn get_hunt(&self, hunt_id: &str) -> Result<Hunt, ApiError> {
        let dispatcher = self.registry.get_dispatcher().await;
        let mut hunt =
            dispatcher.find(hunt_id).cloned().ok_or_else(|| ApiError::NotFound(hunt_id.to_string()))?;
        hunt.artifacts = hunt.collected_artifacts();
        Ok(hunt)
    }

    /// Change a hunt's state, by full id or basename. Only state changes are supported.
    pub async fn modify_hunt(&self, modification: HuntModification) -> Result<Hunt, ApiError> {
        let hunt_id = HuntId::resolve(&modification.hunt_id)?;
        let deps = self.registry.deps();
        let mut hunt: Hunt = match deps.store.get_as(hunt_id.as_str()) {
            Ok(hunt) => hunt,
            Err(e) if e.is_not_found() => return Err(ApiError::NotFound(hunt_id.to_string())),
            Err(e) => return Err(e.into()),
        };

        let previous = hunt.state;
        let applied = match modification.state {
            Some(state) => hunt.apply_state_change(state, deps.clock.epoch_micros()),
            None => false,
        };
        if !applied {
            return Err(ApiError::UnsupportedModification(format!(
                "nothing to change on {hunt_id}"
            )));
        }

        deps.store.set_as(hunt_id.as_str(), &hunt)?;
        tracing::info!(hunt = %hunt_id, from = %previous, to = %hunt.state, "hunt modified");
        self.registry.invalidate().await;
        Ok(hunt)
    }

    /// Agent records in one of a hunt's queues. Unreadable records are skipped.
    pub async fn list_hunt_clients(
        &self,
        request: ListHuntClientsRequest,
    ) -> Result<Vec<HuntInfo>, ApiError> {
        let hunt_id = HuntId::parse(&request.hunt_id)?;
        let count = self.registry.deps().config.page_count(request.count);
        self.read_queue(&hunt_id, request.kind.queue(), request.offset, count)
    }

    /// Records in a hunt's `results` queue.
    pub async fn get_hunt_infos(
        &self,
        request: GetHuntResultsRequest,
    ) -> Result<Vec<HuntInfo>, ApiError> {
        let hunt_id = HuntId::parse(&request.hunt_id)?;
        let count = self.registry.deps().config.page_count(request.count);
        self.read_queue(&hunt_id, QueueKind::Results, request.offset, count)
    }

    /// Result rows across every agent in a hunt's `results` queue.
    ///
    /// `offset` counts rows, not agents. Agents whose rows all fall before
    /// `offset` are skipped without reading their rows.
    pub async fn get_hunt_results(
        &self,
        request: GetHuntResultsRequest,
    ) -> Result<Vec<Value>, ApiError> {
        let hunt_id = HuntId::parse(&request.hunt_id)?;
        let count = self.registry.deps().config.page_count(request.count);
        let store = &self.registry.deps().store;
        let queue = hunt_id.queue_path(QueueKind::Results);

        let mut rows = Vec::new();
        let mut seen = 0u64;
        let mut page_offset = 0u64;
        loop {
            let paths = store.list_children(&queue, page_offset, RESULTS_PAGE)?;
            if paths.is_empty() {
                return Ok(rows);
            }
            page_offset += paths.len() as u64;

            for path in &paths {
                let info: HuntInfo = match store.get_as(path) {
                    Ok(info) => info,
                    Err(e) => {
                        tracing::warn!(hunt = %hunt_id, path = %path, error = %e, "skipping unreadable result record");
                        continue;
                    }
                };
                let total = info.total_results();
                if seen + total <= request.offset {
                    seen += total;
                    continue;
                }
                let Some(flow_id) = &info.flow_id else {
                    seen += total;
                    continue;
                };

                let skip = request.offset.saturating_sub(seen);
                let want = count - rows.len() as u64;
                rows.extend(self.results.get_flow_results(&info.client_id, flow_id, skip, want)?);
                seen += total;
                if rows.len() as u64 >= count {
                    rows.truncate(count as usize);
                    return Ok(rows);
                }
            }
        }
    }

    fn read_queue(
        &self,
        hunt_id: &HuntId,
        queue: QueueKind,
        offset: u64,
        count: u64,
    ) -> Result<Vec<HuntInfo>, ApiError> {
        let store = &self.registry.deps().store;
        let paths = store.list_children(&hunt_id.queue_path(queue), offset, count)?;
        let mut infos = Vec::with_capacity(paths.len());
        for path in paths {
            match store.get_as::<HuntInfo>(&path) {
                Ok(info) => infos.push(info),
                Err(e) => {
                    tracing::warn!(hunt = %hunt_id, path = %path, error = %e, "skipping unreadable client record");
                }
            }
        }
        Ok(infos)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
