// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading the rows a finished task produced.

use hd_core::{ClientId, FlowId};
use hd_storage::{Store, StoreError};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors from result reads
#[derive(Debug, Error)]
pub enum ResultReadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("results unavailable for {client}/{flow}: {reason}")]
    Unavailable { client: ClientId, flow: FlowId, reason: String },
}

/// Source of per-task result rows.
pub trait FlowResultReader: Send + Sync + 'static {
    /// Up to `count` rows of `flow_id`'s output on `client_id`, starting at `offset`.
    fn get_flow_results(
        &self,
        client_id: &ClientId,
        flow_id: &FlowId,
        offset: u64,
        count: u64,
    ) -> Result<Vec<Value>, ResultReadError>;
}

/// `aff4:/<client>/flows/<flow>/results`
pub fn flow_results_path(client_id: &ClientId, flow_id: &FlowId) -> String {
    format!("aff4:/{client_id}/flows/{flow_id}/results")
}

/// Path of row `index`; zero-padded so listing order is row order.
pub fn result_row_path(client_id: &ClientId, flow_id: &FlowId, index: u64) -> String {
    format!("{}/{index:010}", flow_results_path(client_id, flow_id))
}

/// Reads rows from the store layout tasks write their output to.
#[derive(Clone)]
pub struct StoreResultReader {
    store: Arc<dyn Store>,
}

impl StoreResultReader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl FlowResultReader for StoreResultReader {
    fn get_flow_results(
        &self,
        client_id: &ClientId,
        flow_id: &FlowId,
        offset: u64,
        count: u64,
    ) -> Result<Vec<Value>, ResultReadError> {
        let paths = self.store.list_children(&flow_results_path(client_id, flow_id), offset, count)?;
        let mut rows = Vec::with_capacity(paths.len());
        for path in paths {
            match self.store.get_object(&path) {
                Ok(row) => rows.push(row),
                // Listed then removed; not worth failing the page for.
                Err(e) if e.is_not_found() => {
                    tracing::debug!(path = %path, "result row vanished during read");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(rows)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{FlowResultReader, ResultReadError};
    use hd_core::{ClientId, FlowId};
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Recorded read
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ResultCall {
        pub client_id: ClientId,
        pub flow_id: FlowId,
        pub offset: u64,
        pub count: u64,
    }

    #[derive(Default)]
    struct FakeResultState {
        rows: HashMap<(ClientId, FlowId), Vec<Value>>,
        calls: Vec<ResultCall>,
    }

    /// In-memory result reader for testing
    #[derive(Clone, Default)]
    pub struct FakeResultReader {
        inner: Arc<Mutex<FakeResultState>>,
    }

    impl FakeResultReader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the rows returned for one task
        pub fn insert(&self, client_id: ClientId, flow_id: FlowId, rows: Vec<Value>) {
            self.inner.lock().rows.insert((client_id, flow_id), rows);
        }

        pub fn calls(&self) -> Vec<ResultCall> {
            self.inner.lock().calls.clone()
        }
    }

    impl FlowResultReader for FakeResultReader {
        fn get_flow_results(
            &self,
            client_id: &ClientId,
            flow_id: &FlowId,
            offset: u64,
            count: u64,
        ) -> Result<Vec<Value>, ResultReadError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ResultCall {
                client_id: client_id.clone(),
                flow_id: flow_id.clone(),
                offset,
                count,
            });
            let rows = inner
                .rows
                .get(&(client_id.clone(), flow_id.clone()))
                .map(|rows| rows.iter().skip(offset as usize).take(count as usize).cloned().collect())
                .unwrap_or_default();
            Ok(rows)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResultReader, ResultCall};

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
