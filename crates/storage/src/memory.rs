// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store backed by an ordered map.

use crate::store::{normalize, StoreOp};
use crate::{Store, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Count of calls per operation, including calls that failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub lists: u64,
    pub gets: u64,
    pub sets: u64,
    pub deletes: u64,
}

impl StoreStats {
    pub fn total(&self) -> u64 {
        self.lists + self.gets + self.sets + self.deletes
    }

    pub fn writes(&self) -> u64 {
        self.sets + self.deletes
    }
}

struct Fault {
    op: StoreOp,
    prefix: String,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<String, Value>,
    stats: StoreStats,
    faults: Vec<Fault>,
}

impl MemoryState {
    fn record(&mut self, op: StoreOp, path: &str) -> Result<(), StoreError> {
        match op {
            StoreOp::List => self.stats.lists += 1,
            StoreOp::Get => self.stats.gets += 1,
            StoreOp::Set => self.stats.sets += 1,
            StoreOp::Delete => self.stats.deletes += 1,
        }
        if self.faults.iter().any(|f| f.op == op && path.starts_with(&f.prefix)) {
            return Err(StoreError::Unavailable(format!("{op} failed at {path}")));
        }
        Ok(())
    }
}

/// Shared in-memory store. Clones see the same objects.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats
    }

    pub fn reset_stats(&self) {
        self.inner.lock().stats = StoreStats::default();
    }

    /// Every stored path, in order.
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().objects.keys().cloned().collect()
    }

    /// Stored paths starting with `prefix`.
    pub fn paths_under(&self, prefix: &str) -> Vec<String> {
        self.inner.lock().objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().objects.is_empty()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryStore {
    /// Fail every `op` on paths starting with `prefix` until cleared.
    pub fn fail(&self, op: StoreOp, prefix: impl Into<String>) {
        self.inner.lock().faults.push(Fault { op, prefix: prefix.into() });
    }

    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }
}

impl Store for MemoryStore {
    fn list_children(
        &self,
        path: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<String>, StoreError> {
        let parent = normalize(path)?;
        let mut state = self.inner.lock();
        state.record(StoreOp::List, &parent)?;

        let prefix = format!("{parent}/");
        let children = state
            .objects
            .range(prefix.clone()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&prefix))
            .filter(|key| !key[prefix.len()..].contains('/'))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(children)
    }

    fn get_object(&self, path: &str) -> Result<Value, StoreError> {
        let path = normalize(path)?;
        let mut state = self.inner.lock();
        state.record(StoreOp::Get, &path)?;
        state.objects.get(&path).cloned().ok_or(StoreError::NotFound(path))
    }

    fn set_object(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = normalize(path)?;
        let mut state = self.inner.lock();
        state.record(StoreOp::Set, &path)?;
        state.objects.insert(path, value);
        Ok(())
    }

    fn delete_object(&self, path: &str) -> Result<(), StoreError> {
        let path = normalize(path)?;
        let mut state = self.inner.lock();
        state.record(StoreOp::Delete, &path)?;
        state.objects.remove(&path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
