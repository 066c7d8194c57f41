// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store contract every backend implements.

use crate::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The four store operations, for failure reports and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Set,
    Delete,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StoreOp::List => "list",
            StoreOp::Get => "get",
            StoreOp::Set => "set",
            StoreOp::Delete => "delete",
        })
    }
}

/// Hierarchical key/value store.
pub trait Store: Send + Sync + 'static {
    /// Paths of objects directly under `path`, in a listing order stable
    /// enough to paginate with `offset`/`limit`.
    fn list_children(&self, path: &str, offset: u64, limit: u64)
        -> Result<Vec<String>, StoreError>;

    fn get_object(&self, path: &str) -> Result<Value, StoreError>;

    fn set_object(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Remove the object at `path`. Removing a missing object succeeds.
    fn delete_object(&self, path: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn list_children(
        &self,
        path: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<String>, StoreError> {
        (**self).list_children(path, offset, limit)
    }

    fn get_object(&self, path: &str) -> Result<Value, StoreError> {
        (**self).get_object(path)
    }

    fn set_object(&self, path: &str, value: Value) -> Result<(), StoreError> {
        (**self).set_object(path, value)
    }

    fn delete_object(&self, path: &str) -> Result<(), StoreError> {
        (**self).delete_object(path)
    }
}

/// Typed helpers over [`Store`].
pub trait StoreExt: Store {
    fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let value = self.get_object(path)?;
        serde_json::from_value(value)
            .map_err(|source| StoreError::Json { path: path.to_string(), source })
    }

    fn set_as<T: Serialize>(&self, path: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)
            .map_err(|source| StoreError::Json { path: path.to_string(), source })?;
        self.set_object(path, value)
    }

    fn exists(&self, path: &str) -> Result<bool, StoreError> {
        match self.get_object(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// Split a store path into non-empty segments, rejecting `.` and `..`.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() || parts.iter().any(|s| *s == "." || *s == "..") {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// Canonical form of a path: segments joined by `/`.
pub(crate) fn normalize(path: &str) -> Result<String, StoreError> {
    Ok(segments(path)?.join("/"))
}
