// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store: one JSON file per object.
//!
//! Each path segment maps to a directory (percent-encoded), and the object
//! itself lives in `@object.json` inside it, so an object and its children
//! can coexist. Writes go through a temp file and a rename.

use crate::store::{segments, StoreOp};
use crate::{Store, StoreError};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const OBJECT_FILE: &str = "@object.json";
const TEMP_FILE: &str = "@object.json.tmp";

/// Store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, path: &str) -> Result<(String, PathBuf), StoreError> {
        let parts = segments(path)?;
        let mut dir = self.root.clone();
        for part in &parts {
            dir.push(encode_segment(part));
        }
        Ok((parts.join("/"), dir))
    }

    /// Remove now-empty directories from `dir` up to (not including) the root.
    fn prune(&self, mut dir: &Path) {
        while dir != self.root && dir.starts_with(&self.root) {
            if fs::remove_dir(dir).is_err() {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
}

fn io_error(op: StoreOp, path: &str, source: std::io::Error) -> StoreError {
    tracing::debug!(%op, path, error = %source, "store io failure");
    StoreError::Io { path: path.to_string(), source }
}

impl Store for FsStore {
    fn list_children(
        &self,
        path: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<String>, StoreError> {
        let (parent, dir) = self.dir_for(path)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(StoreOp::List, &parent, e)),
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(StoreOp::List, &parent, e))?;
            if !entry.path().join(OBJECT_FILE).is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(decoded) = name.to_str().and_then(decode_segment) else {
                tracing::warn!(entry = ?name, parent = %parent, "skipping undecodable store entry");
                continue;
            };
            children.push(format!("{parent}/{decoded}"));
        }
        children.sort();
        Ok(children.into_iter().skip(offset as usize).take(limit as usize).collect())
    }

    fn get_object(&self, path: &str) -> Result<Value, StoreError> {
        let (path, dir) = self.dir_for(path)?;
        let bytes = match fs::read(dir.join(OBJECT_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(path)),
            Err(e) => return Err(io_error(StoreOp::Get, &path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json { path, source })
    }

    fn set_object(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let (path, dir) = self.dir_for(path)?;
        let bytes = serde_json::to_vec(&value)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        fs::create_dir_all(&dir).map_err(|e| io_error(StoreOp::Set, &path, e))?;
        let tmp = dir.join(TEMP_FILE);
        fs::write(&tmp, bytes).map_err(|e| io_error(StoreOp::Set, &path, e))?;
        fs::rename(&tmp, dir.join(OBJECT_FILE)).map_err(|e| io_error(StoreOp::Set, &path, e))
    }

    fn delete_object(&self, path: &str) -> Result<(), StoreError> {
        let (path, dir) = self.dir_for(path)?;
        match fs::remove_file(dir.join(OBJECT_FILE)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(StoreOp::Delete, &path, e)),
        }
        self.prune(&dir);
        Ok(())
    }
}

/// Bytes kept verbatim in a directory name; everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode_segment(encoded: &str) -> Option<String> {
    percent_decode_str(encoded).decode_utf8().ok().map(|decoded| decoded.into_owned())
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
