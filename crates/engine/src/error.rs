// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hd_adapters::ResultReadError;
use hd_core::InvalidHuntId;
use hd_storage::StoreError;
use thiserror::Error;

/// Errors returned by the hunt lifecycle API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("hunt not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    InvalidHuntId(#[from] InvalidHuntId),
    #[error("modification not supported: {0}")]
    UnsupportedModification(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("result read error: {0}")]
    Results(#[from] ResultReadError),
}
