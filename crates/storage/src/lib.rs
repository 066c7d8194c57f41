// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable queue store for the hunt dispatcher
//!
//! A hierarchical key/value store addressed by `/`-separated paths. Every
//! operation touches one path; nothing here is transactional across paths.

mod error;
mod fs;
mod memory;
mod store;

pub use error::StoreError;
pub use fs::FsStore;
pub use memory::{MemoryStore, StoreStats};
pub use store::{Store, StoreExt, StoreOp};
