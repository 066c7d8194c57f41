// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::DispatcherConfig;
use hd_storage::Store;
use std::sync::Arc;

/// Collaborators shared by the mirror, the scheduler, and the API.
#[derive(Clone)]
pub struct DispatchDeps<L, C> {
    pub store: Arc<dyn Store>,
    pub launcher: L,
    pub clock: C,
    pub config: DispatcherConfig,
}

impl<L, C> DispatchDeps<L, C> {
    pub fn new(store: Arc<dyn Store>, launcher: L, clock: C) -> Self {
        Self { store, launcher, clock, config: DispatcherConfig::default() }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }
}
