// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Wall-clock time in microseconds since the Unix epoch.
    fn epoch_micros(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_micros(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_micros() as u64
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    epoch_micros: Arc<Mutex<u64>>,
}

impl FakeClock {
    /// Start of fake time: 2023-11-14T22:13:20Z.
    pub const START_MICROS: u64 = 1_700_000_000_000_000;

    pub fn new() -> Self {
        Self { epoch_micros: Arc::new(Mutex::new(Self::START_MICROS)) }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.epoch_micros.lock() += duration.as_micros() as u64;
    }

    /// Set the epoch microseconds value
    pub fn set_epoch_micros(&self, micros: u64) {
        *self.epoch_micros.lock() = micros;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_micros(&self) -> u64 {
        *self.epoch_micros.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
