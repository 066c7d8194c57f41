// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher tuning knobs.
//!
//! Values come from defaults, a TOML document, or `HD_*` environment
//! variables. Unparseable environment values fall back to the default.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// How often the registry rebuilds the mirror
    pub refresh_interval: Duration,
    /// Hunts loaded per build; hunts past this page are not dispatched
    pub hunt_page_size: u64,
    /// Completed entries triaged per batch
    pub triage_batch_size: u64,
    /// Agents per minute for hunts without a rate
    pub default_client_rate: u64,
    /// Lifetime of a new hunt without a usable expiry
    pub default_expiry: Duration,
    /// Page size for list calls that leave `count` at zero
    pub default_page_count: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(10),
            hunt_page_size: 100,
            triage_batch_size: 100,
            default_client_rate: hd_core::DEFAULT_CLIENT_RATE,
            default_expiry: Duration::from_secs(7 * 24 * 60 * 60),
            default_page_count: 50,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    refresh_interval_ms: Option<u64>,
    hunt_page_size: Option<u64>,
    triage_batch_size: Option<u64>,
    default_client_rate: Option<u64>,
    default_expiry_secs: Option<u64>,
    default_page_count: Option<u64>,
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}

impl DispatcherConfig {
    hd_core::setters! {
        set {
            refresh_interval: Duration,
            hunt_page_size: u64,
            triage_batch_size: u64,
            default_client_rate: u64,
            default_expiry: Duration,
            default_page_count: u64,
        }
    }

    /// Defaults overridden by `HD_REFRESH_INTERVAL_MS`, `HD_HUNT_PAGE_SIZE`,
    /// `HD_TRIAGE_BATCH_SIZE`, `HD_DEFAULT_CLIENT_RATE`,
    /// `HD_DEFAULT_EXPIRY_SECS`, and `HD_DEFAULT_PAGE_COUNT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_interval: env_u64("HD_REFRESH_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_interval),
            hunt_page_size: env_u64("HD_HUNT_PAGE_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.hunt_page_size),
            triage_batch_size: env_u64("HD_TRIAGE_BATCH_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.triage_batch_size),
            default_client_rate: env_u64("HD_DEFAULT_CLIENT_RATE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.default_client_rate),
            default_expiry: env_u64("HD_DEFAULT_EXPIRY_SECS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_expiry),
            default_page_count: env_u64("HD_DEFAULT_PAGE_COUNT")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.default_page_count),
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        let defaults = Self::default();
        let config = Self {
            refresh_interval: file
                .refresh_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_interval),
            hunt_page_size: file.hunt_page_size.unwrap_or(defaults.hunt_page_size),
            triage_batch_size: file.triage_batch_size.unwrap_or(defaults.triage_batch_size),
            default_client_rate: file.default_client_rate.unwrap_or(defaults.default_client_rate),
            default_expiry: file
                .default_expiry_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_expiry),
            default_page_count: file.default_page_count.unwrap_or(defaults.default_page_count),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Zero("refresh_interval"));
        }
        let counts = [
            ("hunt_page_size", self.hunt_page_size),
            ("triage_batch_size", self.triage_batch_size),
            ("default_client_rate", self.default_client_rate),
            ("default_page_count", self.default_page_count),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero(*name));
        }
        Ok(())
    }

    /// `count` when set, otherwise the default page size.
    pub fn page_count(&self, count: u64) -> u64 {
        if count == 0 {
            self.default_page_count
        } else {
            count
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
