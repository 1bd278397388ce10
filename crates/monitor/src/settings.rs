// Copyright (C) 2015-2025 The Neo Project.
//
// settings.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Monitor configuration.

use crate::error::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
/// Default number of accessor attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay between accessor attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
/// Default capacity of each cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
/// Default window for `expressgetpopulatedblocks`.
pub const DEFAULT_POPULATED_BLOCKS_PAGE_SIZE: u32 = 100;
/// Default change-event buffer.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tunables for a [`crate::BlockchainMonitor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub block_cache_capacity: usize,
    pub transaction_cache_capacity: usize,
    pub populated_blocks_page_size: u32,
    pub event_channel_capacity: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            block_cache_capacity: DEFAULT_CACHE_CAPACITY,
            transaction_cache_capacity: DEFAULT_CACHE_CAPACITY,
            populated_blocks_page_size: DEFAULT_POPULATED_BLOCKS_PAGE_SIZE,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Parses settings from TOML; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> MonitorResult<Self> {
        let settings: Self = toml::from_str(text)
            .map_err(|e| MonitorError::Config(format!("Invalid monitor settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("Cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> MonitorResult<()> {
        let checks = [
            (self.poll_interval_ms == 0, "poll_interval_ms"),
            (self.max_attempts == 0, "max_attempts"),
            (self.block_cache_capacity == 0, "block_cache_capacity"),
            (self.transaction_cache_capacity == 0, "transaction_cache_capacity"),
            (self.populated_blocks_page_size == 0, "populated_blocks_page_size"),
            (self.event_channel_capacity == 0, "event_channel_capacity"),
        ];
        match checks.iter().find(|(invalid, _)| *invalid) {
            Some((_, field)) => Err(MonitorError::Config(format!("{field} must be non-zero"))),
            None => Ok(()),
        }
    }
}
