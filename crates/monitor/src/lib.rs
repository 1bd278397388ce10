// Copyright (C) 2015-2025 The Neo Project.
//
// lib.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! # Neo Blockchain Monitor
//!
//! Polls a Neo N3 node (MainNet, TestNet or a neo-express instance) for new
//! blocks and exposes fail-soft, retrying accessors for blocks, transactions
//! and address balances.
//!
//! - [`BlockchainMonitor`]: one endpoint, one poll loop, bounded caches
//! - [`BlockchainMonitorPool`]: shares monitors per endpoint URL
//! - [`PopulatedBlockIndex`]: which heights carry transactions (neo-express only)
//!
//! ## Example
//!
//! ```rust,ignore
//! use neo_blockchain_monitor::{BlockchainMonitorPool, MonitorSettings};
//!
//! let pool = BlockchainMonitorPool::new(MonitorSettings::default());
//! let monitor = pool.get_monitor("http://127.0.0.1:50012")?;
//! let mut changes = monitor.subscribe();
//! while let Ok(change) = changes.recv().await {
//!     println!("height {}", change.block_height);
//! }
//! ```

pub mod address;
pub mod bounded_cache;
pub mod delay;
pub mod error;
pub mod models;
pub mod monitor;
pub mod pool;
pub mod populated_blocks;
pub mod settings;

// Re-exports
pub use bounded_cache::BoundedCache;
pub use delay::{NoDelay, RetryDelay, TokioDelay};
pub use error::{MonitorError, MonitorResult};
pub use models::{AddressBalance, Block, BlockRef, Transaction};
pub use monitor::{BlockchainMonitor, BlockchainMonitorBuilder, MonitorChange};
pub use pool::{BlockchainMonitorPool, HttpConnector, MonitorHandle, RpcConnector};
pub use populated_blocks::{FilterState, PopulatedBlockIndex, PopulatedBlocksScan};
pub use settings::MonitorSettings;
