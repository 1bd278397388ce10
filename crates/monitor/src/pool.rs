// Copyright (C) 2015-2025 The Neo Project.
//
// pool.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Reference-counted registry sharing one monitor per RPC endpoint.

use crate::delay::{RetryDelay, TokioDelay};
use crate::error::MonitorResult;
use crate::monitor::BlockchainMonitor;
use crate::settings::MonitorSettings;
use neo_rpc_client::{BlockchainRpc, RpcClient, RpcResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Opens an RPC connection for an endpoint URL.
pub trait RpcConnector: Send + Sync {
    fn connect(&self, url: &str) -> RpcResult<Arc<dyn BlockchainRpc>>;
}

/// Connects over HTTP with [`RpcClient`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl RpcConnector for HttpConnector {
    fn connect(&self, url: &str) -> RpcResult<Arc<dyn BlockchainRpc>> {
        Ok(Arc::new(RpcClient::connect(url)?))
    }
}

impl<F> RpcConnector for F
where
    F: Fn(&str) -> RpcResult<Arc<dyn BlockchainRpc>> + Send + Sync,
{
    fn connect(&self, url: &str) -> RpcResult<Arc<dyn BlockchainRpc>> {
        self(url)
    }
}

struct PoolEntry {
    ref_count: usize,
    monitor: Arc<BlockchainMonitor>,
}

struct PoolInner {
    registry: Mutex<HashMap<String, PoolEntry>>,
    connector: Arc<dyn RpcConnector>,
    settings: MonitorSettings,
    delay: Arc<dyn RetryDelay>,
}

impl PoolInner {
    fn release(&self, url: &str, monitor: &Arc<BlockchainMonitor>) {
        let mut registry = self.registry.lock();
        let Some(entry) = registry.get_mut(url) else {
            return;
        };
        if !Arc::ptr_eq(&entry.monitor, monitor) {
            return;
        }
        entry.ref_count -= 1;
        debug!(url, ref_count = entry.ref_count, "monitor released");
        if entry.ref_count == 0 {
            if let Some(entry) = registry.remove(url) {
                entry.monitor.dispose();
            }
        }
    }
}

/// Shares [`BlockchainMonitor`]s between consumers of the same endpoint.
///
/// The pool is an explicit context object; clone it to hand the same
/// registry to several components.
#[derive(Clone)]
pub struct BlockchainMonitorPool {
    inner: Arc<PoolInner>,
}

impl Default for BlockchainMonitorPool {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}

impl BlockchainMonitorPool {
    /// Pool connecting over HTTP.
    pub fn new(settings: MonitorSettings) -> Self {
        Self::with_connector(settings, Arc::new(HttpConnector))
    }

    pub fn with_connector(settings: MonitorSettings, connector: Arc<dyn RpcConnector>) -> Self {
        Self::with_parts(settings, connector, Arc::new(TokioDelay))
    }

    pub fn with_parts(
        settings: MonitorSettings,
        connector: Arc<dyn RpcConnector>,
        delay: Arc<dyn RetryDelay>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                registry: Mutex::new(HashMap::new()),
                connector,
                settings,
                delay,
            }),
        }
    }

    /// Returns the shared monitor for `rpc_url`, creating and starting one if
    /// none is live. Fails with [`MonitorError::Config`] outside a tokio
    /// runtime.
    ///
    /// [`MonitorError::Config`]: crate::MonitorError::Config
    pub fn get_monitor(&self, rpc_url: &str) -> MonitorResult<MonitorHandle> {
        let mut registry = self.inner.registry.lock();

        // a holder may have disposed the shared monitor directly
        let stale = registry
            .get(rpc_url)
            .is_some_and(|entry| entry.monitor.is_disposed());
        if stale {
            registry.remove(rpc_url);
            debug!(url = rpc_url, "replacing disposed monitor");
        }

        if let Some(entry) = registry.get_mut(rpc_url) {
            entry.ref_count += 1;
            debug!(url = rpc_url, ref_count = entry.ref_count, "monitor shared");
            return Ok(self.handle(rpc_url, Arc::clone(&entry.monitor)));
        }

        let rpc = self.inner.connector.connect(rpc_url)?;
        let monitor = BlockchainMonitor::builder(rpc_url, rpc)
            .settings(self.inner.settings.clone())
            .retry_delay(Arc::clone(&self.inner.delay))
            .start()?;
        info!(url = rpc_url, "blockchain monitor created");

        registry.insert(
            rpc_url.to_string(),
            PoolEntry {
                ref_count: 1,
                monitor: Arc::clone(&monitor),
            },
        );
        Ok(self.handle(rpc_url, monitor))
    }

    fn handle(&self, url: &str, monitor: Arc<BlockchainMonitor>) -> MonitorHandle {
        MonitorHandle {
            url: url.to_string(),
            monitor,
            pool: Arc::downgrade(&self.inner),
        }
    }

    /// Live monitors.
    pub fn monitor_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Outstanding handles for `rpc_url`, 0 when no monitor is live.
    pub fn reference_count(&self, rpc_url: &str) -> usize {
        self.inner
            .registry
            .lock()
            .get(rpc_url)
            .map_or(0, |entry| entry.ref_count)
    }

    /// Disposes every live monitor. Outstanding handles stay readable but
    /// their monitors no longer poll.
    pub fn dispose_all(&self) {
        let drained: Vec<PoolEntry> = self.inner.registry.lock().drain().map(|(_, e)| e).collect();
        for entry in drained {
            entry.monitor.dispose();
        }
    }
}

/// A counted reference to a pooled monitor. Dropping it releases the
/// reference; the last release disposes the monitor.
pub struct MonitorHandle {
    url: String,
    monitor: Arc<BlockchainMonitor>,
    pool: Weak<PoolInner>,
}

impl MonitorHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn monitor(&self) -> &Arc<BlockchainMonitor> {
        &self.monitor
    }

    /// True when both handles share one monitor instance.
    pub fn ptr_eq(&self, other: &MonitorHandle) -> bool {
        Arc::ptr_eq(&self.monitor, &other.monitor)
    }

    /// Explicit form of dropping the handle.
    pub fn release(self) {}
}

impl Clone for MonitorHandle {
    fn clone(&self) -> Self {
        if let Some(pool) = self.pool.upgrade() {
            if let Some(entry) = pool.registry.lock().get_mut(&self.url) {
                if Arc::ptr_eq(&entry.monitor, &self.monitor) {
                    entry.ref_count += 1;
                }
            }
        }
        Self {
            url: self.url.clone(),
            monitor: Arc::clone(&self.monitor),
            pool: self.pool.clone(),
        }
    }
}

impl Deref for MonitorHandle {
    type Target = BlockchainMonitor;

    fn deref(&self) -> &Self::Target {
        &self.monitor
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.release(&self.url, &self.monitor);
        }
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("url", &self.url)
            .field("monitor", &self.monitor)
            .finish()
    }
}
