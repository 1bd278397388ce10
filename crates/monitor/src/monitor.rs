// Copyright (C) 2015-2025 The Neo Project.
//
// monitor.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Chain monitor for a single RPC endpoint
//!
//! A [`BlockchainMonitor`] polls `getblockcount`, keeps FIFO caches of
//! immutable blocks and transactions, learns which blocks are populated when
//! talking to neo-express, and detects chain resets: any height change other
//! than a single-block advance drops every cached item.

use crate::address::{script_hash_from_address, GAS_SCRIPT_HASH, NEO_SCRIPT_HASH};
use crate::bounded_cache::BoundedCache;
use crate::delay::{RetryDelay, TokioDelay};
use crate::error::{MonitorError, MonitorResult};
use crate::models::{same_hash, AddressBalance, Block, BlockRef, Transaction};
use crate::populated_blocks::{scan_populated_blocks, FilterState, PopulatedBlockIndex};
use crate::settings::MonitorSettings;
use neo_rpc_client::{BlockchainRpc, ClientRpcError, RpcInvokeResult, RpcResult};
use num_bigint::BigInt;
use num_traits::Zero;
use parking_lot::Mutex;
use serde_json::json;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, info, warn};

/// Emitted at most once per poll tick when the observable state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorChange {
    /// Block count reported by the node.
    pub block_height: u32,
    /// Whether populated-block information is available.
    pub filter_available: bool,
    /// The tick detected a chain reset.
    pub reset: bool,
}

struct MonitorState {
    /// `None` until the first successful tick.
    block_height: Option<u32>,
    healthy: bool,
    blocks: BoundedCache<Arc<Block>>,
    transactions: BoundedCache<Arc<Transaction>>,
    populated: PopulatedBlockIndex,
    /// Bumped on every reset so fetches started before it are not cached.
    generation: u64,
}

impl MonitorState {
    /// Blocks at or above `height - 1` may still change and are never cached.
    fn is_cacheable(&self, block: &Block) -> bool {
        match self.block_height {
            Some(height) => u64::from(block.index) + 1 < u64::from(height),
            None => false,
        }
    }

    fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.blocks.clear();
        self.transactions.clear();
        self.populated.reset();
    }
}

/// Builder for [`BlockchainMonitor`]
pub struct BlockchainMonitorBuilder {
    url: String,
    rpc: Arc<dyn BlockchainRpc>,
    settings: MonitorSettings,
    delay: Arc<dyn RetryDelay>,
}

impl BlockchainMonitorBuilder {
    #[must_use]
    pub fn settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the wait used between accessor retries.
    #[must_use]
    pub fn retry_delay(mut self, delay: Arc<dyn RetryDelay>) -> Self {
        self.delay = delay;
        self
    }

    /// Builds the monitor without starting its poll loop.
    pub fn build(self) -> MonitorResult<Arc<BlockchainMonitor>> {
        self.settings.validate()?;
        let (events, _) = broadcast::channel(self.settings.event_channel_capacity);
        let state = MonitorState {
            block_height: None,
            healthy: false,
            blocks: BoundedCache::new(self.settings.block_cache_capacity),
            transactions: BoundedCache::new(self.settings.transaction_cache_capacity),
            populated: PopulatedBlockIndex::new(),
            generation: 0,
        };
        Ok(Arc::new(BlockchainMonitor {
            url: self.url,
            rpc: self.rpc,
            settings: self.settings,
            delay: self.delay,
            state: Mutex::new(state),
            tick_lock: tokio::sync::Mutex::new(()),
            events: Mutex::new(Some(events)),
            disposed: AtomicBool::new(false),
            shutdown: Arc::new(Notify::new()),
        }))
    }

    /// Builds the monitor and spawns its poll loop on the current runtime.
    pub fn start(self) -> MonitorResult<Arc<BlockchainMonitor>> {
        let runtime = Handle::try_current()
            .map_err(|e| MonitorError::Config(format!("Poll loop needs a tokio runtime: {e}")))?;
        let monitor = self.build()?;
        monitor.spawn_poll_loop(&runtime);
        Ok(monitor)
    }
}

/// Resilient view of one chain endpoint
pub struct BlockchainMonitor {
    url: String,
    rpc: Arc<dyn BlockchainRpc>,
    settings: MonitorSettings,
    delay: Arc<dyn RetryDelay>,
    state: Mutex<MonitorState>,
    /// Keeps ticks strictly sequential.
    tick_lock: tokio::sync::Mutex<()>,
    events: Mutex<Option<broadcast::Sender<MonitorChange>>>,
    disposed: AtomicBool,
    shutdown: Arc<Notify>,
}

impl std::fmt::Debug for BlockchainMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainMonitor")
            .field("url", &self.url)
            .field("block_height", &self.block_height())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl BlockchainMonitor {
    #[must_use]
    pub fn builder(url: impl Into<String>, rpc: Arc<dyn BlockchainRpc>) -> BlockchainMonitorBuilder {
        BlockchainMonitorBuilder {
            url: url.into(),
            rpc,
            settings: MonitorSettings::default(),
            delay: Arc::new(TokioDelay),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Block count seen by the last successful tick, 0 before the first one.
    pub fn block_height(&self) -> u32 {
        self.state.lock().block_height.unwrap_or(0)
    }

    /// True when the last poll tick succeeded.
    pub fn is_healthy(&self) -> bool {
        self.state.lock().healthy
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn cached_block_count(&self) -> usize {
        self.state.lock().blocks.len()
    }

    pub fn cached_transaction_count(&self) -> usize {
        self.state.lock().transactions.len()
    }

    pub fn filter_state(&self) -> FilterState {
        self.state.lock().populated.state()
    }

    /// UI hint; `true` whenever populated-block data is unavailable.
    pub fn is_block_populated(&self, index: u32) -> bool {
        self.state.lock().populated.is_block_populated(index)
    }

    pub fn is_filter_available(&self) -> bool {
        self.state.lock().populated.is_filter_available()
    }

    /// Subscribes to change notifications. After disposal the receiver is
    /// already closed.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorChange> {
        match self.events.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Stops polling and closes every subscription. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown.notify_one();
        self.events.lock().take();
        info!(url = %self.url, "blockchain monitor disposed");
    }

    fn spawn_poll_loop(self: &Arc<Self>, runtime: &Handle) {
        let weak = Arc::downgrade(self);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.settings.poll_interval();
        let url = self.url.clone();

        runtime.spawn(async move {
            loop {
                {
                    let Some(monitor) = weak.upgrade() else {
                        break;
                    };
                    if monitor.is_disposed() {
                        break;
                    }
                    if let Err(err) = monitor.refresh().await {
                        match err {
                            MonitorError::Disposed => break,
                            err => warn!(url = %monitor.url, error = %err, "poll tick failed"),
                        }
                    }
                }
                tokio::select! {
                    _ = shutdown.notified() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!(url = %url, "poll loop stopped");
        });
    }

    /// Runs one poll tick: reads the chain height, detects resets, grows the
    /// populated-block index and notifies subscribers of any change.
    pub async fn refresh(&self) -> MonitorResult<()> {
        let _tick = self.tick_lock.lock().await;
        if self.is_disposed() {
            return Err(MonitorError::Disposed);
        }

        let height = match self.rpc.get_block_count().await {
            Ok(height) => height,
            Err(err) => {
                self.state.lock().healthy = false;
                return Err(err.into());
            }
        };

        let (filter_before, mut changed, reset, scan_from) = {
            let mut state = self.state.lock();
            let filter_before = state.populated.is_filter_available();
            let (changed, reset) = match state.block_height {
                None => {
                    debug!(url = %self.url, height, "initial sync");
                    (true, false)
                }
                Some(previous) if previous == height => (false, false),
                Some(previous) if previous.checked_add(1) == Some(height) => (true, false),
                Some(previous) => {
                    info!(url = %self.url, previous, height, "chain reset detected");
                    state.clear();
                    state.block_height = Some(0);
                    (true, true)
                }
            };
            let scan_from = if state.populated.is_unavailable() || height == 0 {
                None
            } else {
                Some((
                    state.populated.synced_height(),
                    state.populated.cache_id().map(str::to_string),
                ))
            };
            (filter_before, changed, reset, scan_from)
        };

        if let Some((synced, cache_id)) = scan_from {
            let head = height - 1;
            let scan = scan_populated_blocks(
                self.rpc.as_ref(),
                head,
                synced,
                cache_id.as_deref(),
                self.settings.populated_blocks_page_size,
            )
            .await;
            match scan {
                Ok(scan) => {
                    debug!(url = %self.url, head, found = scan.indexes.len(), pages = scan.pages, "populated blocks updated");
                    self.state.lock().populated.apply(scan);
                }
                Err(err) if err.is_method_not_found() => {
                    info!(url = %self.url, "populated block filter not supported by node");
                    self.state.lock().populated.mark_unavailable();
                }
                Err(err) => {
                    self.state.lock().healthy = false;
                    return Err(err.into());
                }
            }
        }

        let filter_available = {
            let mut state = self.state.lock();
            state.block_height = Some(height);
            state.healthy = true;
            state.populated.is_filter_available()
        };
        changed |= filter_available != filter_before;

        if changed {
            self.notify(MonitorChange {
                block_height: height,
                filter_available,
                reset,
            });
        }
        Ok(())
    }

    fn notify(&self, change: MonitorChange) {
        if let Some(sender) = self.events.lock().as_ref() {
            if let Err(e) = sender.send(change) {
                debug!("No subscribers for monitor change: {}", e);
            }
        }
    }

    /// Runs `call` up to `max_attempts` times when `retry_on_failure`,
    /// otherwise once.
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        retry_on_failure: bool,
        mut call: F,
    ) -> MonitorResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RpcResult<T>>,
    {
        let attempts = if retry_on_failure {
            self.settings.max_attempts
        } else {
            1
        };
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if !retry_on_failure => return Err(err.into()),
                Err(err) if attempt >= attempts => {
                    warn!(url = %self.url, operation, attempts, error = %err, "giving up");
                    return Err(MonitorError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts,
                        source: err,
                    });
                }
                Err(err) => {
                    if self.is_disposed() {
                        return Err(MonitorError::Disposed);
                    }
                    debug!(url = %self.url, operation, attempt, error = %err, "retrying");
                    self.delay.wait(self.settings.retry_delay()).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Block by index or hash, from cache when possible.
    pub async fn get_block(
        &self,
        index_or_hash: impl Into<BlockRef>,
        retry_on_failure: bool,
    ) -> MonitorResult<Arc<Block>> {
        let reference = index_or_hash.into();
        let (cached, generation) = {
            let state = self.state.lock();
            let cached = state.blocks.find(|b| b.matches(&reference)).cloned();
            (cached, state.generation)
        };
        if let Some(block) = cached {
            debug!(block = %reference, "block cache hit");
            return Ok(block);
        }

        let rpc = self.rpc.as_ref();
        let param = reference.to_param();
        let param = param.as_str();
        let operation = format!("getblock {reference}");
        let value = self
            .with_retry(&operation, retry_on_failure, move || async move {
                rpc.get_block(param, true).await
            })
            .await?;

        let block = Arc::new(Block::from_json(value)?);
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(block = %reference, "chain reset during fetch, not caching");
        } else if state.is_cacheable(&block) {
            state.blocks.insert(Arc::clone(&block));
        }
        Ok(block)
    }

    /// Transaction by hash, from cache when possible.
    pub async fn get_transaction(
        &self,
        hash: &str,
        retry_on_failure: bool,
    ) -> MonitorResult<Arc<Transaction>> {
        let (cached, generation) = {
            let state = self.state.lock();
            let cached = state.transactions.find(|tx| same_hash(&tx.hash, hash)).cloned();
            (cached, state.generation)
        };
        if let Some(tx) = cached {
            debug!(hash, "transaction cache hit");
            return Ok(tx);
        }

        let rpc = self.rpc.as_ref();
        let operation = format!("getrawtransaction {hash}");
        let value = self
            .with_retry(&operation, retry_on_failure, move || async move {
                rpc.get_raw_transaction(hash, true).await
            })
            .await?;

        let tx = Arc::new(Transaction::from_json(value)?);
        let mut state = self.state.lock();
        if state.generation == generation {
            state.transactions.insert(Arc::clone(&tx));
        } else {
            debug!(hash, "chain reset during fetch, not caching");
        }
        Ok(tx)
    }

    /// Live NEO and GAS balances of a Neo address or script hash.
    pub async fn get_address(
        &self,
        address: &str,
        retry_on_failure: bool,
    ) -> MonitorResult<AddressBalance> {
        let script_hash = script_hash_from_address(address)?;
        let account = json!({"type": "Hash160", "value": script_hash});

        let rpc = self.rpc.as_ref();
        let account = &account;
        let operation = format!("balanceOf {address}");
        let (neo, gas) = self
            .with_retry(&operation, retry_on_failure, move || async move {
                let neo = rpc
                    .invoke_function(NEO_SCRIPT_HASH, "balanceOf", vec![account.clone()])
                    .await?;
                let gas = rpc
                    .invoke_function(GAS_SCRIPT_HASH, "balanceOf", vec![account.clone()])
                    .await?;
                Ok::<_, ClientRpcError>((neo, gas))
            })
            .await?;

        Ok(AddressBalance {
            address: address.to_string(),
            neo_balance: balance_from_result(&neo),
            gas_balance: balance_from_result(&gas),
        })
    }
}

impl Drop for BlockchainMonitor {
    fn drop(&mut self) {
        self.disposed.store(true, Ordering::Release);
        self.shutdown.notify_one();
    }
}

/// First stack entry as an integer; 0 when missing, faulted or unparseable.
fn balance_from_result(result: &RpcInvokeResult) -> BigInt {
    if !result.is_halt() {
        return BigInt::zero();
    }
    result
        .first_stack_item()
        .and_then(|item| item.integer_text())
        .and_then(|text| text.parse::<BigInt>().ok())
        .unwrap_or_else(BigInt::zero)
}
