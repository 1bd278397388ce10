//! Scripted in-memory node used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use neo_blockchain_monitor::{BlockchainMonitor, MonitorSettings, NoDelay};
use neo_rpc_client::{BlockchainRpc, ClientRpcError, RpcRequest, RpcResult};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// How the node answers `expressgetpopulatedblocks`.
#[derive(Debug, Clone)]
pub enum PopulatedMode {
    Supported(BTreeSet<u32>),
    MethodNotFound,
    Failing,
}

pub fn block_hash(index: u32) -> String {
    format!("0x{index:064x}")
}

pub struct ScriptedNode {
    pub height: AtomicU32,
    pub populated: Mutex<PopulatedMode>,
    pub balances: Mutex<HashMap<String, (String, String)>>,
    pub transactions: Mutex<HashMap<String, Value>>,
    /// Remaining failures for block/transaction/invoke calls.
    pub failures_left: AtomicU32,
    pub fail_block_count: Mutex<bool>,
    pub block_count_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
    pub transaction_calls: AtomicUsize,
    pub invoke_calls: AtomicUsize,
    pub populated_calls: AtomicUsize,
}

impl ScriptedNode {
    pub fn new(height: u32) -> Arc<Self> {
        Arc::new(Self {
            height: AtomicU32::new(height),
            populated: Mutex::new(PopulatedMode::MethodNotFound),
            balances: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            failures_left: AtomicU32::new(0),
            fail_block_count: Mutex::new(false),
            block_count_calls: AtomicUsize::new(0),
            block_calls: AtomicUsize::new(0),
            transaction_calls: AtomicUsize::new(0),
            invoke_calls: AtomicUsize::new(0),
            populated_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_height(&self, height: u32) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_populated(&self, mode: PopulatedMode) {
        *self.populated.lock() = mode;
    }

    pub fn fail_next(&self, calls: u32) {
        self.failures_left.store(calls, Ordering::SeqCst);
    }

    pub fn add_transaction(&self, hash: &str) {
        self.transactions
            .lock()
            .insert(hash.to_string(), json!({"hash": hash, "size": 120}));
    }

    fn take_failure(&self) -> RpcResult<()> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(ClientRpcError::internal("HTTP error: connection refused"));
        }
        Ok(())
    }

    fn populated_page(&self, request: &RpcRequest) -> RpcResult<Value> {
        self.populated_calls.fetch_add(1, Ordering::SeqCst);
        let count = request.params[0].as_u64().unwrap_or(100) as usize;
        let start = request.params[1].as_u64().unwrap_or(0) as u32;
        match &*self.populated.lock() {
            PopulatedMode::Supported(set) => {
                let blocks: Vec<u32> = set.range(..=start).rev().take(count).copied().collect();
                Ok(json!(blocks))
            }
            PopulatedMode::MethodNotFound => {
                Err(ClientRpcError::new(-32601, "Method not found"))
            }
            PopulatedMode::Failing => Err(ClientRpcError::internal("HTTP error: timed out")),
        }
    }
}

#[async_trait]
impl BlockchainRpc for ScriptedNode {
    async fn get_block_count(&self) -> RpcResult<u32> {
        self.block_count_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_block_count.lock() {
            return Err(ClientRpcError::internal("HTTP error: connection refused"));
        }
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn get_block(&self, index_or_hash: &str, _verbose: bool) -> RpcResult<Value> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let height = self.height.load(Ordering::SeqCst);
        let index = match index_or_hash.parse::<u32>() {
            Ok(index) => index,
            Err(_) => (0..height)
                .find(|i| block_hash(*i) == index_or_hash)
                .ok_or_else(|| ClientRpcError::new(-100, "Unknown block"))?,
        };
        if index >= height {
            return Err(ClientRpcError::new(-100, "Unknown block"));
        }
        Ok(json!({"hash": block_hash(index), "index": index, "tx": []}))
    }

    async fn get_raw_transaction(&self, hash: &str, _verbose: bool) -> RpcResult<Value> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.transactions
            .lock()
            .get(hash)
            .cloned()
            .ok_or_else(|| ClientRpcError::new(-100, "Unknown transaction"))
    }

    async fn query(&self, request: RpcRequest) -> RpcResult<Value> {
        match request.method.as_str() {
            "expressgetpopulatedblocks" => self.populated_page(&request),
            "invokefunction" => {
                self.invoke_calls.fetch_add(1, Ordering::SeqCst);
                self.take_failure()?;
                let contract = request.params[0].as_str().unwrap_or_default().to_string();
                let account = request.params[2][0]["value"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let balances = self.balances.lock();
                let stack = match balances.get(&account) {
                    Some((neo, gas)) => {
                        let value = if contract == neo_blockchain_monitor::address::NEO_SCRIPT_HASH {
                            neo
                        } else {
                            gas
                        };
                        json!([{"type": "Integer", "value": value}])
                    }
                    None => json!([]),
                };
                Ok(json!({"script": "", "state": "HALT", "gasconsumed": "0", "stack": stack}))
            }
            other => Err(ClientRpcError::new(-32601, format!("Method not found: {other}"))),
        }
    }
}

pub fn test_settings() -> MonitorSettings {
    MonitorSettings {
        poll_interval_ms: 60_000,
        ..MonitorSettings::default()
    }
}

/// Monitor without a background loop; tests drive it through `refresh`.
pub fn manual_monitor(node: &Arc<ScriptedNode>) -> Arc<BlockchainMonitor> {
    BlockchainMonitor::builder("http://scripted", node.clone())
        .settings(test_settings())
        .retry_delay(Arc::new(NoDelay))
        .build()
        .expect("monitor")
}
