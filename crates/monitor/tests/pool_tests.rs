//! Sharing monitors between consumers of one endpoint.

mod common;

use common::{test_settings, ScriptedNode};
use neo_blockchain_monitor::{BlockchainMonitorPool, MonitorError, NoDelay};
use neo_rpc_client::{BlockchainRpc, ClientRpcError, RpcResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

const LOCAL: &str = "http://127.0.0.1:50012";
const REMOTE: &str = "http://seed1.neo.org:10332";

/// Pool whose connector hands out one scripted node per URL.
fn scripted_pool() -> (BlockchainMonitorPool, Arc<Mutex<HashMap<String, Arc<ScriptedNode>>>>) {
    let nodes: Arc<Mutex<HashMap<String, Arc<ScriptedNode>>>> = Arc::default();
    let registry = Arc::clone(&nodes);
    let connector = move |url: &str| -> RpcResult<Arc<dyn BlockchainRpc>> {
        if !url.starts_with("http") {
            return Err(ClientRpcError::internal(format!("invalid url {url}")));
        }
        let node = Arc::clone(
            registry
                .lock()
                .entry(url.to_string())
                .or_insert_with(|| ScriptedNode::new(10)),
        );
        Ok(node)
    };
    let pool = BlockchainMonitorPool::with_parts(test_settings(), Arc::new(connector), Arc::new(NoDelay));
    (pool, nodes)
}

#[tokio::test]
async fn same_url_shares_one_monitor() {
    let (pool, _) = scripted_pool();
    let first = pool.get_monitor(LOCAL).unwrap();
    let second = pool.get_monitor(LOCAL).unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!(pool.monitor_count(), 1);
    assert_eq!(pool.reference_count(LOCAL), 2);
    assert_eq!(first.url(), LOCAL);
}

#[tokio::test]
async fn different_urls_get_distinct_monitors() {
    let (pool, _) = scripted_pool();
    let local = pool.get_monitor(LOCAL).unwrap();
    let remote = pool.get_monitor(REMOTE).unwrap();

    assert!(!local.ptr_eq(&remote));
    assert_eq!(pool.monitor_count(), 2);
    assert_eq!(pool.reference_count(LOCAL), 1);
    assert_eq!(pool.reference_count(REMOTE), 1);
}

#[tokio::test]
async fn last_release_disposes_and_next_get_starts_fresh() {
    let (pool, _) = scripted_pool();
    let first = pool.get_monitor(LOCAL).unwrap();
    let second = pool.get_monitor(LOCAL).unwrap();
    first.refresh().await.unwrap();
    first.get_block(2u32, true).await.unwrap();
    assert_eq!(second.cached_block_count(), 1);
    let original = Arc::clone(first.monitor());

    first.release();
    assert_eq!(pool.reference_count(LOCAL), 1);
    assert!(!original.is_disposed());

    drop(second);
    assert_eq!(pool.monitor_count(), 0);
    assert_eq!(pool.reference_count(LOCAL), 0);
    assert!(original.is_disposed());

    let fresh = pool.get_monitor(LOCAL).unwrap();
    assert!(!Arc::ptr_eq(fresh.monitor(), &original));
    assert_eq!(fresh.cached_block_count(), 0);
    assert_eq!(pool.reference_count(LOCAL), 1);
}

#[tokio::test]
async fn cloned_handle_holds_its_own_reference() {
    let (pool, _) = scripted_pool();
    let handle = pool.get_monitor(LOCAL).unwrap();
    let copy = handle.clone();
    assert_eq!(pool.reference_count(LOCAL), 2);

    drop(handle);
    assert!(!copy.is_disposed());
    drop(copy);
    assert_eq!(pool.monitor_count(), 0);
}

#[tokio::test]
async fn stale_handle_does_not_release_replacement() {
    let (pool, _) = scripted_pool();
    let old = pool.get_monitor(LOCAL).unwrap();
    pool.dispose_all();
    assert!(old.is_disposed());

    let current = pool.get_monitor(LOCAL).unwrap();
    drop(old);
    assert_eq!(pool.reference_count(LOCAL), 1);
    assert!(!current.is_disposed());
}

#[tokio::test]
async fn connector_failure_registers_nothing() {
    let (pool, nodes) = scripted_pool();
    let err = pool.get_monitor("ftp://nowhere").unwrap_err();
    assert!(matches!(err, MonitorError::Rpc(_)));
    assert_eq!(pool.monitor_count(), 0);
    assert!(nodes.lock().is_empty());
}

#[tokio::test]
async fn pooled_monitor_uses_its_own_node() {
    let (pool, nodes) = scripted_pool();
    let local = pool.get_monitor(LOCAL).unwrap();
    let remote = pool.get_monitor(REMOTE).unwrap();
    nodes.lock()[REMOTE].set_height(42);

    local.refresh().await.unwrap();
    remote.refresh().await.unwrap();
    assert_eq!(local.block_height(), 10);
    assert_eq!(remote.block_height(), 42);
}

#[tokio::test]
async fn directly_disposed_monitor_is_replaced() {
    let (pool, _) = scripted_pool();
    let first = pool.get_monitor(LOCAL).unwrap();
    first.dispose();

    let second = pool.get_monitor(LOCAL).unwrap();
    assert!(!second.is_disposed());
    assert!(!first.ptr_eq(&second));
    assert_eq!(pool.reference_count(LOCAL), 1);

    // releasing the dead handle leaves the replacement's count alone
    drop(first);
    assert_eq!(pool.reference_count(LOCAL), 1);
    assert!(!second.is_disposed());
}

#[test]
fn get_monitor_outside_runtime_is_an_error() {
    let (pool, _) = scripted_pool();
    let err = pool.get_monitor(LOCAL).unwrap_err();
    assert!(matches!(err, MonitorError::Config(_)));
    assert_eq!(pool.monitor_count(), 0);
}
