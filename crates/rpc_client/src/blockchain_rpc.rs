// Copyright (C) 2015-2025 The Neo Project.
//
// blockchain_rpc.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use crate::error::{ClientRpcError, RpcResult};
use crate::models::{RpcInvokeResult, RpcRequest};
use async_trait::async_trait;
use serde_json::{json, Value};

/// The subset of node RPC that chain monitoring depends on.
///
/// [`crate::RpcClient`] implements it over HTTP; tests substitute scripted
/// in-memory nodes.
#[async_trait]
pub trait BlockchainRpc: Send + Sync {
    /// `getblockcount`: number of blocks in the main chain.
    async fn get_block_count(&self) -> RpcResult<u32>;

    /// `getblock` by decimal index or hash.
    async fn get_block(&self, index_or_hash: &str, verbose: bool) -> RpcResult<Value>;

    /// `getrawtransaction` by hash.
    async fn get_raw_transaction(&self, hash: &str, verbose: bool) -> RpcResult<Value>;

    /// Sends an arbitrary request and returns its `result` member.
    async fn query(&self, request: RpcRequest) -> RpcResult<Value>;

    /// `invokefunction` on a deployed contract without persisting state.
    async fn invoke_function(
        &self,
        script_hash: &str,
        operation: &str,
        params: Vec<Value>,
    ) -> RpcResult<RpcInvokeResult> {
        let request = RpcRequest::new(
            "invokefunction",
            vec![json!(script_hash), json!(operation), Value::Array(params)],
        );
        let result = self.query(request).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientRpcError::parse(format!("invokefunction: {e}")))
    }
}

/// Encodes a block reference the way nodes expect it: indexes as numbers,
/// everything else as strings.
pub fn hash_or_index_param(hash_or_index: &str) -> Value {
    match hash_or_index.trim().parse::<u32>() {
        Ok(index) => json!(index),
        Err(_) => json!(hash_or_index),
    }
}
