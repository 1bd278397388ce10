// Copyright (C) 2015-2025 The Neo Project.
//
// rpc_client.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use crate::blockchain_rpc::{hash_or_index_param, BlockchainRpc};
use crate::error::{ClientRpcError, RpcResult};
use crate::models::{RpcRequest, RpcResponse};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP JSON-RPC client for a single node endpoint
pub struct RpcClient {
    base_address: Url,
    http_client: Client,
    next_id: AtomicU64,
}

/// Builder for [`RpcClient`]
#[derive(Debug, Clone)]
pub struct RpcClientBuilder {
    url: Url,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl RpcClientBuilder {
    /// Starts a builder for the given endpoint.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Sends HTTP basic auth with every request.
    #[must_use]
    pub fn basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), pass.into()));
        self
    }

    /// Applies basic auth only when both halves are present.
    #[must_use]
    pub fn with_optional_auth(self, user: Option<String>, pass: Option<String>) -> Self {
        match (user, pass) {
            (Some(user), Some(pass)) => self.basic_auth(user, pass),
            _ => self,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> RpcResult<RpcClient> {
        let mut builder = Client::builder().timeout(self.timeout);

        if let Some((user, pass)) = self.credentials {
            let encoded = general_purpose::STANDARD.encode(format!("{user}:{pass}"));
            let value = HeaderValue::from_str(&format!("Basic {encoded}"))
                .map_err(|e| ClientRpcError::internal(format!("Invalid credentials: {e}")))?;
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let http_client = builder
            .build()
            .map_err(|e| ClientRpcError::internal(format!("HTTP client error: {e}")))?;

        Ok(RpcClient::with_client(http_client, self.url))
    }
}

impl RpcClient {
    /// Creates a configurable builder for the RPC client.
    #[must_use]
    pub fn builder(url: Url) -> RpcClientBuilder {
        RpcClientBuilder::new(url)
    }

    /// Creates a client with default settings from a URL string.
    pub fn connect(url: &str) -> RpcResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| ClientRpcError::internal(format!("Invalid RPC url {url}: {e}")))?;
        Self::builder(url).build()
    }

    /// Creates a new RPC client with an existing HTTP client
    #[must_use]
    pub fn with_client(client: Client, url: Url) -> Self {
        Self {
            base_address: url,
            http_client: client,
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoint this client talks to.
    pub fn url(&self) -> &Url {
        &self.base_address
    }

    fn parse_response(content: &str) -> RpcResult<Value> {
        let response: RpcResponse = serde_json::from_str(content)
            .map_err(|e| ClientRpcError::parse(format!("Invalid response: {e}")))?;

        if let Some(error) = response.error {
            return Err(ClientRpcError::new(error.code, error.message));
        }

        response
            .result
            .ok_or_else(|| ClientRpcError::internal("No result returned"))
    }

    /// Posts a request and returns its `result` member.
    pub async fn send_async(&self, request: RpcRequest) -> RpcResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = request.with_id(id);
        trace!(method = %request.method, id, "sending rpc request");

        let response = self
            .http_client
            .post(self.base_address.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientRpcError::internal(format!("HTTP error: {e}")))?;

        let content = response
            .text()
            .await
            .map_err(|e| ClientRpcError::internal(format!("Failed to read response: {e}")))?;

        Self::parse_response(&content)
    }

    /// Sends `method` with positional `params`.
    pub async fn rpc_send_async(&self, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        self.send_async(RpcRequest::new(method, params)).await
    }
}

#[async_trait]
impl BlockchainRpc for RpcClient {
    async fn get_block_count(&self) -> RpcResult<u32> {
        let result = self.rpc_send_async("getblockcount", vec![]).await?;
        token_as_u32(&result, "getblockcount")
    }

    async fn get_block(&self, index_or_hash: &str, verbose: bool) -> RpcResult<Value> {
        self.rpc_send_async(
            "getblock",
            vec![hash_or_index_param(index_or_hash), json!(verbose)],
        )
        .await
    }

    async fn get_raw_transaction(&self, hash: &str, verbose: bool) -> RpcResult<Value> {
        self.rpc_send_async("getrawtransaction", vec![json!(hash), json!(verbose)])
            .await
    }

    async fn query(&self, request: RpcRequest) -> RpcResult<Value> {
        self.send_async(request).await
    }
}

fn token_as_u32(token: &Value, context: &str) -> RpcResult<u32> {
    token
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ClientRpcError::internal(format!("{context}: expected numeric token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_maps_node_error() {
        let err = RpcClient::parse_response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-100,"message":"Unknown block"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code, -100);
        assert_eq!(err.message, "Unknown block");
    }

    #[test]
    fn parse_response_rejects_garbage() {
        let err = RpcClient::parse_response("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.code, crate::error::PARSE_ERROR);
    }

    #[test]
    fn parse_response_requires_result() {
        let err = RpcClient::parse_response(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.code, crate::error::INTERNAL_ERROR);
    }

    #[test]
    fn token_as_u32_rejects_non_numbers() {
        assert_eq!(token_as_u32(&json!(12), "x").unwrap(), 12);
        assert!(token_as_u32(&json!("12"), "x").is_err());
        assert!(token_as_u32(&json!(-1), "x").is_err());
    }

    #[test]
    fn connect_rejects_invalid_url() {
        assert!(RpcClient::connect("not a url").is_err());
    }
}
