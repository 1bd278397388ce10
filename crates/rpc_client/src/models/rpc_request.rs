// Copyright (C) 2015-2025 The Neo Project.
//
// rpc_request.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,

    /// Method name
    pub method: String,

    /// Positional parameters
    #[serde(default)]
    pub params: Vec<Value>,

    /// Request ID
    pub id: u64,
}

impl RpcRequest {
    /// Creates a new request with id 1; the client renumbers it on send.
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id: 1,
        }
    }

    /// Returns the request with a different id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rpc_request_serializes_jsonrpc_envelope() {
        let req = RpcRequest::new("getblock", vec![json!(12), json!(true)]).with_id(7);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "getblock", "params": [12, true], "id": 7})
        );
    }

    #[test]
    fn rpc_request_defaults_missing_params() {
        let parsed: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"getversion","id":3}"#).unwrap();
        assert_eq!(parsed.method, "getversion");
        assert_eq!(parsed.id, 3);
        assert!(parsed.params.is_empty());
    }
}
