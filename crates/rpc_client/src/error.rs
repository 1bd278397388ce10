// Copyright (C) 2015-2025 The Neo Project.
//
// error.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use thiserror::Error;

/// JSON-RPC parse error code.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC method-not-found error code.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC internal error code, also used for transport failures.
pub const INTERNAL_ERROR: i32 = -32603;

/// Error returned by any RPC call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ClientRpcError {
    /// Error code, either node-provided or one of the JSON-RPC constants
    pub code: i32,

    /// Error message
    pub message: String,
}

impl ClientRpcError {
    /// Creates a new RPC error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Transport or internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Malformed response payload.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    /// Error code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// True when the node does not implement the requested method.
    ///
    /// Nodes disagree on the code they return, so the message is matched too.
    pub fn is_method_not_found(&self) -> bool {
        self.code == METHOD_NOT_FOUND
            || self.message.to_ascii_lowercase().contains("method not found")
    }
}

/// Result type for RPC calls.
pub type RpcResult<T> = std::result::Result<T, ClientRpcError>;
