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

//! Error types for chain monitoring.

use neo_rpc_client::ClientRpcError;
use thiserror::Error;

/// Errors surfaced by monitors and the monitor pool.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A single RPC call failed and no retry was requested.
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientRpcError),

    /// Every allowed attempt failed.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Operation name, e.g. `getblock 12`.
        operation: String,
        /// Attempts made.
        attempts: u32,
        /// Error from the last attempt.
        #[source]
        source: ClientRpcError,
    },

    /// The node answered with something that does not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Neither a Neo address nor a script hash.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The monitor was disposed while the operation was pending.
    #[error("Monitor has been disposed")]
    Disposed,

    /// Settings failed validation or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// Create an invalid response error.
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// The underlying RPC error, if this error came from the node.
    pub fn rpc_error(&self) -> Option<&ClientRpcError> {
        match self {
            Self::Rpc(err) | Self::RetriesExhausted { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

/// Result type for monitor operations.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;
