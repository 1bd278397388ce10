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

//! Neo RPC Client Library
//!
//! A JSON-RPC 2.0 client for Neo N3 nodes and the neo-express simulator,
//! plus the [`BlockchainRpc`] trait that chain monitors are written against.

mod blockchain_rpc;
mod error;
pub mod models;
mod rpc_client;

pub use blockchain_rpc::{hash_or_index_param, BlockchainRpc};
pub use error::{ClientRpcError, RpcResult, INTERNAL_ERROR, METHOD_NOT_FOUND, PARSE_ERROR};
pub use rpc_client::{RpcClient, RpcClientBuilder, DEFAULT_HTTP_TIMEOUT};

// Re-export commonly used types
pub use models::{RpcInvokeResult, RpcRequest, RpcResponse, RpcResponseError, RpcStackItem};
