// Copyright (C) 2015-2025 The Neo Project.
//
// models.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Chain data as seen by the monitor.

use crate::error::{MonitorError, MonitorResult};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A verbose `getblock` result. Only `hash` and `index` are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub index: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn from_json(value: Value) -> MonitorResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| MonitorError::invalid_response(format!("getblock: {e}")))
    }

    /// Hashes of the transactions carried in the block, when present.
    pub fn transaction_hashes(&self) -> Vec<String> {
        self.extra
            .get("tx")
            .and_then(Value::as_array)
            .map(|txs| {
                txs.iter()
                    .filter_map(|tx| tx.get("hash").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn matches(&self, reference: &BlockRef) -> bool {
        match reference {
            BlockRef::Index(index) => self.index == *index,
            BlockRef::Hash(hash) => same_hash(&self.hash, hash),
        }
    }
}

/// A verbose `getrawtransaction` result, keyed by `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn from_json(value: Value) -> MonitorResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| MonitorError::invalid_response(format!("getrawtransaction: {e}")))
    }
}

/// Block lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Index(u32),
    Hash(String),
}

impl BlockRef {
    /// Decimal text is an index, anything else a hash.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<u32>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Hash(text.to_string()),
        }
    }

    /// Form sent over RPC.
    pub fn to_param(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Hash(hash) => f.write_str(hash),
        }
    }
}

impl From<u32> for BlockRef {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for BlockRef {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for BlockRef {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

/// NEO and GAS holdings of an address, computed live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBalance {
    pub address: String,
    pub neo_balance: BigInt,
    pub gas_balance: BigInt,
}

/// Compares hashes ignoring case and an optional `0x` prefix.
pub(crate) fn same_hash(a: &str, b: &str) -> bool {
    fn strip(h: &str) -> &str {
        h.strip_prefix("0x")
            .or_else(|| h.strip_prefix("0X"))
            .unwrap_or(h)
    }
    strip(a.trim()).eq_ignore_ascii_case(strip(b.trim()))
}
