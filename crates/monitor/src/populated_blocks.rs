// Copyright (C) 2015-2025 The Neo Project.
//
// populated_blocks.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Tracks which block heights carry transactions, learned from the
//! neo-express `expressgetpopulatedblocks` extension.

use bitvec::vec::BitVec;
use neo_rpc_client::{BlockchainRpc, ClientRpcError, RpcRequest, RpcResult};
use serde_json::{json, Value};
use tracing::debug;

/// Simulator-only RPC method listing populated block indexes.
pub const POPULATED_BLOCKS_METHOD: &str = "expressgetpopulatedblocks";

/// Feature-detection state of the populated-block filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// Never probed, or probed only with transient failures.
    Untried,
    /// The node answers the extension method.
    Available,
    /// The node does not implement the method. Terminal.
    Unavailable,
}

/// Growable bitmap of populated block heights.
#[derive(Debug, Clone)]
pub struct PopulatedBlockIndex {
    state: FilterState,
    bits: BitVec,
    synced_height: Option<u32>,
    cache_id: Option<String>,
}

/// Result of one backward walk over the extension method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulatedBlocksScan {
    /// Height the walk started from.
    pub head: u32,
    /// Populated indexes discovered, newest first.
    pub indexes: Vec<u32>,
    /// Cache identity reported by the simulator, if any.
    pub cache_id: Option<String>,
    /// The simulator reported a different cache identity than before.
    pub cache_reset: bool,
    /// RPC calls made.
    pub pages: u32,
}

impl Default for PopulatedBlockIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulatedBlockIndex {
    pub fn new() -> Self {
        Self {
            state: FilterState::Untried,
            bits: BitVec::new(),
            synced_height: None,
            cache_id: None,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn is_filter_available(&self) -> bool {
        self.state == FilterState::Available
    }

    pub fn is_unavailable(&self) -> bool {
        self.state == FilterState::Unavailable
    }

    /// Highest height covered by a completed walk.
    pub fn synced_height(&self) -> Option<u32> {
        self.synced_height
    }

    pub fn cache_id(&self) -> Option<&str> {
        self.cache_id.as_deref()
    }

    /// UI hint only: answers `true` whenever the filter cannot tell.
    pub fn is_block_populated(&self, index: u32) -> bool {
        if self.state != FilterState::Available {
            return true;
        }
        match self.synced_height {
            Some(synced) if index <= synced => self
                .bits
                .get(index as usize)
                .map(|bit| *bit)
                .unwrap_or(false),
            _ => true,
        }
    }

    /// Number of heights known to be populated.
    pub fn populated_count(&self) -> usize {
        self.bits.count_ones()
    }

    fn mark(&mut self, index: u32) {
        let index = index as usize;
        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }
        self.bits.set(index, true);
    }

    /// Records a completed walk.
    pub fn apply(&mut self, scan: PopulatedBlocksScan) {
        if scan.cache_reset {
            self.bits.clear();
        }
        for index in &scan.indexes {
            self.mark(*index);
        }
        self.state = FilterState::Available;
        self.synced_height = Some(scan.head);
        if scan.cache_id.is_some() {
            self.cache_id = scan.cache_id;
        }
    }

    /// Permanently disables the filter.
    pub fn mark_unavailable(&mut self) {
        self.state = FilterState::Unavailable;
        self.bits = BitVec::new();
        self.synced_height = None;
        self.cache_id = None;
    }

    /// Forgets every bit after a chain reset. An unavailable filter stays
    /// unavailable.
    pub fn reset(&mut self) {
        self.bits.clear();
        self.synced_height = None;
        self.cache_id = None;
        if self.state != FilterState::Unavailable {
            self.state = FilterState::Untried;
        }
    }
}

/// Walks backward from `head` in pages of `page_size`, stopping once the walk
/// reaches `synced_height`, block 0, or a page with no results.
pub async fn scan_populated_blocks(
    rpc: &dyn BlockchainRpc,
    head: u32,
    synced_height: Option<u32>,
    known_cache_id: Option<&str>,
    page_size: u32,
) -> RpcResult<PopulatedBlocksScan> {
    let mut scan = PopulatedBlocksScan {
        head,
        ..PopulatedBlocksScan::default()
    };
    let mut stop_at = synced_height;
    let mut cursor = head;

    loop {
        let request = RpcRequest::new(
            POPULATED_BLOCKS_METHOD,
            vec![json!(page_size), json!(cursor)],
        );
        let result = rpc.query(request).await?;
        scan.pages += 1;

        let (cache_id, blocks) = parse_populated_blocks(&result)?;
        if scan.pages == 1 {
            if let (Some(known), Some(reported)) = (known_cache_id, cache_id.as_deref()) {
                if known != reported {
                    debug!(known, reported, "populated block cache identity changed");
                    scan.cache_reset = true;
                    stop_at = None;
                }
            }
            scan.cache_id = cache_id;
        }

        let page: Vec<u32> = blocks.into_iter().filter(|index| *index <= cursor).collect();
        let Some(oldest) = page.iter().copied().min() else {
            break;
        };
        scan.indexes.extend(page);

        if oldest == 0 || stop_at.is_some_and(|synced| oldest <= synced) {
            break;
        }
        cursor = oldest - 1;
    }

    Ok(scan)
}

/// Accepts either a bare index array or `{ "cacheId": .., "blocks": [..] }`.
fn parse_populated_blocks(result: &Value) -> RpcResult<(Option<String>, Vec<u32>)> {
    let (cache_id, blocks) = match result {
        Value::Array(blocks) => (None, blocks),
        Value::Object(obj) => {
            let blocks = obj
                .get("blocks")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ClientRpcError::parse(format!("{POPULATED_BLOCKS_METHOD}: missing blocks"))
                })?;
            let cache_id = obj.get("cacheId").and_then(|id| match id {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            });
            (cache_id, blocks)
        }
        _ => {
            return Err(ClientRpcError::parse(format!(
                "{POPULATED_BLOCKS_METHOD}: unexpected result"
            )))
        }
    };

    let indexes = blocks
        .iter()
        .map(|value| {
            value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    ClientRpcError::parse(format!("{POPULATED_BLOCKS_METHOD}: bad index {value}"))
                })
        })
        .collect::<RpcResult<Vec<u32>>>()?;

    Ok((cache_id, indexes))
}
