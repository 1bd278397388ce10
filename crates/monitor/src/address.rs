// Copyright (C) 2015-2025 The Neo Project.
//
// address.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Neo N3 address to script hash conversion.

use crate::error::{MonitorError, MonitorResult};
use sha2::{Digest, Sha256};

/// Address version byte for Neo N3.
pub const ADDRESS_VERSION: u8 = 0x35;

const SCRIPT_HASH_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

/// Script hash of the NEO native contract.
pub const NEO_SCRIPT_HASH: &str = "0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5";
/// Script hash of the GAS native contract.
pub const GAS_SCRIPT_HASH: &str = "0xd2a4cff31913016155e38e474a2c06d08be276cf";

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Converts a Neo address, or an already formatted `0x` script hash, to the
/// big-endian `0x`-prefixed script hash used in contract parameters.
pub fn script_hash_from_address(address: &str) -> MonitorResult<String> {
    let address = address.trim();

    if let Some(hex_part) = address.strip_prefix("0x") {
        let bytes = hex::decode(hex_part)
            .map_err(|e| MonitorError::InvalidAddress(format!("{address}: {e}")))?;
        if bytes.len() != SCRIPT_HASH_LEN {
            return Err(MonitorError::InvalidAddress(format!(
                "{address}: script hash must be {SCRIPT_HASH_LEN} bytes"
            )));
        }
        return Ok(format!("0x{}", hex::encode(bytes)));
    }

    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| MonitorError::InvalidAddress(format!("{address}: {e}")))?;
    if data.len() != 1 + SCRIPT_HASH_LEN + CHECKSUM_LEN {
        return Err(MonitorError::InvalidAddress(format!(
            "{address}: unexpected length {}",
            data.len()
        )));
    }

    let (payload, check) = data.split_at(1 + SCRIPT_HASH_LEN);
    if checksum(payload) != check {
        return Err(MonitorError::InvalidAddress(format!("{address}: bad checksum")));
    }
    if payload[0] != ADDRESS_VERSION {
        return Err(MonitorError::InvalidAddress(format!(
            "{address}: unsupported version 0x{:02x}",
            payload[0]
        )));
    }

    let mut hash = payload[1..].to_vec();
    hash.reverse();
    Ok(format!("0x{}", hex::encode(hash)))
}

/// Encodes a big-endian `0x` script hash as a Neo address.
pub fn address_from_script_hash(script_hash: &str) -> MonitorResult<String> {
    let normalized = script_hash_from_address(script_hash)?;
    let mut hash = hex::decode(&normalized[2..])
        .map_err(|e| MonitorError::InvalidAddress(format!("{script_hash}: {e}")))?;
    hash.reverse();

    let mut data = Vec::with_capacity(1 + SCRIPT_HASH_LEN + CHECKSUM_LEN);
    data.push(ADDRESS_VERSION);
    data.extend_from_slice(&hash);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    Ok(bs58::encode(data).into_string())
}
