// Copyright (C) 2015-2025 The Neo Project.
//
// rpc_invoke_result.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of `invokefunction` / `invokescript`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcInvokeResult {
    /// The script that was invoked (base64)
    #[serde(default)]
    pub script: String,

    /// VM execution state, `HALT` or `FAULT`
    #[serde(default)]
    pub state: String,

    /// Gas consumed during execution, as a decimal string
    #[serde(default, rename = "gasconsumed")]
    pub gas_consumed: String,

    /// Stack items after execution
    #[serde(default)]
    pub stack: Vec<RpcStackItem>,

    /// Exception message if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

/// A single VM stack item in JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcStackItem {
    /// Stack item type, e.g. `Integer`, `ByteString`
    #[serde(rename = "type")]
    pub item_type: String,

    /// Raw value; integers are encoded as decimal strings
    #[serde(default)]
    pub value: Value,
}

impl RpcInvokeResult {
    /// True when the VM halted normally.
    pub fn is_halt(&self) -> bool {
        self.state.eq_ignore_ascii_case("HALT")
    }

    /// Returns the first stack item, if any.
    pub fn first_stack_item(&self) -> Option<&RpcStackItem> {
        self.stack.first()
    }
}

impl RpcStackItem {
    /// Integer stack item value as its decimal text.
    pub fn integer_text(&self) -> Option<String> {
        match &self.value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_balance_of_result() {
        let result: RpcInvokeResult = serde_json::from_str(
            r#"{"script":"AA==","state":"HALT","gasconsumed":"2028330","stack":[{"type":"Integer","value":"100"}]}"#,
        )
        .unwrap();
        assert!(result.is_halt());
        assert_eq!(result.gas_consumed, "2028330");
        let item = result.first_stack_item().unwrap();
        assert_eq!(item.item_type, "Integer");
        assert_eq!(item.integer_text().as_deref(), Some("100"));
    }

    #[test]
    fn fault_result_with_empty_stack() {
        let result: RpcInvokeResult = serde_json::from_str(
            r#"{"script":"AA==","state":"FAULT","gasconsumed":"0","exception":"boom","stack":[]}"#,
        )
        .unwrap();
        assert!(!result.is_halt());
        assert!(result.first_stack_item().is_none());
        assert_eq!(result.exception.as_deref(), Some("boom"));
    }
}
