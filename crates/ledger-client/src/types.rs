//! Wire types for the ledger RPC boundary
//!
//! Shapes follow the node's REST representation (kebab-case field names,
//! base64 byte payloads) so a concrete client can deserialize responses
//! straight into them.

use serde::{Deserialize, Serialize};

use tidepool_core::{AppId, AssetId, Round};

/// Node status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Latest round the node has seen
    #[serde(rename = "last-round")]
    pub last_round: Round,
}

/// A single global-state entry as the node reports it: a base64 key and a
/// typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// Base64-encoded key bytes
    pub key: String,
    pub value: TealValue,
}

/// Raw typed value of a global-state entry.
///
/// `value_type` 1 tags a byte string (carried base64-encoded in `bytes`),
/// 2 tags a 64-bit unsigned integer in `uint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TealValue {
    #[serde(rename = "type")]
    pub value_type: u64,
    #[serde(default)]
    pub bytes: String,
    #[serde(default)]
    pub uint: u64,
}

impl TealValue {
    /// Byte-string value type tag
    pub const BYTES: u64 = 1;
    /// Uint value type tag
    pub const UINT: u64 = 2;

    pub fn uint(v: u64) -> Self {
        Self {
            value_type: Self::UINT,
            bytes: String::new(),
            uint: v,
        }
    }

    pub fn bytes(b64: impl Into<String>) -> Self {
        Self {
            value_type: Self::BYTES,
            bytes: b64.into(),
            uint: 0,
        }
    }
}

/// Application parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationParams {
    /// Address of the account that created the application
    pub creator: String,
    #[serde(rename = "global-state", default)]
    pub global_state: Vec<StateEntry>,
}

/// Application metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub id: AppId,
    pub params: ApplicationParams,
}

/// One asset held by an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssetHolding {
    #[serde(rename = "asset-id")]
    pub asset_id: AssetId,
    pub amount: u64,
}

/// Account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    /// Native coin balance
    pub amount: u64,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
    #[serde(rename = "created-apps", default)]
    pub created_apps: Vec<ApplicationInfo>,
}

/// Asset parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "unit-name", default)]
    pub unit_name: Option<String>,
    pub decimals: u32,
    pub total: u64,
    pub creator: String,
}

/// Asset metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    pub index: AssetId,
    pub params: AssetParams,
}

/// Details of a submitted transaction, pending or confirmed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTxnResponse {
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
    #[serde(rename = "confirmed-round", default)]
    pub confirmed_round: Option<Round>,
    /// Application created by this transaction, if any
    #[serde(rename = "application-index", default)]
    pub application_index: Option<AppId>,
    /// Asset created by this transaction, if any
    #[serde(rename = "asset-index", default)]
    pub asset_index: Option<AssetId>,
    #[serde(rename = "inner-txns", default)]
    pub inner_txns: Vec<serde_json::Value>,
    /// Base64-encoded log entries emitted by the application call
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Return value of one method call inside a confirmed group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodResult {
    pub tx_id: String,
    /// Raw ABI return payload, when the method returns a value
    #[serde(default)]
    pub raw_return: Option<Vec<u8>>,
}

/// Outcome of a confirmed atomic transaction group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedGroup {
    pub confirmed_round: Round,
    pub tx_ids: Vec<String>,
    #[serde(default)]
    pub method_results: Vec<MethodResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teal_value_from_node_json() {
        let v: TealValue = serde_json::from_str(r#"{"type":2,"uint":42}"#).unwrap();
        assert_eq!(v.value_type, TealValue::UINT);
        assert_eq!(v.uint, 42);
        assert!(v.bytes.is_empty());
    }

    #[test]
    fn test_account_info_defaults() {
        let json = r#"{"address":"ADDR","amount":5}"#;
        let info: AccountInfo = serde_json::from_str(json).unwrap();
        assert!(info.assets.is_empty());
        assert!(info.created_apps.is_empty());
    }

    #[test]
    fn test_pending_txn_kebab_fields() {
        let json = r#"{"pool-error":"","confirmed-round":12,"logs":["AAAAAAAAAAE="]}"#;
        let res: PendingTxnResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.confirmed_round, Some(12));
        assert_eq!(res.logs.len(), 1);
    }
}
