//! Transaction group model
//!
//! Unsigned transaction shapes handed to [`crate::LedgerClient::execute_group`].
//! These carry everything the ledger needs to assemble, sign, and submit an
//! atomic group: transfer legs, ABI method calls with their foreign resource
//! lists and box references, and per-transaction fee overrides.

use serde::{Deserialize, Serialize};

use tidepool_core::{AppId, AssetId, MicroUnits, Round};

/// Common parameters for a new transaction, as suggested by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    pub fee: MicroUnits,
    /// When set, `fee` is the exact total fee rather than a per-byte rate
    pub flat_fee: bool,
    pub min_fee: MicroUnits,
    pub first_valid: Round,
    pub last_valid: Round,
    pub genesis_id: String,
    /// Base64-encoded genesis hash
    pub genesis_hash: String,
}

impl SuggestedParams {
    /// Copy of these parameters with an exact flat fee.
    ///
    /// Contract calls that spawn inner transactions must budget the whole
    /// group cost up front; the flat fee covers the outer call plus each
    /// inner transaction.
    pub fn flat(&self, fee: MicroUnits) -> Self {
        Self {
            fee,
            flat_fee: true,
            ..self.clone()
        }
    }
}

/// Native coin payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTxn {
    pub sender: String,
    pub receiver: String,
    pub amount: MicroUnits,
    pub params: SuggestedParams,
}

/// Asset transfer. A zero-amount self-transfer opts the sender into the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransferTxn {
    pub sender: String,
    pub receiver: String,
    pub asset_id: AssetId,
    pub amount: MicroUnits,
    pub params: SuggestedParams,
}

/// Reference to a named application box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRef {
    pub app_id: AppId,
    pub name: Vec<u8>,
}

/// Argument to an ABI method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MethodArg {
    Uint { value: u64 },
    Address { value: String },
    /// A transaction leg consumed by the method as an argument. It is placed
    /// in the group immediately ahead of the call.
    Txn { value: Box<Transaction> },
}

/// ABI method call on an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCallTxn {
    pub sender: String,
    pub app_id: AppId,
    pub method: String,
    pub args: Vec<MethodArg>,
    #[serde(default)]
    pub foreign_assets: Vec<AssetId>,
    #[serde(default)]
    pub foreign_apps: Vec<AppId>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub boxes: Vec<BoxRef>,
    pub params: SuggestedParams,
}

/// One unsigned transaction in an atomic group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transaction {
    Payment(PaymentTxn),
    AssetTransfer(AssetTransferTxn),
    MethodCall(MethodCallTxn),
}

impl Transaction {
    /// Zero-amount self-transfer that opts `sender` into `asset_id`.
    ///
    /// Holding any asset requires this once per account; it is emitted ahead
    /// of operations that would deliver a new asset to the sender.
    pub fn opt_in(sender: &str, asset_id: AssetId, params: &SuggestedParams) -> Self {
        Self::AssetTransfer(AssetTransferTxn {
            sender: sender.to_string(),
            receiver: sender.to_string(),
            asset_id,
            amount: 0,
            params: params.clone(),
        })
    }

    /// Sender of this transaction
    pub fn sender(&self) -> &str {
        match self {
            Self::Payment(t) => &t.sender,
            Self::AssetTransfer(t) => &t.sender,
            Self::MethodCall(t) => &t.sender,
        }
    }

    /// Flat fee of this transaction, when one is set
    pub fn flat_fee(&self) -> Option<MicroUnits> {
        let params = match self {
            Self::Payment(t) => &t.params,
            Self::AssetTransfer(t) => &t.params,
            Self::MethodCall(t) => &t.params,
        };
        params.flat_fee.then_some(params.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 0,
            flat_fee: false,
            min_fee: 1000,
            first_valid: 10,
            last_valid: 1010,
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: String::new(),
        }
    }

    #[test]
    fn test_flat_fee_override() {
        let sp = params().flat(12_000);
        assert!(sp.flat_fee);
        assert_eq!(sp.fee, 12_000);
        assert_eq!(sp.last_valid, 1010);
    }

    #[test]
    fn test_opt_in_is_zero_self_transfer() {
        let txn = Transaction::opt_in("SENDER", 55, &params());
        match txn {
            Transaction::AssetTransfer(t) => {
                assert_eq!(t.sender, t.receiver);
                assert_eq!(t.amount, 0);
                assert_eq!(t.asset_id, 55);
            }
            _ => panic!("expected asset transfer"),
        }
    }

    #[test]
    fn test_transaction_serde_round_trip() {
        let txn = Transaction::Payment(PaymentTxn {
            sender: "A".into(),
            receiver: "B".into(),
            amount: 7,
            params: params(),
        });
        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);
    }
}
