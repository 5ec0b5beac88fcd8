//! ledger-client: The ledger RPC boundary consumed by Tidepool protocols
//!
//! The AMM client never talks to a node directly; it consumes the
//! [`LedgerClient`] capability set defined here. A concrete implementation
//! (HTTP, in-process simulator, test stub) supplies account/application/asset
//! lookups, box reads, and atomic group submission. Signing is the
//! implementation's concern: a group handed to [`LedgerClient::execute_group`]
//! is signed, submitted, and awaited as one unit.

pub mod encoding;
pub mod txn;
pub mod types;

use async_trait::async_trait;

use tidepool_core::{AppId, AssetId, LedgerError};

pub use txn::{
    AssetTransferTxn, BoxRef, MethodArg, MethodCallTxn, PaymentTxn, SuggestedParams, Transaction,
};
pub use types::{
    AccountInfo, ApplicationInfo, ApplicationParams, AssetHolding, AssetInfo, AssetParams,
    ConfirmedGroup, MethodResult, NodeStatus, PendingTxnResponse, StateEntry, TealValue,
};

/// Result type for ledger client operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Capability set the ledger must provide.
///
/// Errors pass through unchanged; no retry or timeout policy lives behind
/// this trait. Implementations own both.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current node status
    async fn status(&self) -> Result<NodeStatus>;

    /// Suggested parameters for a new transaction
    async fn suggested_params(&self) -> Result<SuggestedParams>;

    /// Account information (balances, holdings, created applications)
    async fn account_information(&self, address: &str) -> Result<AccountInfo>;

    /// Application metadata, including global state and creator
    async fn application_information(&self, app_id: AppId) -> Result<ApplicationInfo>;

    /// Value of a named box under an application
    async fn application_box(&self, app_id: AppId, name: &[u8]) -> Result<Vec<u8>>;

    /// Asset metadata by id
    async fn asset_information(&self, asset_id: AssetId) -> Result<AssetInfo>;

    /// Pending/confirmed transaction details by id
    async fn pending_transaction(&self, tx_id: &str) -> Result<PendingTxnResponse>;

    /// Sign, submit, and await confirmation of an atomic transaction group.
    ///
    /// The group either confirms fully or is rejected as a whole; partial
    /// confirmation does not exist at the ledger level.
    async fn execute_group(&self, group: Vec<Transaction>) -> Result<ConfirmedGroup>;
}
