//! Error types for Tidepool

use thiserror::Error;

/// Core errors that can occur in Tidepool
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Ledger connection and query errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Node unreachable at {url}")]
    Unreachable { url: String },

    #[error("Node returned error: {message}")]
    Api { message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Box not found under application {app_id}")]
    BoxNotFound { app_id: u64 },

    #[error("Asset not found: {asset_id}")]
    AssetNotFound { asset_id: u64 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Transaction group rejected: {message}")]
    GroupRejected { message: String },

    #[error("Transaction not confirmed: {tx_id}")]
    NotConfirmed { tx_id: String },
}

/// Result type alias for Tidepool operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_wraps_into_core_error() {
        let err: Error = LedgerError::BoxNotFound { app_id: 7 }.into();
        assert!(err.to_string().contains("application 7"));
    }
}
