//! Core type definitions for Tidepool

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger application id
pub type AppId = u64;

/// Ledger asset id. Id 0 is reserved for the native coin.
pub type AssetId = u64;

/// Confirmed ledger round
pub type Round = u64;

/// Amount in the smallest unit of an asset (or the native coin)
pub type MicroUnits = u64;

/// Constants
pub mod constants {
    use super::AssetId;

    /// Asset id of the ledger's native coin. Not a queryable asset record.
    pub const NATIVE_ASSET_ID: AssetId = 0;

    /// Byte length of a raw account public key
    pub const PUBLIC_KEY_LEN: usize = 32;

    /// Byte length of an address checksum
    pub const CHECKSUM_LEN: usize = 4;

    /// Character length of an encoded account address
    pub const ADDRESS_LEN: usize = 58;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Mainnet.as_str(), "mainnet");
        assert_eq!(Network::Testnet.as_str(), "testnet");
    }
}
