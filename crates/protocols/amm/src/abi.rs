//! ABI contract descriptors
//!
//! Static interface metadata for the master, standard-pool, and stable-pool
//! contracts. The two pool variants differ in method signatures: the
//! standard pool takes transaction arguments, the stable pool takes amount
//! arguments plus asset-transfer legs.

use serde::{Deserialize, Serialize};

use crate::state::AmmError;

/// One argument of an ABI method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiArg {
    #[serde(rename = "type")]
    pub arg_type: String,
    pub name: String,
}

/// Return type of an ABI method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiReturn {
    #[serde(rename = "type")]
    pub return_type: String,
}

/// One ABI method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiMethod {
    pub name: String,
    pub args: Vec<AbiArg>,
    pub returns: AbiReturn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// An ABI contract descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiContract {
    pub name: String,
    pub methods: Vec<AbiMethod>,
}

impl AbiContract {
    /// Look up a method by name, failing with [`AmmError::UnknownMethod`]
    pub fn method_by_name(&self, name: &str) -> Result<&AbiMethod, AmmError> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| AmmError::UnknownMethod(name.to_string()))
    }
}

fn arg(arg_type: &str, name: &str) -> AbiArg {
    AbiArg {
        arg_type: arg_type.to_string(),
        name: name.to_string(),
    }
}

fn method(name: &str, args: Vec<AbiArg>, return_type: &str, desc: Option<&str>) -> AbiMethod {
    AbiMethod {
        name: name.to_string(),
        args,
        returns: AbiReturn {
            return_type: return_type.to_string(),
        },
        desc: desc.map(str::to_string),
    }
}

/// Master contract: pool registry and factory
pub fn master_contract() -> AbiContract {
    AbiContract {
        name: "Master".to_string(),
        methods: vec![
            method(
                "set_governor",
                vec![arg("account", "new_governor")],
                "void",
                Some("sets the governor of the contract, may only be called by the current governor"),
            ),
            method(
                "create_pool",
                vec![
                    arg("pay", "seed"),
                    arg("uint64", "asset_a"),
                    arg("uint64", "asset_b"),
                ],
                "uint64",
                Some("creates and bootstraps a pool for the canonical pair"),
            ),
        ],
    }
}

/// Standard constant-product pool contract
pub fn pool_contract() -> AbiContract {
    AbiContract {
        name: "Pool".to_string(),
        methods: vec![
            method(
                "set_governor",
                vec![arg("account", "new_governor")],
                "void",
                Some("sets the governor of the contract, may only be called by the current governor"),
            ),
            method(
                "bootstrap",
                vec![arg("uint64", "asset_a"), arg("uint64", "asset_b")],
                "void",
                Some("bootstraps the contract by opting into the assets and creating the pool token."),
            ),
            method(
                "fund",
                vec![arg("txn", "txn_a"), arg("txn", "txn_b")],
                "void",
                None,
            ),
            method(
                "mint",
                vec![
                    arg("txn", "txn_a"),
                    arg("txn", "txn_b"),
                    arg("uint64", "min_mint_amt"),
                ],
                "uint64",
                None,
            ),
            method(
                "burn",
                vec![
                    arg("axfer", "pool_token_txn"),
                    arg("uint64", "min_a_amt"),
                    arg("uint64", "min_b_amt"),
                ],
                "void",
                None,
            ),
            method(
                "swap",
                vec![arg("txn", "in_txn"), arg("uint64", "min_swap_amt")],
                "uint64",
                None,
            ),
        ],
    }
}

/// Stable pool contract (amplified curve, pegged assets)
pub fn stable_contract() -> AbiContract {
    AbiContract {
        name: "StablePool".to_string(),
        methods: vec![
            method(
                "set_governor",
                vec![arg("account", "new_governor")],
                "void",
                Some("sets the governor of the contract, may only be called by the current governor"),
            ),
            method(
                "bootstrap",
                vec![arg("uint64", "asset_a"), arg("uint64", "asset_b")],
                "void",
                Some("bootstraps the contract by opting into the assets and creating the pool token."),
            ),
            method(
                "fund",
                vec![arg("axfer", "txn_a"), arg("axfer", "txn_b")],
                "void",
                None,
            ),
            method(
                "mint",
                vec![
                    arg("uint64", "a_amt"),
                    arg("uint64", "b_amt"),
                    arg("uint64", "min_mint_amt"),
                    arg("axfer", "txn_a"),
                    arg("axfer", "txn_b"),
                ],
                "uint64",
                None,
            ),
            method(
                "burn",
                vec![
                    arg("axfer", "pool_token_txn"),
                    arg("uint64", "min_a_amt"),
                    arg("uint64", "min_b_amt"),
                ],
                "void",
                None,
            ),
            method(
                "swap",
                vec![arg("axfer", "in_txn"), arg("uint64", "min_swap_amt")],
                "uint64",
                None,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup() {
        let pool = pool_contract();
        assert_eq!(pool.method_by_name("swap").unwrap().args.len(), 2);
        assert!(matches!(
            pool.method_by_name("flash_loan"),
            Err(AmmError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_variant_signatures_differ() {
        let standard = pool_contract().method_by_name("mint").unwrap().args.len();
        let stable = stable_contract().method_by_name("mint").unwrap().args.len();
        assert_eq!(standard, 3);
        assert_eq!(stable, 5);
    }

    #[test]
    fn test_descriptor_serializes() {
        let json = serde_json::to_string(&master_contract()).unwrap();
        let back: AbiContract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, master_contract());
    }
}
