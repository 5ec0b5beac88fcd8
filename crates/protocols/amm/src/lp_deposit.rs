//! Liquidity deposit transaction assembly
//!
//! The first deposit into an unfunded pool calls `fund`; later deposits
//! call `mint` with the expected LP amount. Standard pools consume the two
//! transfer legs as transaction arguments; stable pools take explicit
//! amount arguments followed by the transfer legs, with a zero side left
//! out entirely.

use serde::{Deserialize, Serialize};

use ledger_client::encoding::application_address;
use ledger_client::{
    AssetTransferTxn, MethodArg, MethodCallTxn, PaymentTxn, SuggestedParams, Transaction,
};
use tidepool_core::constants::NATIVE_ASSET_ID;
use tidepool_core::{AppId, AssetId};

use crate::abi::{pool_contract, stable_contract};
use crate::constants::fees;
use crate::state::AmmError;

/// Build result for a liquidity deposit
#[derive(Debug)]
pub struct AddLiquidityBuildResult {
    pub group: Vec<Transaction>,
    pub summary: AddLiquiditySummary,
}

/// Summary of an assembled deposit group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquiditySummary {
    pub pool_id: AppId,
    pub a_id: AssetId,
    pub a_amt: u64,
    pub b_id: AssetId,
    pub b_amt: u64,
    pub mint_amt: u64,
    pub first_mint: bool,
    pub stable_pair: bool,
    pub opt_in_added: bool,
}

fn transfer_leg(sender: &str, receiver: &str, asset_id: AssetId, amount: u64, sp: &SuggestedParams) -> Transaction {
    if asset_id == NATIVE_ASSET_ID {
        Transaction::Payment(PaymentTxn {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            params: sp.clone(),
        })
    } else {
        Transaction::AssetTransfer(AssetTransferTxn {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            asset_id,
            amount,
            params: sp.clone(),
        })
    }
}

/// Assemble the deposit group for a canonical pair `(a_id, b_id)`.
///
/// Callers canonicalize ids and amounts together and verify the pool state
/// before building; this function only shapes the group.
#[allow(clippy::too_many_arguments)]
pub fn build_add_liquidity_group(
    sender: &str,
    pool_id: AppId,
    pool_token: AssetId,
    a_id: AssetId,
    a_amt: u64,
    b_id: AssetId,
    b_amt: u64,
    mint_amt: u64,
    first_mint: bool,
    stable_pair: bool,
    needs_opt_in: bool,
    sp: &SuggestedParams,
) -> Result<AddLiquidityBuildResult, AmmError> {
    let pool_address = application_address(pool_id);

    let mut group = Vec::with_capacity(2);
    if needs_opt_in {
        group.push(Transaction::opt_in(sender, pool_token, sp));
    }

    let leg_a = transfer_leg(sender, &pool_address, a_id, a_amt, sp);
    let leg_b = transfer_leg(sender, &pool_address, b_id, b_amt, sp);

    // The stable contract only comes into play for two-asset stable pairs;
    // a native-coin side always goes through the standard pool methods.
    let two_asset_stable = stable_pair && a_id != NATIVE_ASSET_ID;

    let (contract, fee) = if first_mint {
        let contract = if two_asset_stable {
            stable_contract()
        } else {
            pool_contract()
        };
        (contract, fees::FUND)
    } else if two_asset_stable {
        (stable_contract(), fees::MINT)
    } else {
        (pool_contract(), fees::MINT)
    };
    let method_name = if first_mint { "fund" } else { "mint" };
    let method = contract.method_by_name(method_name)?.name.clone();

    let args = if first_mint {
        vec![
            MethodArg::Txn {
                value: Box::new(leg_a),
            },
            MethodArg::Txn {
                value: Box::new(leg_b),
            },
        ]
    } else if two_asset_stable {
        let mut args = vec![
            MethodArg::Uint { value: a_amt },
            MethodArg::Uint { value: b_amt },
            MethodArg::Uint { value: mint_amt },
        ];
        if a_amt != 0 {
            args.push(MethodArg::Txn {
                value: Box::new(leg_a),
            });
        }
        if b_amt != 0 {
            args.push(MethodArg::Txn {
                value: Box::new(leg_b),
            });
        }
        args
    } else {
        vec![
            MethodArg::Txn {
                value: Box::new(leg_a),
            },
            MethodArg::Txn {
                value: Box::new(leg_b),
            },
            MethodArg::Uint { value: mint_amt },
        ]
    };

    let foreign_assets = if a_id == NATIVE_ASSET_ID {
        vec![b_id, pool_token]
    } else {
        vec![a_id, b_id, pool_token]
    };

    group.push(Transaction::MethodCall(MethodCallTxn {
        sender: sender.to_string(),
        app_id: pool_id,
        method,
        args,
        foreign_assets,
        foreign_apps: vec![],
        accounts: vec![],
        boxes: vec![],
        params: sp.flat(fee),
    }));

    Ok(AddLiquidityBuildResult {
        group,
        summary: AddLiquiditySummary {
            pool_id,
            a_id,
            a_amt,
            b_id,
            b_amt,
            mint_amt,
            first_mint,
            stable_pair,
            opt_in_added: needs_opt_in,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> SuggestedParams {
        SuggestedParams {
            fee: 0,
            flat_fee: false,
            min_fee: 1000,
            first_valid: 1,
            last_valid: 1001,
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: String::new(),
        }
    }

    fn call(result: &AddLiquidityBuildResult) -> &MethodCallTxn {
        match result.group.last().unwrap() {
            Transaction::MethodCall(c) => c,
            other => panic!("expected method call, got {other:?}"),
        }
    }

    #[test]
    fn test_first_mint_funds_at_lower_fee() {
        let result = build_add_liquidity_group(
            "SENDER", 700, 42, 0, 5_000, 9, 5_000, 0, true, false, false, &sp(),
        )
        .unwrap();
        let c = call(&result);
        assert_eq!(c.method, "fund");
        assert_eq!(c.params.fee, fees::FUND);
        assert_eq!(c.args.len(), 2);
        assert!(matches!(
            &c.args[0],
            MethodArg::Txn { value } if matches!(**value, Transaction::Payment(_))
        ));
        assert_eq!(c.foreign_assets, vec![9, 42]);
    }

    #[test]
    fn test_subsequent_mint_appends_amount_argument() {
        let result = build_add_liquidity_group(
            "SENDER", 700, 42, 1, 5_000, 9, 5_000, 450, false, false, true, &sp(),
        )
        .unwrap();
        assert_eq!(result.group.len(), 2);
        let c = call(&result);
        assert_eq!(c.method, "mint");
        assert_eq!(c.params.fee, fees::MINT);
        assert_eq!(c.args.len(), 3);
        assert!(matches!(c.args[2], MethodArg::Uint { value: 450 }));
        assert_eq!(c.foreign_assets, vec![1, 9, 42]);
    }

    #[test]
    fn test_stable_mint_passes_amounts_and_legs() {
        let result = build_add_liquidity_group(
            "SENDER", 700, 42, 3, 5_000, 9, 5_000, 450, false, true, false, &sp(),
        )
        .unwrap();
        let c = call(&result);
        assert_eq!(c.args.len(), 5);
        assert!(matches!(c.args[0], MethodArg::Uint { value: 5_000 }));
        assert!(matches!(c.args[2], MethodArg::Uint { value: 450 }));
    }

    #[test]
    fn test_stable_mint_omits_zero_side_leg() {
        let result = build_add_liquidity_group(
            "SENDER", 700, 42, 3, 0, 9, 5_000, 450, false, true, false, &sp(),
        )
        .unwrap();
        let c = call(&result);
        // Three amount args plus only the non-zero side's transfer.
        assert_eq!(c.args.len(), 4);
        assert!(matches!(
            &c.args[3],
            MethodArg::Txn { value } if matches!(
                &**value,
                Transaction::AssetTransfer(t) if t.asset_id == 9
            )
        ));
    }

    #[test]
    fn test_native_stable_pair_uses_standard_pool() {
        // Asset 0 cannot ride an asset-transfer leg; the standard contract
        // handles mixed native pairs even when both sides are flagged stable.
        let result = build_add_liquidity_group(
            "SENDER", 700, 42, 0, 5_000, 9, 5_000, 450, false, true, false, &sp(),
        )
        .unwrap();
        let c = call(&result);
        assert_eq!(c.args.len(), 3);
        assert_eq!(c.foreign_assets, vec![9, 42]);
    }
}
