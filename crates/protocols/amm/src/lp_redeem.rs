//! Liquidity withdrawal transaction assembly
//!
//! One `burn` call with the LP-token transfer as its transaction argument
//! and per-side minimum amounts as its guards. The contract pays both
//! reserves back as inner transfers, hence the doubled fee budget.

use serde::{Deserialize, Serialize};

use ledger_client::encoding::application_address;
use ledger_client::{AssetTransferTxn, MethodArg, MethodCallTxn, SuggestedParams, Transaction};
use tidepool_core::constants::NATIVE_ASSET_ID;
use tidepool_core::{AppId, AssetId};

use crate::abi::{pool_contract, stable_contract};
use crate::constants::fees;
use crate::state::{AmmError, PoolState};

/// Build result for a liquidity withdrawal
#[derive(Debug)]
pub struct RemoveLiquidityBuildResult {
    pub group: Vec<Transaction>,
    pub summary: RemoveLiquiditySummary,
}

/// Summary of an assembled withdrawal group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveLiquiditySummary {
    pub pool_id: AppId,
    pub pool_token: AssetId,
    pub burn_amt: u64,
    pub a_min_amt: u64,
    pub b_min_amt: u64,
    pub stable_pair: bool,
}

/// Assemble the withdrawal group for a pool whose state is already fetched.
#[allow(clippy::too_many_arguments)]
pub fn build_remove_liquidity_call(
    sender: &str,
    pool_id: AppId,
    state: &PoolState,
    burn_amt: u64,
    a_min_amt: u64,
    b_min_amt: u64,
    stable_pair: bool,
    sp: &SuggestedParams,
) -> Result<RemoveLiquidityBuildResult, AmmError> {
    let contract = if stable_pair {
        stable_contract()
    } else {
        pool_contract()
    };
    let method = contract.method_by_name("burn")?.name.clone();

    let lp_leg = Transaction::AssetTransfer(AssetTransferTxn {
        sender: sender.to_string(),
        receiver: application_address(pool_id),
        asset_id: state.pool_token,
        amount: burn_amt,
        params: sp.clone(),
    });

    let foreign_assets = if state.asset_a == NATIVE_ASSET_ID {
        vec![state.pool_token, state.asset_b]
    } else {
        vec![state.pool_token, state.asset_a, state.asset_b]
    };

    let group = vec![Transaction::MethodCall(MethodCallTxn {
        sender: sender.to_string(),
        app_id: pool_id,
        method,
        args: vec![
            MethodArg::Txn {
                value: Box::new(lp_leg),
            },
            MethodArg::Uint { value: a_min_amt },
            MethodArg::Uint { value: b_min_amt },
        ],
        foreign_assets,
        foreign_apps: vec![],
        accounts: vec![],
        boxes: vec![],
        params: sp.flat(fees::BURN),
    })];

    Ok(RemoveLiquidityBuildResult {
        group,
        summary: RemoveLiquiditySummary {
            pool_id,
            pool_token: state.pool_token,
            burn_amt,
            a_min_amt,
            b_min_amt,
            stable_pair,
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

    fn state(asset_a: u64) -> PoolState {
        PoolState {
            asset_a,
            asset_b: 9,
            reserve_a: 100_000,
            reserve_b: 200_000,
            minted: 10_000,
            pool_token: 42,
            governor: String::new(),
            fee: None,
            pool_type: None,
            stable: None,
        }
    }

    #[test]
    fn test_burn_call_shape() {
        let result =
            build_remove_liquidity_call("SENDER", 700, &state(1), 1000, 9_900, 19_800, false, &sp())
                .unwrap();
        assert_eq!(result.group.len(), 1);
        let Transaction::MethodCall(call) = &result.group[0] else {
            panic!("expected method call");
        };
        assert_eq!(call.method, "burn");
        assert_eq!(call.params.fee, fees::BURN);
        assert_eq!(call.foreign_assets, vec![42, 1, 9]);
        assert!(matches!(
            &call.args[0],
            MethodArg::Txn { value } if matches!(
                &**value,
                Transaction::AssetTransfer(t) if t.asset_id == 42 && t.amount == 1000
            )
        ));
        assert!(matches!(call.args[1], MethodArg::Uint { value: 9_900 }));
        assert!(matches!(call.args[2], MethodArg::Uint { value: 19_800 }));
    }

    #[test]
    fn test_native_pool_drops_asset_a_from_foreign_list() {
        let result =
            build_remove_liquidity_call("SENDER", 700, &state(0), 1000, 0, 0, false, &sp())
                .unwrap();
        let Transaction::MethodCall(call) = &result.group[0] else {
            panic!("expected method call");
        };
        assert_eq!(call.foreign_assets, vec![42, 9]);
    }
}
