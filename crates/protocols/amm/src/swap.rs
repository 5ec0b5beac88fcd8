//! Swap transaction assembly
//!
//! A swap is one method call on the pool contract with the input transfer
//! as its transaction argument and the slippage floor as its minimum-output
//! guard. When the sender does not yet hold the output asset, an opt-in
//! leg rides ahead of the call in the same group.

use serde::{Deserialize, Serialize};

use ledger_client::encoding::application_address;
use ledger_client::{
    AssetTransferTxn, MethodArg, MethodCallTxn, PaymentTxn, SuggestedParams, Transaction,
};
use tidepool_core::constants::NATIVE_ASSET_ID;
use tidepool_core::{AppId, AssetId};

use crate::abi::pool_contract;
use crate::constants::fees;
use crate::state::AmmError;

/// Build result for a swap
#[derive(Debug)]
pub struct SwapBuildResult {
    pub group: Vec<Transaction>,
    pub summary: SwapSummary,
}

/// Summary of an assembled swap group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSummary {
    pub pool_id: AppId,
    pub in_id: AssetId,
    pub in_amt: u64,
    pub out_id: AssetId,
    pub quoted_out: u64,
    pub min_out: u64,
    pub opt_in_added: bool,
}

/// Assemble the swap group against an already-resolved pool.
///
/// The input leg is a payment when the input is the native coin, an asset
/// transfer otherwise. Foreign assets list both pair sides in canonical
/// order plus the LP token (the contract reads all three during the inner
/// payout).
#[allow(clippy::too_many_arguments)]
pub fn build_swap_group(
    sender: &str,
    pool_id: AppId,
    pool_token: AssetId,
    in_id: AssetId,
    in_amt: u64,
    out_id: AssetId,
    quoted_out: u64,
    min_out: u64,
    needs_opt_in: bool,
    sp: &SuggestedParams,
) -> Result<SwapBuildResult, AmmError> {
    let method = pool_contract().method_by_name("swap")?.name.clone();
    let pool_address = application_address(pool_id);

    let mut group = Vec::with_capacity(2);
    if needs_opt_in {
        group.push(Transaction::opt_in(sender, out_id, sp));
    }

    let in_leg = if in_id == NATIVE_ASSET_ID {
        Transaction::Payment(PaymentTxn {
            sender: sender.to_string(),
            receiver: pool_address,
            amount: in_amt,
            params: sp.clone(),
        })
    } else {
        Transaction::AssetTransfer(AssetTransferTxn {
            sender: sender.to_string(),
            receiver: pool_address,
            asset_id: in_id,
            amount: in_amt,
            params: sp.clone(),
        })
    };

    let foreign_assets = if in_id == NATIVE_ASSET_ID {
        vec![out_id, pool_token]
    } else {
        vec![in_id.min(out_id), in_id.max(out_id), pool_token]
    };

    group.push(Transaction::MethodCall(MethodCallTxn {
        sender: sender.to_string(),
        app_id: pool_id,
        method,
        args: vec![
            MethodArg::Txn {
                value: Box::new(in_leg),
            },
            MethodArg::Uint { value: min_out },
        ],
        foreign_assets,
        foreign_apps: vec![],
        accounts: vec![],
        boxes: vec![],
        params: sp.flat(fees::SWAP),
    }));

    Ok(SwapBuildResult {
        group,
        summary: SwapSummary {
            pool_id,
            in_id,
            in_amt,
            out_id,
            quoted_out,
            min_out,
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

    #[test]
    fn test_native_input_uses_payment_leg() {
        let result =
            build_swap_group("SENDER", 700, 42, 0, 1_000, 9, 996, 986, false, &sp()).unwrap();
        assert_eq!(result.group.len(), 1);
        let Transaction::MethodCall(call) = &result.group[0] else {
            panic!("expected method call");
        };
        assert_eq!(call.method, "swap");
        assert_eq!(call.params.fee, fees::SWAP);
        assert!(call.params.flat_fee);
        assert_eq!(call.foreign_assets, vec![9, 42]);
        assert!(matches!(
            &call.args[0],
            MethodArg::Txn { value } if matches!(**value, Transaction::Payment(_))
        ));
        assert!(matches!(call.args[1], MethodArg::Uint { value: 986 }));
    }

    #[test]
    fn test_asset_input_sorts_foreign_assets() {
        let result =
            build_swap_group("SENDER", 700, 42, 9, 1_000, 1, 500, 495, false, &sp()).unwrap();
        let Transaction::MethodCall(call) = &result.group[0] else {
            panic!("expected method call");
        };
        assert_eq!(call.foreign_assets, vec![1, 9, 42]);
        assert!(matches!(
            &call.args[0],
            MethodArg::Txn { value } if matches!(**value, Transaction::AssetTransfer(_))
        ));
    }

    #[test]
    fn test_opt_in_leg_precedes_call() {
        let result =
            build_swap_group("SENDER", 700, 42, 0, 1_000, 9, 996, 986, true, &sp()).unwrap();
        assert_eq!(result.group.len(), 2);
        match &result.group[0] {
            Transaction::AssetTransfer(t) => {
                assert_eq!(t.asset_id, 9);
                assert_eq!(t.amount, 0);
                assert_eq!(t.sender, t.receiver);
            }
            other => panic!("expected opt-in leg, got {other:?}"),
        }
        assert!(result.summary.opt_in_added);
    }
}
