//! Pool creation transaction assembly
//!
//! One `create_pool` call on the master contract, carrying the seed payment
//! that funds the new pool's minimum balance. The master clones the right
//! template application (standard or stable), bootstraps it, and records
//! the pair in box storage, which is why the call references the template
//! app, both assets' flag boxes, and the pair box.

use serde::{Deserialize, Serialize};

use ledger_client::encoding::{application_address, encode_uint64};
use ledger_client::{BoxRef, MethodArg, MethodCallTxn, PaymentTxn, SuggestedParams, Transaction};
use tidepool_core::{AppId, AssetId};

use crate::abi::master_contract;
use crate::constants::{fees, CREATE_POOL_FUNDING};
use crate::pair::pair_box_name;
use crate::state::AmmError;

/// Build result for pool creation
#[derive(Debug)]
pub struct CreatePairBuildResult {
    pub group: Vec<Transaction>,
    pub summary: CreatePairSummary,
}

/// Summary of an assembled pool-creation group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePairSummary {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub template_pool: AppId,
    pub funding: u64,
}

/// Assemble the `create_pool` call for a canonical pair.
pub fn build_create_pair_call(
    sender: &str,
    master_app_id: AppId,
    master_creator: &str,
    template_pool: AppId,
    asset_a: AssetId,
    asset_b: AssetId,
    sp: &SuggestedParams,
) -> Result<CreatePairBuildResult, AmmError> {
    let method = master_contract().method_by_name("create_pool")?.name.clone();

    let seed = Transaction::Payment(PaymentTxn {
        sender: sender.to_string(),
        receiver: application_address(master_app_id),
        amount: CREATE_POOL_FUNDING,
        params: sp.clone(),
    });

    let boxes = vec![
        BoxRef {
            app_id: master_app_id,
            name: pair_box_name(asset_a, asset_b).to_vec(),
        },
        BoxRef {
            app_id: master_app_id,
            name: encode_uint64(asset_a).to_vec(),
        },
        BoxRef {
            app_id: master_app_id,
            name: encode_uint64(asset_b).to_vec(),
        },
    ];

    let group = vec![Transaction::MethodCall(MethodCallTxn {
        sender: sender.to_string(),
        app_id: master_app_id,
        method,
        args: vec![
            MethodArg::Txn {
                value: Box::new(seed),
            },
            MethodArg::Uint { value: asset_a },
            MethodArg::Uint { value: asset_b },
        ],
        foreign_assets: vec![asset_a, asset_b],
        foreign_apps: vec![template_pool],
        accounts: vec![master_creator.to_string()],
        boxes,
        params: sp.flat(fees::CREATE_POOL),
    })];

    Ok(CreatePairBuildResult {
        group,
        summary: CreatePairSummary {
            asset_a,
            asset_b,
            template_pool,
            funding: CREATE_POOL_FUNDING,
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
    fn test_create_pair_call_shape() {
        let result =
            build_create_pair_call("SENDER", 100, "CREATOR", 55, 1, 9, &sp()).unwrap();
        assert_eq!(result.group.len(), 1);
        let Transaction::MethodCall(call) = &result.group[0] else {
            panic!("expected method call");
        };
        assert_eq!(call.method, "create_pool");
        assert_eq!(call.app_id, 100);
        assert_eq!(call.params.fee, fees::CREATE_POOL);
        assert_eq!(call.foreign_apps, vec![55]);
        assert_eq!(call.foreign_assets, vec![1, 9]);
        assert_eq!(call.accounts, vec!["CREATOR".to_string()]);
        assert_eq!(call.boxes.len(), 3);
        assert_eq!(call.boxes[0].name, pair_box_name(1, 9).to_vec());
        assert!(matches!(
            &call.args[0],
            MethodArg::Txn { value } if matches!(
                &**value,
                Transaction::Payment(p) if p.amount == CREATE_POOL_FUNDING
            )
        ));
    }
}
