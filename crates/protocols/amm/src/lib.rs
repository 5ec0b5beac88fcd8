//! Tidepool AMM Protocol Implementation
//!
//! This crate implements the Tidepool DEX client: pool resolution and
//! caching, off-chain replicas of the constant-product pool math, and
//! atomic-group assembly for creating pools, managing liquidity, and
//! swapping through them.

pub mod abi;
pub mod calculator;
pub mod client;
pub mod constants;
pub mod lp_deposit;
pub mod lp_redeem;
pub mod pair;
pub mod pool_setup;
pub mod state;
pub mod swap;

// Re-exports
pub use abi::{master_contract, pool_contract, stable_contract, AbiContract, AbiMethod};
pub use calculator::{
    calculate_burn_amounts, calculate_mint_amount, calculate_pool_ratio, calculate_price_impact,
    calculate_swap_input, calculate_swap_output, calculate_swap_results, integer_sqrt,
    min_output_after_slippage, swap_input_for_state, swap_output_for_state,
};
pub use client::AmmClient;
pub use constants::{curve, fees, native, CREATE_POOL_FUNDING, DEFAULT_POOL_FEE, MIN_DEPOSIT};
pub use lp_deposit::{build_add_liquidity_group, AddLiquidityBuildResult, AddLiquiditySummary};
pub use lp_redeem::{
    build_remove_liquidity_call, RemoveLiquidityBuildResult, RemoveLiquiditySummary,
};
pub use pair::{canonical_pair, canonical_pair_amounts, pair_box_name};
pub use pool_setup::{build_create_pair_call, CreatePairBuildResult, CreatePairSummary};
pub use state::{
    decode_global_state, AmmError, AssetAmounts, AssetListing, AssetRef, PoolState, PoolType,
    StableParams, StateValue, SwapResults, TokenPair,
};
pub use swap::{build_swap_group, SwapBuildResult, SwapSummary};
