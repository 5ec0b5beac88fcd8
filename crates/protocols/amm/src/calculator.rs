//! AMM math engine
//!
//! Off-chain replica of the on-chain pool arithmetic. Every
//! economics-affecting formula runs in `BigInt` with truncating division so
//! results match the contract bit-for-bit; the ratio and price-impact
//! helpers are floating-point estimates for display only.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use tidepool_core::AssetId;

use crate::constants::{curve, SLIPPAGE_DENOM};
use crate::state::{AmmError, AssetAmounts, PoolState, SwapResults};

/// Floor of the square root of an unbounded integer, by Newton's method.
///
/// Iterates `x1 = (n / x0 + x0) / 2` from `x0 = n / 2` downwards; once an
/// iterate stops decreasing it is the exact floor. Inputs 0 and 1 are their
/// own roots; negative input is a domain error.
pub fn integer_sqrt(n: &BigInt) -> Result<BigInt, AmmError> {
    if n.sign() == num_bigint::Sign::Minus {
        return Err(AmmError::NegativeSqrt);
    }
    if *n < BigInt::from(2) {
        return Ok(n.clone());
    }
    let mut x0: BigInt = n >> 1;
    let mut x1: BigInt = (n / &x0 + &x0) >> 1;
    while x1 < x0 {
        x0 = x1;
        x1 = (n / &x0 + &x0) >> 1;
    }
    Ok(x0)
}

/// Swap output for a given input, fee taken from the input.
///
/// `out = floor(amt_in * 997 * out_sup / (in_sup * 1000 + amt_in * 997))`
pub fn calculate_swap_output(in_sup: u64, out_sup: u64, amt_in: u64) -> u64 {
    if amt_in == 0 || out_sup == 0 {
        return 0;
    }
    let numerator = BigInt::from(amt_in) * BigInt::from(curve::FEE_NUM) * BigInt::from(out_sup);
    let denominator = BigInt::from(in_sup) * BigInt::from(curve::FEE_DEN)
        + BigInt::from(amt_in) * BigInt::from(curve::FEE_NUM);
    (numerator / denominator).try_into().unwrap_or(0)
}

/// Input required for a desired output; inverse of the curve with a `+1`
/// correction so the forward computation of the returned amount covers the
/// requested output despite floor truncation.
///
/// `None` when `amt_out >= out_sup`: no finite input drains the reserve.
pub fn calculate_swap_input(in_sup: u64, out_sup: u64, amt_out: u64) -> Option<u64> {
    if amt_out >= out_sup {
        return None;
    }
    let numerator = BigInt::from(amt_out) * BigInt::from(in_sup) * BigInt::from(curve::FEE_DEN);
    let denominator =
        BigInt::from(curve::FEE_NUM) * (BigInt::from(out_sup) - BigInt::from(amt_out));
    let amt_in = numerator / denominator + BigInt::one();
    amt_in.try_into().ok()
}

/// Map pool reserves onto (input, output) sides.
///
/// The lower asset id is always side A; `in_id > out_id` flips the pair.
/// This orientation is load-bearing across every formula here and matches
/// the canonical ordering enforced at pool creation.
pub fn oriented_reserves(state: &PoolState, in_id: AssetId, out_id: AssetId) -> (u64, u64) {
    if in_id > out_id {
        (state.reserve_b, state.reserve_a)
    } else {
        (state.reserve_a, state.reserve_b)
    }
}

/// Swap output against a pool's current reserves
pub fn swap_output_for_state(
    state: &PoolState,
    in_id: AssetId,
    out_id: AssetId,
    amt_in: u64,
) -> u64 {
    let (in_sup, out_sup) = oriented_reserves(state, in_id, out_id);
    calculate_swap_output(in_sup, out_sup, amt_in)
}

/// Required swap input against a pool's current reserves
pub fn swap_input_for_state(
    state: &PoolState,
    in_id: AssetId,
    out_id: AssetId,
    amt_out: u64,
) -> Option<u64> {
    let (in_sup, out_sup) = oriented_reserves(state, in_id, out_id);
    calculate_swap_input(in_sup, out_sup, amt_out)
}

/// LP tokens minted for a deposit of `(a_amt, b_amt)`.
///
/// First deposit: `sqrt(a_amt * b_amt) - 1000`, the subtracted constant
/// being the contract's permanently locked bootstrap liquidity. Afterwards
/// the mint follows whichever side is scarcer relative to current reserves,
/// so excess on the other side is donated rather than minted against.
pub fn calculate_mint_amount(state: &PoolState, a_amt: u64, b_amt: u64) -> u64 {
    if state.is_unfunded() {
        let product = BigInt::from(a_amt) * BigInt::from(b_amt);
        // Product is non-negative, sqrt cannot fail.
        let root = integer_sqrt(&product).unwrap_or_else(|_| BigInt::zero());
        return (root - BigInt::from(curve::BOOTSTRAP_LOCK))
            .try_into()
            .unwrap_or(0);
    }
    let issued = BigInt::from(state.minted);
    let reserve_a = BigInt::from(state.reserve_a);
    let reserve_b = BigInt::from(state.reserve_b);
    let a_amt = BigInt::from(a_amt);
    let b_amt = BigInt::from(b_amt);
    let mint = if &a_amt * &reserve_b < &b_amt * &reserve_a {
        a_amt * issued / reserve_a
    } else {
        b_amt * issued / reserve_b
    };
    mint.try_into().unwrap_or(0)
}

/// Proportional reserves returned for burning `burn_amt` LP tokens
pub fn calculate_burn_amounts(state: &PoolState, burn_amt: u64) -> AssetAmounts {
    if state.minted == 0 {
        return AssetAmounts {
            asset_a: 0,
            asset_b: 0,
        };
    }
    let issued = BigInt::from(state.minted);
    let asset_a = BigInt::from(state.reserve_a) * BigInt::from(burn_amt) / &issued;
    let asset_b = BigInt::from(state.reserve_b) * BigInt::from(burn_amt) / &issued;
    AssetAmounts {
        asset_a: asset_a.try_into().unwrap_or(0),
        asset_b: asset_b.try_into().unwrap_or(0),
    }
}

/// Decimal-adjusted price of side A in units of side B.
///
/// Floating-point, for display and estimation only. Zero when either
/// reserve is empty (pool not yet funded).
pub fn calculate_pool_ratio(state: &PoolState, a_decimals: u32, b_decimals: u32) -> f64 {
    if state.reserve_a == 0 || state.reserve_b == 0 {
        return 0.0;
    }
    let a = state.reserve_a as f64 / 10f64.powi(a_decimals as i32);
    let b = state.reserve_b as f64 / 10f64.powi(b_decimals as i32);
    a / b
}

/// Fractional price deviation a swap of `in_amt` causes.
///
/// Compares the pre-trade price `in_sup / out_sup` against the effective
/// post-trade price on the shifted curve. Floating-point, for estimation.
pub fn calculate_price_impact(
    state: &PoolState,
    in_id: AssetId,
    out_id: AssetId,
    in_amt: u64,
) -> f64 {
    let (in_sup, out_sup) = oriented_reserves(state, in_id, out_id);
    let in_sup = in_sup as f64;
    let out_sup = out_sup as f64;
    let in_amt = in_amt as f64;
    let before = in_sup / out_sup;
    let after = (in_sup + in_amt) / (in_sup * out_sup / (in_sup + in_amt));
    (after - before) / before
}

/// Forward output and reverse input for the same nominal `amount`.
///
/// The two results interpret `amount` differently (as input and as desired
/// output respectively) and carry no relationship to each other; the
/// reverse component here has no `+1` correction, unlike
/// [`calculate_swap_input`].
pub fn calculate_swap_results(
    state: &PoolState,
    in_id: AssetId,
    out_id: AssetId,
    amount: u64,
) -> Result<SwapResults, AmmError> {
    let (asset_a, asset_b) = crate::pair::canonical_pair(in_id, out_id);
    if !state.matches_pair(asset_a, asset_b) {
        return Err(AmmError::IncorrectPair {
            requested_a: asset_a,
            requested_b: asset_b,
            state_a: state.asset_a,
            state_b: state.asset_b,
        });
    }
    let (in_sup, out_sup) = oriented_reserves(state, in_id, out_id);
    if amount >= out_sup {
        return Err(AmmError::InsufficientLiquidity);
    }
    let swap_output = calculate_swap_output(in_sup, out_sup, amount);
    let numerator = BigInt::from(amount) * BigInt::from(in_sup) * BigInt::from(curve::FEE_DEN);
    let denominator =
        BigInt::from(curve::FEE_NUM) * (BigInt::from(out_sup) - BigInt::from(amount));
    let swap_input = (numerator / denominator).try_into().unwrap_or(0);
    Ok(SwapResults {
        swap_output,
        swap_input,
    })
}

/// Minimum acceptable output under a slippage tolerance:
/// `floor(quoted * (100000 - slippage * 1000) / 100000)`.
///
/// `slippage` is a percentage with up to two decimal places of resolution.
pub fn min_output_after_slippage(quoted: u64, slippage: f64) -> u64 {
    let tolerance = ((slippage * 1000.0) as u64).min(SLIPPAGE_DENOM);
    let min = BigInt::from(quoted) * BigInt::from(SLIPPAGE_DENOM - tolerance)
        / BigInt::from(SLIPPAGE_DENOM);
    min.to_u64().unwrap_or(0)
}
