//! Protocol constants
//!
//! Fee budgets and amounts here mirror the deployed contracts exactly; a
//! mismatch makes the ledger reject the group (insufficient fee coverage)
//! or the contract reject the call.

/// Flat fee budgets per composed operation, sized to the number of inner
/// transactions the contract call performs.
pub mod fees {
    use tidepool_core::MicroUnits;

    /// First deposit into an unfunded pool (`fund`)
    pub const FUND: MicroUnits = 2_000;

    /// Subsequent deposit (`mint`): two transfer legs back out
    pub const MINT: MicroUnits = 4_000;

    /// LP withdrawal (`burn`): two transfer legs back out
    pub const BURN: MicroUnits = 4_000;

    /// Single-leg swap
    pub const SWAP: MicroUnits = 2_000;

    /// Pool creation on the master contract (inner app create, bootstrap,
    /// LP token mint)
    pub const CREATE_POOL: MicroUnits = 12_000;
}

/// Constant-product curve parameters
pub mod curve {
    /// Fee-on-input numerator: 0.3% fee, `1000 - 3`
    pub const FEE_NUM: u64 = 997;

    /// Fee denominator
    pub const FEE_DEN: u64 = 1000;

    /// LP tokens permanently locked by the contract on first deposit
    pub const BOOTSTRAP_LOCK: u64 = 1000;
}

/// Fixed metadata of the native coin (asset id 0), which has no queryable
/// asset record.
pub mod native {
    pub const NAME: &str = "Algorand";
    pub const UNIT_NAME: &str = "ALGO";
    pub const DECIMALS: u32 = 6;
}

/// Payment required by the master contract to fund a new pool's minimum
/// balance (app account, two asset opt-ins, LP token creation).
pub const CREATE_POOL_FUNDING: u64 = 3_324_100;

/// Deposits at or below this amount are rejected locally; the bootstrap
/// lock would eat them.
pub const MIN_DEPOSIT: u64 = 1000;

/// Pool fee recorded in global state when the `f` key is absent
pub const DEFAULT_POOL_FEE: u64 = 20;

/// Denominator of the slippage formula
/// `min_out = quoted * (100000 - slippage * 1000) / 100000`
pub const SLIPPAGE_DENOM: u64 = 100_000;

/// Master state key holding the standard template pool id
pub const KEY_TEMPLATE_POOL: &str = "tp";

/// Master state key holding the stable template pool id
pub const KEY_TEMPLATE_STABLE_POOL: &str = "tsp";
