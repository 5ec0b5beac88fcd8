//! AMM protocol client
//!
//! [`AmmClient`] owns the resolution caches and drives every public
//! operation: it resolves pools, re-reads mutable state, replicates the
//! contract math off-chain, and hands assembled groups to the ledger
//! boundary. All validation runs before the first ledger mutation, so a
//! doomed operation never leaves partial on-chain effects.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::sync::RwLock;

use ledger_client::encoding::{application_address, decode_uint64, encode_uint64};
use ledger_client::{AssetInfo, ConfirmedGroup, LedgerClient, NodeStatus, Transaction};
use tidepool_core::constants::NATIVE_ASSET_ID;
use tidepool_core::{AppId, AssetId};

use crate::calculator;
use crate::constants::{native, KEY_TEMPLATE_POOL, KEY_TEMPLATE_STABLE_POOL, MIN_DEPOSIT};
use crate::lp_deposit::build_add_liquidity_group;
use crate::lp_redeem::build_remove_liquidity_call;
use crate::pair::{canonical_pair, canonical_pair_amounts, pair_box_name};
use crate::pool_setup::build_create_pair_call;
use crate::state::{
    decode_global_state, AmmError, AssetAmounts, AssetListing, AssetRef, PoolState, StateValue,
    SwapResults, TokenPair,
};
use crate::swap::build_swap_group;

/// Result type for AMM client operations
pub type Result<T> = std::result::Result<T, AmmError>;

/// Client for one AMM protocol deployment, identified by its master
/// application id.
///
/// Owns two append-only caches: resolved pairs (keyed by the canonical
/// pair) and asset metadata (keyed by asset id). Pool identity and asset
/// metadata are immutable on the ledger, so neither cache ever evicts;
/// mutable pool state is re-fetched on every lookup instead. Separate
/// client instances share nothing.
pub struct AmmClient {
    ledger: Arc<dyn LedgerClient>,
    app_id: AppId,
    pool_cache: RwLock<HashMap<(AssetId, AssetId), TokenPair>>,
    asset_cache: RwLock<HashMap<AssetId, AssetInfo>>,
}

impl AmmClient {
    /// Create a client for the master application `app_id`
    pub fn new(app_id: AppId, ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            app_id,
            pool_cache: RwLock::new(HashMap::new()),
            asset_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Master application id this client targets
    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// The underlying ledger boundary
    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// Current node status
    pub async fn status(&self) -> Result<NodeStatus> {
        Ok(self.ledger.status().await?)
    }

    /// Snapshot of every cached pair
    pub async fn cached_pairs(&self) -> Vec<TokenPair> {
        self.pool_cache.read().await.values().cloned().collect()
    }

    /// Snapshot of every cached asset record
    pub async fn cached_assets(&self) -> Vec<AssetInfo> {
        self.asset_cache.read().await.values().cloned().collect()
    }

    // ---- resolution -------------------------------------------------------

    /// Whether an asset carries the master's stable-coin flag.
    ///
    /// A missing flag box reads as "not stable".
    pub async fn is_stable_asset(&self, asset_id: AssetId) -> bool {
        match self
            .ledger
            .application_box(self.app_id, &encode_uint64(asset_id))
            .await
        {
            Ok(value) => decode_uint64(&value).map(|flag| flag != 0).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Resolve the pool application id for an asset pair.
    ///
    /// Serves a cached pair's pool id when one exists; otherwise looks the
    /// pair up in the master's box index. The miss path deliberately does
    /// not populate the pair cache; only full resolution
    /// ([`Self::pool_by_assets`]) does.
    pub async fn pool_id_by_assets(&self, asset_x: AssetId, asset_y: AssetId) -> Result<AppId> {
        let (asset_a, asset_b) = canonical_pair(asset_x, asset_y);
        if let Some(pair) = self.pool_cache.read().await.get(&(asset_a, asset_b)) {
            return Ok(pair.pool_id);
        }
        let value = self
            .ledger
            .application_box(self.app_id, &pair_box_name(asset_a, asset_b))
            .await
            .map_err(|_| AmmError::PoolNotFound {
                a: asset_a,
                b: asset_b,
            })?;
        Ok(decode_uint64(&value)?)
    }

    /// Fetch and decode one pool's global state
    pub async fn pool_state(&self, pool_id: AppId) -> Result<PoolState> {
        let info = self.ledger.application_information(pool_id).await?;
        PoolState::from_entries(&info.params.global_state)
    }

    /// Typed state of every pool created by the master
    pub async fn pool_states(&self) -> Result<HashMap<AppId, PoolState>> {
        let account = self
            .ledger
            .account_information(&application_address(self.app_id))
            .await?;
        let mut states = HashMap::with_capacity(account.created_apps.len());
        for app in &account.created_apps {
            states.insert(app.id, PoolState::from_entries(&app.params.global_state)?);
        }
        Ok(states)
    }

    /// LP token id of a pair's pool
    pub async fn pool_token(&self, asset_x: AssetId, asset_y: AssetId) -> Result<AssetId> {
        let (asset_a, asset_b) = canonical_pair(asset_x, asset_y);
        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let state = self.pool_state(pool_id).await?;
        verify_pair(&state, asset_a, asset_b)?;
        Ok(state.pool_token)
    }

    /// Resolve the full pair view for two assets.
    ///
    /// On a cache hit only the mutable pool state is re-fetched; metadata,
    /// fee, and identity come from the cached record. On a miss the pair is
    /// assembled from the box index, pool state, and asset records (the
    /// native coin gets fixed synthesized metadata) and written to the
    /// cache.
    pub async fn pool_by_assets(&self, asset_x: AssetId, asset_y: AssetId) -> Result<TokenPair> {
        let (asset_a, asset_b) = canonical_pair(asset_x, asset_y);
        let cached = self
            .pool_cache
            .read()
            .await
            .get(&(asset_a, asset_b))
            .cloned();
        if let Some(mut pair) = cached {
            tracing::debug!(asset_a, asset_b, pool_id = pair.pool_id, "pair cache hit");
            pair.pool_state = self.pool_state(pair.pool_id).await?;
            return Ok(pair);
        }

        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let pool_state = self.pool_state(pool_id).await?;
        let pair = self.assemble_pair(pool_id, pool_state).await?;
        self.pool_cache
            .write()
            .await
            .insert((asset_a, asset_b), pair.clone());
        tracing::debug!(asset_a, asset_b, pool_id, "pair resolved and cached");
        Ok(pair)
    }

    /// Enumerate every pool the master has created, caching each pair.
    pub async fn pairs(&self) -> Result<Vec<TokenPair>> {
        let account = self
            .ledger
            .account_information(&application_address(self.app_id))
            .await?;
        let mut pools = Vec::with_capacity(account.created_apps.len());
        for app in &account.created_apps {
            let pool_state = PoolState::from_entries(&app.params.global_state)?;
            let key = (pool_state.asset_a, pool_state.asset_b);
            let cached = self.pool_cache.read().await.get(&key).cloned();
            if let Some(mut pair) = cached {
                pair.pool_id = app.id;
                pair.pool_token = pool_state.pool_token;
                pair.pool_state = pool_state;
                pools.push(pair);
            } else {
                let pair = self.assemble_pair(app.id, pool_state).await?;
                self.pool_cache.write().await.insert(key, pair.clone());
                pools.push(pair);
            }
        }
        tracing::info!(count = pools.len(), "enumerated pools");
        Ok(pools)
    }

    /// Find the pool that mints a given LP token.
    ///
    /// Scans the cache first, then falls back to full enumeration.
    pub async fn pool_by_token(&self, token_id: AssetId) -> Result<TokenPair> {
        if let Some(pair) = self
            .pool_cache
            .read()
            .await
            .values()
            .find(|pair| pair.pool_state.pool_token == token_id)
        {
            return Ok(pair.clone());
        }
        let pairs = self.pairs().await?;
        pairs
            .into_iter()
            .find(|pair| pair.pool_state.pool_token == token_id)
            .ok_or(AmmError::PoolTokenNotFound(token_id))
    }

    /// Asset metadata, served from the write-once cache
    pub async fn asset(&self, asset_id: AssetId) -> Result<AssetInfo> {
        if let Some(info) = self.asset_cache.read().await.get(&asset_id) {
            return Ok(info.clone());
        }
        let info = self.ledger.asset_information(asset_id).await?;
        self.asset_cache
            .write()
            .await
            .insert(asset_id, info.clone());
        Ok(info)
    }

    async fn assemble_pair(&self, pool_id: AppId, pool_state: PoolState) -> Result<TokenPair> {
        let (a_name, a_unit_name, a_decimals) = if pool_state.asset_a == NATIVE_ASSET_ID {
            (
                native::NAME.to_string(),
                native::UNIT_NAME.to_string(),
                native::DECIMALS,
            )
        } else {
            let info = self.asset(pool_state.asset_a).await?;
            (
                info.params.name.unwrap_or_default(),
                info.params.unit_name.unwrap_or_default(),
                info.params.decimals,
            )
        };
        let b_info = self.asset(pool_state.asset_b).await?;

        Ok(TokenPair {
            a_id: pool_state.asset_a,
            a_name,
            a_unit_name,
            a_decimals,
            b_id: pool_state.asset_b,
            b_name: b_info.params.name.unwrap_or_default(),
            b_unit_name: b_info.params.unit_name.unwrap_or_default(),
            b_decimals: b_info.params.decimals,
            pool_id,
            pool_token: pool_state.pool_token,
            fee: pool_state.fee_or_default(),
            pool_type: pool_state.pool_type_or_default(),
            pool_state,
        })
    }

    // ---- account queries --------------------------------------------------

    /// All balances of an account, the native coin under asset id 0
    pub async fn balances(&self, address: &str) -> Result<HashMap<AssetId, u64>> {
        let account = self.ledger.account_information(address).await?;
        let mut balances = HashMap::with_capacity(account.assets.len() + 1);
        balances.insert(NATIVE_ASSET_ID, account.amount);
        for holding in &account.assets {
            balances.insert(holding.asset_id, holding.amount);
        }
        Ok(balances)
    }

    /// Balance of one asset, zero when the account does not hold it
    pub async fn balance(&self, asset_id: AssetId, address: &str) -> Result<u64> {
        Ok(self
            .balances(address)
            .await?
            .get(&asset_id)
            .copied()
            .unwrap_or(0))
    }

    /// Whether an account is opted into an asset
    pub async fn is_opted_in(&self, asset_id: AssetId, address: &str) -> Result<bool> {
        Ok(self.balances(address).await?.contains_key(&asset_id))
    }

    /// Held assets of an account with their unit names.
    ///
    /// Assets whose metadata lookup fails are skipped with a warning.
    pub async fn asset_list(&self, address: &str) -> Result<Vec<AssetListing>> {
        let account = self.ledger.account_information(address).await?;
        let mut listings = Vec::with_capacity(account.assets.len());
        for holding in &account.assets {
            match self.ledger.asset_information(holding.asset_id).await {
                Ok(info) => listings.push(AssetListing {
                    id: info.index,
                    unit_name: info.params.unit_name.unwrap_or_default(),
                }),
                Err(e) => {
                    tracing::warn!(asset_id = holding.asset_id, "asset lookup failed: {e}");
                }
            }
        }
        Ok(listings)
    }

    /// Swap output recorded in a confirmed swap's first log entry
    pub async fn amount_after_swap(&self, tx_id: &str) -> Result<u64> {
        let response = self.ledger.pending_transaction(tx_id).await?;
        let first = response
            .logs
            .first()
            .ok_or_else(|| AmmError::NoSwapLogs(tx_id.to_string()))?;
        let bytes = BASE64
            .decode(first)
            .map_err(|e| AmmError::StateDecode(format!("bad log base64: {e}")))?;
        Ok(decode_uint64(&bytes)?)
    }

    // ---- fetch-then-compute math ------------------------------------------

    /// LP tokens a deposit would mint against the pool's current state
    pub async fn mint_amount(
        &self,
        asset_x: AssetId,
        x_amt: u64,
        asset_y: AssetId,
        y_amt: u64,
    ) -> Result<u64> {
        let ((asset_a, a_amt), (asset_b, b_amt)) =
            canonical_pair_amounts((asset_x, x_amt), (asset_y, y_amt));
        let state = self.verified_state(asset_a, asset_b).await?;
        Ok(calculator::calculate_mint_amount(&state, a_amt, b_amt))
    }

    /// Swap output for an input amount against current reserves
    pub async fn swap_output(
        &self,
        in_id: AssetId,
        out_id: AssetId,
        amt_in: u64,
    ) -> Result<u64> {
        let (asset_a, asset_b) = canonical_pair(in_id, out_id);
        let state = self.verified_state(asset_a, asset_b).await?;
        Ok(calculator::swap_output_for_state(&state, in_id, out_id, amt_in))
    }

    /// Swap input required for a desired output against current reserves
    pub async fn swap_input(
        &self,
        in_id: AssetId,
        out_id: AssetId,
        amt_out: u64,
    ) -> Result<u64> {
        let (asset_a, asset_b) = canonical_pair(in_id, out_id);
        let state = self.verified_state(asset_a, asset_b).await?;
        calculator::swap_input_for_state(&state, in_id, out_id, amt_out)
            .ok_or(AmmError::InsufficientLiquidity)
    }

    /// Reserves returned for burning LP tokens, at current state
    pub async fn burn_amounts(
        &self,
        asset_x: AssetId,
        asset_y: AssetId,
        burn_amt: u64,
    ) -> Result<AssetAmounts> {
        let (asset_a, asset_b) = canonical_pair(asset_x, asset_y);
        let state = self.verified_state(asset_a, asset_b).await?;
        Ok(calculator::calculate_burn_amounts(&state, burn_amt))
    }

    /// Decimal-adjusted price of the input asset in output-asset units
    pub async fn pool_ratio(&self, asset_in: AssetRef, asset_out: AssetRef) -> Result<f64> {
        let (asset_a, asset_b) = canonical_pair(asset_in.id, asset_out.id);
        let state = self.verified_state(asset_a, asset_b).await?;
        if state.reserve_a == 0 || state.reserve_b == 0 {
            return Ok(0.0);
        }
        let (in_sup, out_sup) = calculator::oriented_reserves(&state, asset_in.id, asset_out.id);
        let scaled_in = in_sup as f64 / 10f64.powi(asset_in.decimals as i32);
        let scaled_out = out_sup as f64 / 10f64.powi(asset_out.decimals as i32);
        Ok(scaled_in / scaled_out)
    }

    /// Fractional price impact a swap of `in_amt` would cause
    pub async fn price_impact(
        &self,
        in_id: AssetId,
        out_id: AssetId,
        in_amt: u64,
    ) -> Result<f64> {
        let (asset_a, asset_b) = canonical_pair(in_id, out_id);
        let state = self.verified_state(asset_a, asset_b).await?;
        Ok(calculator::calculate_price_impact(&state, in_id, out_id, in_amt))
    }

    /// Forward output and reverse input for one nominal amount
    pub async fn swap_results(
        &self,
        in_id: AssetId,
        out_id: AssetId,
        amount: u64,
    ) -> Result<SwapResults> {
        let (asset_a, asset_b) = canonical_pair(in_id, out_id);
        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let state = self.pool_state(pool_id).await?;
        calculator::calculate_swap_results(&state, in_id, out_id, amount)
    }

    async fn verified_state(&self, asset_a: AssetId, asset_b: AssetId) -> Result<PoolState> {
        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let state = self.pool_state(pool_id).await?;
        verify_pair(&state, asset_a, asset_b)?;
        Ok(state)
    }

    // ---- operations -------------------------------------------------------

    /// Create the pool for an asset pair.
    ///
    /// Fails locally when the pair already resolves. The master clones the
    /// stable template when both assets carry the stable flag, the standard
    /// template otherwise.
    pub async fn create_pair(
        &self,
        sender: &str,
        asset_x: AssetId,
        asset_y: AssetId,
    ) -> Result<ConfirmedGroup> {
        let (asset_a, asset_b) = canonical_pair(asset_x, asset_y);
        if self.pool_id_by_assets(asset_a, asset_b).await.is_ok() {
            return Err(AmmError::PoolExists);
        }

        let result: Result<ConfirmedGroup> = async {
            let stable_pair =
                self.is_stable_asset(asset_a).await && self.is_stable_asset(asset_b).await;
            let template_pool = self.template_pool_id(stable_pair).await?;
            let master = self.ledger.application_information(self.app_id).await?;
            let sp = self.ledger.suggested_params().await?;
            let built = build_create_pair_call(
                sender,
                self.app_id,
                &master.params.creator,
                template_pool,
                asset_a,
                asset_b,
                &sp,
            )?;
            tracing::info!(asset_a, asset_b, template_pool, "creating pool");
            Ok(self.ledger.execute_group(built.group).await?)
        }
        .await;
        result.map_err(|e| AmmError::CreatePair(e.to_string()))
    }

    /// Deposit liquidity into a pair's pool.
    ///
    /// `mint_amt` is the minimum LP amount the contract must mint (computed
    /// via [`Self::mint_amount`]); it is ignored by `fund` on the first
    /// deposit.
    pub async fn add_liquidity(
        &self,
        sender: &str,
        asset_x: AssetId,
        x_amt: u64,
        asset_y: AssetId,
        y_amt: u64,
        mint_amt: u64,
    ) -> Result<ConfirmedGroup> {
        let ((asset_a, a_amt), (asset_b, b_amt)) =
            canonical_pair_amounts((asset_x, x_amt), (asset_y, y_amt));
        for amount in [a_amt, b_amt] {
            if amount <= MIN_DEPOSIT {
                return Err(AmmError::AmountTooSmall {
                    amount,
                    min: MIN_DEPOSIT,
                });
            }
        }

        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let state = self.pool_state(pool_id).await?;
        verify_pair(&state, asset_a, asset_b)?;

        let needs_opt_in = !self.is_opted_in(state.pool_token, sender).await?;
        let stable_pair =
            self.is_stable_asset(asset_a).await && self.is_stable_asset(asset_b).await;
        let sp = self.ledger.suggested_params().await?;
        let built = build_add_liquidity_group(
            sender,
            pool_id,
            state.pool_token,
            asset_a,
            a_amt,
            asset_b,
            b_amt,
            mint_amt,
            state.is_unfunded(),
            stable_pair,
            needs_opt_in,
            &sp,
        )?;
        tracing::info!(
            pool_id,
            asset_a,
            asset_b,
            first_mint = built.summary.first_mint,
            "adding liquidity"
        );
        Ok(self.ledger.execute_group(built.group).await?)
    }

    /// Withdraw liquidity by burning LP tokens
    pub async fn remove_liquidity(
        &self,
        sender: &str,
        pool_id: AppId,
        burn_amt: u64,
        a_min_amt: u64,
        b_min_amt: u64,
    ) -> Result<ConfirmedGroup> {
        let state = self.pool_state(pool_id).await?;
        let available = self.balance(state.pool_token, sender).await?;
        if available < burn_amt {
            return Err(AmmError::InsufficientPoolTokens {
                required: burn_amt,
                available,
            });
        }

        let stable_pair = self.is_stable_asset(state.asset_a).await
            && self.is_stable_asset(state.asset_b).await;
        let sp = self.ledger.suggested_params().await?;
        let built = build_remove_liquidity_call(
            sender, pool_id, &state, burn_amt, a_min_amt, b_min_amt, stable_pair, &sp,
        )?;
        tracing::info!(pool_id, burn_amt, "removing liquidity");
        Ok(self.ledger.execute_group(built.group).await?)
    }

    /// Swap `in_amt` of one asset for the other side of its pair.
    ///
    /// `slippage` is the tolerated percentage between the quoted and the
    /// executed output; the resulting floor rides as the contract's
    /// minimum-output guard.
    pub async fn swap(
        &self,
        sender: &str,
        in_id: AssetId,
        in_amt: u64,
        out_id: AssetId,
        slippage: f64,
    ) -> Result<ConfirmedGroup> {
        let (asset_a, asset_b) = canonical_pair(in_id, out_id);
        let pool_id = self.pool_id_by_assets(asset_a, asset_b).await?;
        let state = self.pool_state(pool_id).await?;
        verify_pair(&state, asset_a, asset_b)?;

        let quoted_out = calculator::swap_output_for_state(&state, in_id, out_id, in_amt);
        let min_out = calculator::min_output_after_slippage(quoted_out, slippage);
        let needs_opt_in = !self.is_opted_in(out_id, sender).await?;
        let sp = self.ledger.suggested_params().await?;
        let built = build_swap_group(
            sender,
            pool_id,
            state.pool_token,
            in_id,
            in_amt,
            out_id,
            quoted_out,
            min_out,
            needs_opt_in,
            &sp,
        )?;
        tracing::info!(pool_id, in_id, out_id, in_amt, min_out, "swapping");
        Ok(self.ledger.execute_group(built.group).await?)
    }

    /// Opt the sender into an asset with a standalone zero-amount
    /// self-transfer
    pub async fn opt_in(&self, sender: &str, asset_id: AssetId) -> Result<ConfirmedGroup> {
        let sp = self.ledger.suggested_params().await?;
        let group = vec![Transaction::opt_in(sender, asset_id, &sp)];
        Ok(self.ledger.execute_group(group).await?)
    }

    // ---- master state -----------------------------------------------------

    /// Decoded global state of the master application
    pub async fn app_state(&self) -> Result<BTreeMap<String, StateValue>> {
        let info = self.ledger.application_information(self.app_id).await?;
        decode_global_state(&info.params.global_state)
    }

    async fn template_pool_id(&self, stable: bool) -> Result<AppId> {
        let key = if stable {
            KEY_TEMPLATE_STABLE_POOL
        } else {
            KEY_TEMPLATE_POOL
        };
        self.app_state()
            .await?
            .get(key)
            .and_then(StateValue::as_uint)
            .ok_or(AmmError::MissingStateKey(if stable {
                KEY_TEMPLATE_STABLE_POOL
            } else {
                KEY_TEMPLATE_POOL
            }))
    }
}

fn verify_pair(state: &PoolState, asset_a: AssetId, asset_b: AssetId) -> Result<()> {
    if !state.matches_pair(asset_a, asset_b) {
        return Err(AmmError::IncorrectPair {
            requested_a: asset_a,
            requested_b: asset_b,
            state_a: state.asset_a,
            state_b: state.asset_b,
        });
    }
    Ok(())
}
