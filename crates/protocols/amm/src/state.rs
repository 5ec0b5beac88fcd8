//! Pool state types and the global-state decoder
//!
//! A pool application's global state arrives as raw `(base64 key, typed
//! value)` entries. [`decode_global_state`] turns them into a keyed map;
//! [`PoolState::from_global_state`] validates the required fields into a
//! typed record.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledger_client::encoding::encode_address;
use ledger_client::{StateEntry, TealValue};
use tidepool_core::{AppId, AssetId, LedgerError};

use crate::constants::DEFAULT_POOL_FEE;

/// Pool type tag, from the `pt` global-state key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolType {
    /// Amplified-curve pool for pegged assets
    #[serde(rename = "STABLE")]
    Stable,
    /// Standard constant-product pool
    #[serde(rename = "CONSTANT_PRODUCT")]
    ConstantProduct,
}

impl PoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::ConstantProduct => "CONSTANT_PRODUCT",
        }
    }

    fn parse(tag: &str) -> Result<Self, AmmError> {
        match tag {
            "STABLE" => Ok(Self::Stable),
            "CONSTANT_PRODUCT" => Ok(Self::ConstantProduct),
            other => Err(AmmError::StateDecode(format!(
                "unknown pool type tag '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded global-state value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StateValue {
    Uint(u64),
    Bytes(Vec<u8>),
    /// Byte values that decode further: `gov` to an address, `pt` to a tag
    Str(String),
}

impl StateValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Decode raw global-state entries into a map keyed by the decoded key name.
///
/// Uint-typed values decode to integers, byte-typed values to raw bytes. Two
/// keys decode further: `gov` (32 raw public-key bytes) becomes an account
/// address string and `pt` becomes a UTF-8 tag. Unrecognized keys pass
/// through verbatim.
pub fn decode_global_state(
    entries: &[StateEntry],
) -> Result<BTreeMap<String, StateValue>, AmmError> {
    let mut state = BTreeMap::new();
    for entry in entries {
        let key_bytes = BASE64
            .decode(&entry.key)
            .map_err(|e| AmmError::StateDecode(format!("bad key base64: {e}")))?;
        let key = String::from_utf8_lossy(&key_bytes).into_owned();

        let value = match entry.value.value_type {
            TealValue::UINT => StateValue::Uint(entry.value.uint),
            TealValue::BYTES => {
                let bytes = BASE64.decode(&entry.value.bytes).map_err(|e| {
                    AmmError::StateDecode(format!("bad value base64 for '{key}': {e}"))
                })?;
                match key.as_str() {
                    "gov" => StateValue::Str(encode_address(&bytes).map_err(|e| {
                        AmmError::StateDecode(format!("bad governor key bytes: {e}"))
                    })?),
                    "pt" => StateValue::Str(String::from_utf8_lossy(&bytes).into_owned()),
                    _ => StateValue::Bytes(bytes),
                }
            }
            other => {
                return Err(AmmError::StateDecode(format!(
                    "unknown value type tag {other} for '{key}'"
                )))
            }
        };
        state.insert(key, value);
    }
    Ok(state)
}

/// Stable-pool extension fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableParams {
    /// Decimals of asset A (`ad`)
    pub decimals_a: u64,
    /// Decimals of asset B (`bd`)
    pub decimals_b: u64,
    /// Amplification coefficient (`amp`)
    pub amp: u64,
}

/// Typed global state of one pool application.
///
/// `asset_a < asset_b` always holds; the pool is created under the canonical
/// ordering and the contract never reorders the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Lower asset id of the pair (`a`)
    pub asset_a: AssetId,
    /// Higher asset id of the pair (`b`)
    pub asset_b: AssetId,
    /// Reserve of asset A (`ra`)
    pub reserve_a: u64,
    /// Reserve of asset B (`rb`)
    pub reserve_b: u64,
    /// Outstanding LP token supply (`ma`)
    pub minted: u64,
    /// LP token asset id (`p`)
    pub pool_token: AssetId,
    /// Governor account address (`gov`)
    pub governor: String,
    /// Pool fee (`f`); `None` when the key is absent. A present zero is a
    /// legitimate zero fee, not a request for the default.
    pub fee: Option<u64>,
    /// Pool type tag (`pt`); `None` when the key is absent
    pub pool_type: Option<PoolType>,
    /// Stable-pool extension, present when `ad`, `bd`, and `amp` all decode
    pub stable: Option<StableParams>,
}

impl PoolState {
    /// Validate a decoded state map into a typed record, failing fast on any
    /// missing required key.
    pub fn from_global_state(state: &BTreeMap<String, StateValue>) -> Result<Self, AmmError> {
        let required_uint = |key: &'static str| -> Result<u64, AmmError> {
            state
                .get(key)
                .and_then(StateValue::as_uint)
                .ok_or(AmmError::MissingStateKey(key))
        };
        let governor = state
            .get("gov")
            .and_then(StateValue::as_str)
            .ok_or(AmmError::MissingStateKey("gov"))?
            .to_string();
        let pool_type = state
            .get("pt")
            .and_then(StateValue::as_str)
            .map(PoolType::parse)
            .transpose()?;
        let stable = match (
            state.get("ad").and_then(StateValue::as_uint),
            state.get("bd").and_then(StateValue::as_uint),
            state.get("amp").and_then(StateValue::as_uint),
        ) {
            (Some(decimals_a), Some(decimals_b), Some(amp)) => Some(StableParams {
                decimals_a,
                decimals_b,
                amp,
            }),
            _ => None,
        };

        Ok(Self {
            asset_a: required_uint("a")?,
            asset_b: required_uint("b")?,
            reserve_a: required_uint("ra")?,
            reserve_b: required_uint("rb")?,
            minted: required_uint("ma")?,
            pool_token: required_uint("p")?,
            governor,
            fee: state.get("f").and_then(StateValue::as_uint),
            pool_type,
            stable,
        })
    }

    /// Decode raw entries straight into a typed record
    pub fn from_entries(entries: &[StateEntry]) -> Result<Self, AmmError> {
        Self::from_global_state(&decode_global_state(entries)?)
    }

    /// Pool fee, defaulting only when the `f` key is absent
    pub fn fee_or_default(&self) -> u64 {
        self.fee.unwrap_or(DEFAULT_POOL_FEE)
    }

    /// Pool type, defaulting only when the `pt` key is absent
    pub fn pool_type_or_default(&self) -> PoolType {
        self.pool_type.unwrap_or(PoolType::ConstantProduct)
    }

    /// True until the pool receives its first deposit. Both reserves are
    /// strictly positive afterwards for as long as liquidity is outstanding.
    pub fn is_unfunded(&self) -> bool {
        self.reserve_a == 0 && self.reserve_b == 0
    }

    /// Whether `(asset_a, asset_b)` matches the given canonical pair
    pub fn matches_pair(&self, asset_a: AssetId, asset_b: AssetId) -> bool {
        self.asset_a == asset_a && self.asset_b == asset_b
    }
}

/// Resolved view of a pool: state plus asset metadata for both sides.
///
/// Everything except `pool_state` is immutable once the pool exists and is
/// served from cache on repeat resolutions; `pool_state` is re-fetched every
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub a_id: AssetId,
    pub a_name: String,
    pub a_unit_name: String,
    pub a_decimals: u32,
    pub b_id: AssetId,
    pub b_name: String,
    pub b_unit_name: String,
    pub b_decimals: u32,
    pub pool_id: AppId,
    pub pool_token: AssetId,
    pub pool_state: PoolState,
    pub fee: u64,
    pub pool_type: PoolType,
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Pool {} | {}: {} | {}: {}",
            self.pool_type,
            self.pool_id,
            self.a_unit_name,
            self.pool_state.reserve_a,
            self.b_unit_name,
            self.pool_state.reserve_b
        )
    }
}

/// Per-side amounts returned by the burn formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmounts {
    pub asset_a: u64,
    pub asset_b: u64,
}

/// Forward output and reverse input computed from one nominal amount.
///
/// The two fields answer different questions (amount-as-input vs
/// amount-as-output) and are not inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResults {
    pub swap_output: u64,
    pub swap_input: u64,
}

/// Asset reference with display decimals, for ratio queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: AssetId,
    pub decimals: u32,
}

/// A held asset with its unit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetListing {
    pub id: AssetId,
    pub unit_name: String,
}

/// AMM protocol errors
#[derive(Debug, Error)]
pub enum AmmError {
    #[error("pool not found for pair {a}/{b}")]
    PoolNotFound { a: AssetId, b: AssetId },

    #[error("pool already created")]
    PoolExists,

    #[error("incorrect pair: requested {requested_a}/{requested_b}, pool holds {state_a}/{state_b}")]
    IncorrectPair {
        requested_a: AssetId,
        requested_b: AssetId,
        state_a: AssetId,
        state_b: AssetId,
    },

    #[error("too small amount: {amount} (must exceed {min})")]
    AmountTooSmall { amount: u64, min: u64 },

    #[error("insufficient pool token balance: need {required}, have {available}")]
    InsufficientPoolTokens { required: u64, available: u64 },

    #[error("insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[error("square root of a negative number")]
    NegativeSqrt,

    #[error("method undefined: {0}")]
    UnknownMethod(String),

    #[error("missing global state key: {0}")]
    MissingStateKey(&'static str),

    #[error("failed to decode global state: {0}")]
    StateDecode(String),

    #[error("no pool mints LP token {0}")]
    PoolTokenNotFound(AssetId),

    #[error("no swap logs in transaction {0}")]
    NoSwapLogs(String),

    #[error("create pair failed: {0}")]
    CreatePair(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: TealValue) -> StateEntry {
        StateEntry {
            key: BASE64.encode(key.as_bytes()),
            value,
        }
    }

    fn bytes_entry(key: &str, bytes: &[u8]) -> StateEntry {
        entry(key, TealValue::bytes(BASE64.encode(bytes)))
    }

    fn base_entries() -> Vec<StateEntry> {
        vec![
            entry("a", TealValue::uint(1)),
            entry("b", TealValue::uint(9)),
            entry("ra", TealValue::uint(500)),
            entry("rb", TealValue::uint(700)),
            entry("ma", TealValue::uint(100)),
            entry("p", TealValue::uint(42)),
            bytes_entry("gov", &[3u8; 32]),
        ]
    }

    #[test]
    fn test_gov_decodes_to_address_string() {
        let state = decode_global_state(&base_entries()).unwrap();
        let gov = state.get("gov").and_then(StateValue::as_str).unwrap();
        assert_eq!(gov.len(), 58);
        assert_eq!(
            gov,
            &encode_address(&[3u8; 32]).unwrap()
        );
    }

    #[test]
    fn test_pt_decodes_to_tag_string() {
        let mut entries = base_entries();
        entries.push(bytes_entry("pt", b"STABLE"));
        let state = decode_global_state(&entries).unwrap();
        assert_eq!(
            state.get("pt").and_then(StateValue::as_str),
            Some("STABLE")
        );
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let mut entries = base_entries();
        entries.push(entry("set", TealValue::uint(1)));
        entries.push(bytes_entry("blob", &[1, 2, 3]));
        let state = decode_global_state(&entries).unwrap();
        assert_eq!(state.get("set"), Some(&StateValue::Uint(1)));
        assert_eq!(state.get("blob"), Some(&StateValue::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn test_typed_state_from_entries() {
        let state = PoolState::from_entries(&base_entries()).unwrap();
        assert_eq!(state.asset_a, 1);
        assert_eq!(state.asset_b, 9);
        assert_eq!(state.reserve_a, 500);
        assert_eq!(state.pool_token, 42);
        assert_eq!(state.fee, None);
        assert_eq!(state.fee_or_default(), DEFAULT_POOL_FEE);
        assert_eq!(state.pool_type_or_default(), PoolType::ConstantProduct);
        assert!(!state.is_unfunded());
        assert!(state.matches_pair(1, 9));
        assert!(!state.matches_pair(1, 8));
    }

    #[test]
    fn test_missing_required_key_fails_fast() {
        let mut entries = base_entries();
        entries.retain(|e| e.key != BASE64.encode(b"ma"));
        let err = PoolState::from_entries(&entries).unwrap_err();
        assert!(matches!(err, AmmError::MissingStateKey("ma")));
    }

    #[test]
    fn test_present_zero_fee_is_not_defaulted() {
        let mut entries = base_entries();
        entries.push(entry("f", TealValue::uint(0)));
        let state = PoolState::from_entries(&entries).unwrap();
        assert_eq!(state.fee, Some(0));
        assert_eq!(state.fee_or_default(), 0);
    }

    #[test]
    fn test_stable_extension_requires_all_three_keys() {
        let mut entries = base_entries();
        entries.push(bytes_entry("pt", b"STABLE"));
        entries.push(entry("ad", TealValue::uint(6)));
        entries.push(entry("bd", TealValue::uint(6)));
        let partial = PoolState::from_entries(&entries).unwrap();
        assert!(partial.stable.is_none());

        entries.push(entry("amp", TealValue::uint(80)));
        let full = PoolState::from_entries(&entries).unwrap();
        assert_eq!(
            full.stable,
            Some(StableParams {
                decimals_a: 6,
                decimals_b: 6,
                amp: 80
            })
        );
        assert_eq!(full.pool_type, Some(PoolType::Stable));
    }

    #[test]
    fn test_unknown_pool_type_tag_rejected() {
        let mut entries = base_entries();
        entries.push(bytes_entry("pt", b"WEIGHTED"));
        assert!(matches!(
            PoolState::from_entries(&entries),
            Err(AmmError::StateDecode(_))
        ));
    }
}
