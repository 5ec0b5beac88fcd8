//! Canonical asset-pair handling
//!
//! Pools are always addressed by `(min, max)` asset-id order; the master
//! contract indexes them in box storage under the concatenated big-endian
//! encodings of both ids.

use ledger_client::encoding::encode_uint64;
use tidepool_core::AssetId;

/// Order two asset ids canonically: `(min, max)`
pub fn canonical_pair(asset_x: AssetId, asset_y: AssetId) -> (AssetId, AssetId) {
    if asset_x > asset_y {
        (asset_y, asset_x)
    } else {
        (asset_x, asset_y)
    }
}

/// Order two (id, amount) sides canonically, keeping amounts with their ids
pub fn canonical_pair_amounts(
    side_x: (AssetId, u64),
    side_y: (AssetId, u64),
) -> ((AssetId, u64), (AssetId, u64)) {
    if side_x.0 > side_y.0 {
        (side_y, side_x)
    } else {
        (side_x, side_y)
    }
}

/// Box name under the master application indexing the pair's pool id:
/// `be64(a) || be64(b)` for a canonical pair `(a, b)`
pub fn pair_box_name(asset_a: AssetId, asset_b: AssetId) -> [u8; 16] {
    let mut name = [0u8; 16];
    name[..8].copy_from_slice(&encode_uint64(asset_a));
    name[8..].copy_from_slice(&encode_uint64(asset_b));
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_is_order_independent() {
        for (x, y) in [(1u64, 2u64), (2, 1), (0, 77), (77, 0), (5, 5)] {
            assert_eq!(canonical_pair(x, y), canonical_pair(y, x));
            assert_eq!(canonical_pair(x, y), (x.min(y), x.max(y)));
        }
    }

    #[test]
    fn test_canonical_pair_amounts_keep_sides_together() {
        let ((a, a_amt), (b, b_amt)) = canonical_pair_amounts((9, 100), (2, 50));
        assert_eq!((a, a_amt), (2, 50));
        assert_eq!((b, b_amt), (9, 100));
    }

    #[test]
    fn test_pair_box_name_layout() {
        let name = pair_box_name(1, 256);
        assert_eq!(&name[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&name[8..], &[0, 0, 0, 0, 0, 0, 1, 0]);
    }
}
