//! Canonical binary encodings of the ledger
//!
//! Big-endian 64-bit integers (box names, box values, log payloads) and the
//! account address format: 32 raw public-key bytes followed by the last 4
//! bytes of their SHA-512/256 digest, the whole 36 bytes rendered as unpadded
//! RFC 4648 base32.

use sha2::{Digest, Sha512_256};

use tidepool_core::constants::{ADDRESS_LEN, CHECKSUM_LEN, PUBLIC_KEY_LEN};
use tidepool_core::{AppId, LedgerError};

use crate::Result;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Domain separator for application address derivation
const APP_ID_PREFIX: &[u8] = b"appID";

/// Encode a u64 as 8 big-endian bytes
pub fn encode_uint64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode 1 to 8 big-endian bytes into a u64
pub fn decode_uint64(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(LedgerError::Parse(format!(
            "uint64 must be 1-8 bytes, got {}",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

/// Encode a 32-byte public key as an account address string
pub fn encode_address(public_key: &[u8]) -> Result<String> {
    if public_key.len() != PUBLIC_KEY_LEN {
        return Err(LedgerError::InvalidAddress(format!(
            "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
            public_key.len()
        )));
    }
    let digest = Sha512_256::digest(public_key);
    let mut raw = [0u8; PUBLIC_KEY_LEN + CHECKSUM_LEN];
    raw[..PUBLIC_KEY_LEN].copy_from_slice(public_key);
    raw[PUBLIC_KEY_LEN..].copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    Ok(base32_encode(&raw))
}

/// Decode an account address string back into its 32 public-key bytes,
/// verifying the checksum
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LEN]> {
    if address.len() != ADDRESS_LEN {
        return Err(LedgerError::InvalidAddress(format!(
            "address must be {ADDRESS_LEN} characters, got {}",
            address.len()
        )));
    }
    let raw = base32_decode(address)?;
    if raw.len() < PUBLIC_KEY_LEN + CHECKSUM_LEN {
        return Err(LedgerError::InvalidAddress(address.to_string()));
    }
    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&raw[..PUBLIC_KEY_LEN]);
    let digest = Sha512_256::digest(public_key);
    if raw[PUBLIC_KEY_LEN..PUBLIC_KEY_LEN + CHECKSUM_LEN]
        != digest[digest.len() - CHECKSUM_LEN..]
    {
        return Err(LedgerError::InvalidAddress(format!(
            "checksum mismatch in {address}"
        )));
    }
    Ok(public_key)
}

/// Derive the escrow address of an application.
///
/// The ledger assigns every application the address of
/// `SHA-512/256("appID" || big-endian id)`.
pub fn application_address(app_id: AppId) -> String {
    let mut hasher = Sha512_256::new();
    hasher.update(APP_ID_PREFIX);
    hasher.update(encode_uint64(app_id));
    let digest = hasher.finalize();
    // The digest is exactly PUBLIC_KEY_LEN bytes, so encoding cannot fail.
    encode_address(&digest).unwrap_or_default()
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut buf: u32 = 0;
    let mut bits = 0u32;
    for &byte in data {
        buf = (buf << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[(buf >> bits) as usize & 31] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[(buf << (5 - bits)) as usize & 31] as char);
    }
    out
}

fn base32_decode(input: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buf: u32 = 0;
    let mut bits = 0u32;
    for ch in input.bytes() {
        let value = match ch {
            b'A'..=b'Z' => ch - b'A',
            b'2'..=b'7' => ch - b'2' + 26,
            _ => {
                return Err(LedgerError::InvalidAddress(format!(
                    "invalid base32 character '{}'",
                    ch as char
                )))
            }
        };
        buf = (buf << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint64_round_trip() {
        for v in [0u64, 1, 255, 256, u64::MAX, 3_324_100] {
            assert_eq!(decode_uint64(&encode_uint64(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_uint64_short_input() {
        assert_eq!(decode_uint64(&[1, 0]).unwrap(), 256);
        assert!(decode_uint64(&[]).is_err());
        assert!(decode_uint64(&[0; 9]).is_err());
    }

    #[test]
    fn test_address_round_trip() {
        let pk: [u8; 32] = core::array::from_fn(|i| i as u8);
        let addr = encode_address(&pk).unwrap();
        assert_eq!(addr.len(), 58);
        assert_eq!(decode_address(&addr).unwrap(), pk);
    }

    #[test]
    fn test_address_rejects_corruption() {
        let pk = [7u8; 32];
        let addr = encode_address(&pk).unwrap();
        // Flip the first character to a different alphabet symbol.
        let flipped: String = {
            let mut chars: Vec<char> = addr.chars().collect();
            chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
            chars.into_iter().collect()
        };
        assert!(decode_address(&flipped).is_err());
    }

    #[test]
    fn test_address_rejects_bad_length_and_charset() {
        assert!(decode_address("SHORT").is_err());
        let lower = "a".repeat(58);
        assert!(decode_address(&lower).is_err());
        assert!(encode_address(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_application_address_is_valid_and_stable() {
        let a = application_address(1234);
        let b = application_address(1234);
        assert_eq!(a, b);
        assert_eq!(a.len(), 58);
        assert!(decode_address(&a).is_ok());
        assert_ne!(application_address(1235), a);
    }
}
