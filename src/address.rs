//! Address normalization and derivation
//!
//! Accepts plain hex (any case, with or without `0x`) and ICAP (`XE..`)
//! addresses. Every successful result is the checksummed `0x` form.

use num_bigint::BigInt;
use num_traits::{Num, ToPrimitive};

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};
use crate::utils::bytes::{arrayify, strip_zeros};
use crate::utils::crypto::{keccak256, to_checksum_address};

fn invalid_address(message: &str, value: &str) -> AbiError {
    AbiError::invalid_argument(message, "address", value)
}

fn is_plain_hex_address(value: &str) -> bool {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_icap_address(value: &str) -> bool {
    let bytes = value.as_bytes();
    value.len() >= 34
        && value.len() <= 35
        && value.starts_with("XE")
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4..].iter().all(|b| b.is_ascii_alphanumeric())
}

/// Normalize an address to its checksummed form.
///
/// A mixed-case input must already carry the correct checksum.
pub fn get_address(address: &str) -> AbiResult<String> {
    if is_plain_hex_address(address) {
        let digits = address.strip_prefix("0x").unwrap_or(address);
        let raw = hex::decode(digits.to_ascii_lowercase())?;
        let result = to_checksum_address(&raw);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && result[2..] != *digits {
            return Err(invalid_address("bad address checksum", address));
        }
        return Ok(result);
    }

    if is_icap_address(address) {
        if address[2..4] != iban_checksum(address) {
            return Err(invalid_address("bad icap checksum", address));
        }
        let value = BigInt::from_str_radix(&address[4..].to_ascii_lowercase(), 36)
            .map_err(|_| invalid_address("invalid address", address))?;
        let digits = format!("{:0>40}", value.to_str_radix(16));
        if digits.len() != 40 {
            return Err(invalid_address("invalid address", address));
        }
        let raw = hex::decode(digits)?;
        return Ok(to_checksum_address(&raw));
    }

    Err(invalid_address("invalid address", address))
}

pub fn is_address(address: &str) -> bool {
    get_address(address).is_ok()
}

/// Two-digit IBAN checksum over an `XE..` string (the existing check digits
/// are ignored).
fn iban_checksum(address: &str) -> String {
    let upper = address.to_ascii_uppercase();
    let rearranged = format!("{}{}00", &upper[4..], &upper[..2]);

    let expanded: String = rearranged
        .chars()
        .map(|c| match c.to_digit(36) {
            Some(v) => v.to_string(),
            None => String::new(),
        })
        .collect();

    let remainder = BigInt::from_str_radix(&expanded, 10)
        .ok()
        .and_then(|n| (n % 97u32).to_u32())
        .unwrap_or(0);
    format!("{:02}", 98 - remainder)
}

/// ICAP form of an address.
pub fn get_icap_address(address: &str) -> AbiResult<String> {
    let checksummed = get_address(address)?;
    let value = BigInt::from_str_radix(&checksummed[2..].to_ascii_lowercase(), 16)
        .map_err(|_| invalid_address("invalid address", address))?;
    let base36 = format!("{:0>30}", value.to_str_radix(36).to_ascii_uppercase());
    let checksum = iban_checksum(&format!("XE00{}", base36));
    Ok(format!("XE{}{}", checksum, base36))
}

/// Address of a contract created by `from` with the given account nonce.
pub fn get_contract_address(from: &str, nonce: &BigNumber) -> AbiResult<String> {
    let from = get_address(from)?;
    let from_bytes = arrayify(&from)?;
    if nonce.is_negative() {
        return Err(AbiError::invalid_argument("invalid nonce", "nonce", nonce.to_string()));
    }
    let nonce_bytes = nonce.magnitude_bytes();

    let encoded = rlp_encode_list(&[
        rlp_encode_bytes(&from_bytes),
        rlp_encode_bytes(strip_zeros(&nonce_bytes)),
    ]);
    Ok(to_checksum_address(&keccak256(&encoded)[12..]))
}

/// Address of a contract deployed through CREATE2.
pub fn get_create2_address(from: &str, salt: &[u8], init_code_hash: &[u8]) -> AbiResult<String> {
    if salt.len() != 32 {
        return Err(AbiError::invalid_argument(
            "salt must be 32 bytes",
            "salt",
            crate::utils::bytes::hexlify(salt),
        ));
    }
    if init_code_hash.len() != 32 {
        return Err(AbiError::invalid_argument(
            "initCodeHash must be 32 bytes",
            "initCodeHash",
            crate::utils::bytes::hexlify(init_code_hash),
        ));
    }

    let from = get_address(from)?;
    let mut preimage = Vec::with_capacity(85);
    preimage.push(0xff);
    preimage.extend_from_slice(&arrayify(&from)?);
    preimage.extend_from_slice(salt);
    preimage.extend_from_slice(init_code_hash);
    Ok(to_checksum_address(&keccak256(&preimage)[12..]))
}

fn rlp_encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }

    if data.len() < 56 {
        let mut result = vec![0x80 + data.len() as u8];
        result.extend_from_slice(data);
        result
    } else {
        let len_bytes = encode_length(data.len());
        let mut result = vec![0xb7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(data);
        result
    }
}

fn rlp_encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.concat();

    if payload.len() < 56 {
        let mut result = vec![0xc0 + payload.len() as u8];
        result.extend_from_slice(&payload);
        result
    } else {
        let len_bytes = encode_length(payload.len());
        let mut result = vec![0xf7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(&payload);
        result
    }
}

fn encode_length(len: usize) -> Vec<u8> {
    strip_zeros(&len.to_be_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const CHECKSUMMED: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

    #[test]
    fn test_get_address_normalizes() {
        assert_eq!(get_address(&CHECKSUMMED.to_lowercase()).unwrap(), CHECKSUMMED);
        assert_eq!(get_address(&CHECKSUMMED[2..].to_lowercase()).unwrap(), CHECKSUMMED);
        assert_eq!(
            get_address(&format!("0x{}", CHECKSUMMED[2..].to_uppercase())).unwrap(),
            CHECKSUMMED
        );
    }

    #[test]
    fn test_get_address_idempotent() {
        let once = get_address(CHECKSUMMED).unwrap();
        assert_eq!(get_address(&once).unwrap(), once);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let bad = "0x8Ba1f109551bD432803012645Ac136ddd64DBA72";
        let err = get_address(bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.to_string().contains("bad address checksum"));
        assert!(!is_address(bad));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(get_address("0x1234").is_err());
        assert!(get_address("0xzz a1f109551bD432803012645Ac136ddd64DBA7").is_err());
        assert!(get_address("").is_err());
    }

    #[test]
    fn test_icap_round_trip() {
        let icap = get_icap_address(CHECKSUMMED).unwrap();
        assert_eq!(icap, "XE65GB6LDNXYOFTX0NSV3FUWKOWIXAMJK36");
        assert_eq!(get_address(&icap).unwrap(), CHECKSUMMED);
        assert!(get_address("XE66GB6LDNXYOFTX0NSV3FUWKOWIXAMJK36").is_err());
    }

    #[test]
    fn test_contract_address() {
        let from = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0";
        let first = get_contract_address(from, &BigNumber::from(0u8)).unwrap();
        assert_eq!(first.to_lowercase(), "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d");
        let second = get_contract_address(from, &BigNumber::from(1u8)).unwrap();
        assert_eq!(second.to_lowercase(), "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8");
    }

    #[test]
    fn test_create2_address() {
        let from = "0x0000000000000000000000000000000000000000";
        let init_code_hash = keccak256(&[0x00]);
        let address = get_create2_address(from, &[0u8; 32], &init_code_hash).unwrap();
        assert_eq!(address, "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
        assert!(get_create2_address(from, &[0u8; 31], &init_code_hash).is_err());
    }
}
