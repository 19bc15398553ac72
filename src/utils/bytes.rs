//! Hex and byte-buffer helpers
//!
//! Hex strings are always `0x` prefixed on output. Inputs must carry the prefix
//! too; a bare string is not treated as hex.

use crate::error::{AbiError, AbiResult};

/// Check that `value` is `0x` followed by hex digits, optionally of exactly
/// `length` bytes.
pub fn is_hex_string(value: &str, length: Option<usize>) -> bool {
    let digits = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => digits,
        None => return false,
    };
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    match length {
        Some(length) => digits.len() == 2 * length,
        None => true,
    }
}

pub fn hexlify(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a `0x` hex string into bytes.
pub fn arrayify(value: &str) -> AbiResult<Vec<u8>> {
    if !is_hex_string(value, None) {
        return Err(AbiError::invalid_argument("invalid arrayify value", "value", value));
    }
    let digits = &value[2..];
    if digits.len() % 2 != 0 {
        return Err(AbiError::invalid_argument("hex data is odd-length", "value", value));
    }
    Ok(hex::decode(digits)?)
}

pub fn concat(items: &[&[u8]]) -> Vec<u8> {
    let total = items.iter().map(|item| item.len()).sum();
    let mut result = Vec::with_capacity(total);
    for item in items {
        result.extend_from_slice(item);
    }
    result
}

pub fn hex_concat(items: &[&str]) -> AbiResult<String> {
    let mut result = String::from("0x");
    for item in items {
        let bytes = arrayify(item)?;
        result.push_str(&hex::encode(bytes));
    }
    Ok(result)
}

/// Byte length of a hex string, or `None` when it is not valid even-length hex.
pub fn hex_data_length(data: &str) -> Option<usize> {
    if !is_hex_string(data, None) || data.len() % 2 != 0 {
        return None;
    }
    Some((data.len() - 2) / 2)
}

pub fn hex_data_slice(data: &str, offset: usize, end: Option<usize>) -> AbiResult<String> {
    let bytes = arrayify(data)?;
    let end = end.unwrap_or(bytes.len());
    if offset > end || end > bytes.len() {
        return Err(AbiError::buffer_overrun("data out-of-bounds", bytes.len(), offset));
    }
    Ok(hexlify(&bytes[offset..end]))
}

/// Left-pad with zeros to `length` bytes.
pub fn zero_pad(bytes: &[u8], length: usize) -> AbiResult<Vec<u8>> {
    if bytes.len() > length {
        return Err(AbiError::invalid_argument(
            "value out of range",
            "value",
            hexlify(bytes),
        ));
    }
    let mut result = vec![0u8; length - bytes.len()];
    result.extend_from_slice(bytes);
    Ok(result)
}

pub fn hex_zero_pad(value: &str, length: usize) -> AbiResult<String> {
    let bytes = arrayify(value)?;
    Ok(hexlify(&zero_pad(&bytes, length)?))
}

/// Drop leading zero bytes.
pub fn strip_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hex_string() {
        assert!(is_hex_string("0x", None));
        assert!(is_hex_string("0xdeadBEEF", Some(4)));
        assert!(!is_hex_string("0xdeadbeef", Some(3)));
        assert!(!is_hex_string("deadbeef", None));
        assert!(!is_hex_string("0xzz", None));
    }

    #[test]
    fn test_arrayify() {
        assert_eq!(arrayify("0x0102").unwrap(), vec![1, 2]);
        assert!(arrayify("0x012").is_err());
        assert!(arrayify("0102").is_err());
        assert_eq!(hexlify(&[0xab, 0x01]), "0xab01");
    }

    #[test]
    fn test_concat_and_slice() {
        assert_eq!(concat(&[&[1, 2], &[], &[3]]), vec![1, 2, 3]);
        assert_eq!(hex_concat(&["0x01", "0x0203"]).unwrap(), "0x010203");
        assert_eq!(hex_data_length("0x010203"), Some(3));
        assert_eq!(hex_data_length("0x123"), None);
        assert_eq!(hex_data_slice("0x010203", 1, None).unwrap(), "0x0203");
        assert_eq!(hex_data_slice("0x010203", 0, Some(1)).unwrap(), "0x01");
        assert!(hex_data_slice("0x0102", 1, Some(5)).is_err());
    }

    #[test]
    fn test_padding() {
        assert_eq!(zero_pad(&[1, 2], 4).unwrap(), vec![0, 0, 1, 2]);
        assert!(zero_pad(&[1, 2, 3], 2).is_err());
        assert_eq!(hex_zero_pad("0x01", 2).unwrap(), "0x0001");
        assert_eq!(strip_zeros(&[0, 0, 5, 0]), &[5, 0]);
        assert!(strip_zeros(&[0, 0]).is_empty());
    }
}
