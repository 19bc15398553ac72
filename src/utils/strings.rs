//! UTF-8 encoding and decoding with configurable error handling

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization as _;

use crate::error::{AbiError, AbiResult};

/// What to do with malformed UTF-8 while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Utf8ErrorPolicy {
    /// Fail at the first invalid sequence
    #[default]
    Error,
    /// Drop invalid sequences
    Ignore,
    /// Substitute U+FFFD for each invalid sequence
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeNormalization {
    #[default]
    Current,
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

pub fn to_utf8_bytes(text: &str, form: UnicodeNormalization) -> Vec<u8> {
    match form {
        UnicodeNormalization::Current => text.as_bytes().to_vec(),
        UnicodeNormalization::Nfc => text.nfc().collect::<String>().into_bytes(),
        UnicodeNormalization::Nfd => text.nfd().collect::<String>().into_bytes(),
        UnicodeNormalization::Nfkc => text.nfkc().collect::<String>().into_bytes(),
        UnicodeNormalization::Nfkd => text.nfkd().collect::<String>().into_bytes(),
    }
}

pub fn to_utf8_string(bytes: &[u8], policy: Utf8ErrorPolicy) -> AbiResult<String> {
    let mut result = String::with_capacity(bytes.len());
    let mut rest = bytes;
    let mut offset = 0;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                result.push_str(valid);
                return Ok(result);
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                // Safe split: the prefix was just validated
                result.push_str(std::str::from_utf8(&rest[..valid_up_to]).unwrap_or_default());

                let bad_len = e.error_len().unwrap_or(rest.len() - valid_up_to);
                match policy {
                    Utf8ErrorPolicy::Error => {
                        return Err(AbiError::invalid_argument(
                            format!("invalid utf8 byte sequence at offset {}", offset + valid_up_to),
                            "bytes",
                            crate::utils::bytes::hexlify(bytes),
                        ));
                    }
                    Utf8ErrorPolicy::Ignore => {}
                    Utf8ErrorPolicy::Replace => result.push('\u{fffd}'),
                }

                let skip = valid_up_to + bad_len;
                offset += skip;
                rest = &rest[skip..];
            }
        }
    }
}

/// Encode a short string as a NUL-terminated bytes32 word.
pub fn format_bytes32_string(text: &str) -> AbiResult<[u8; 32]> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(AbiError::invalid_argument(
            "bytes32 string must be less than 32 bytes",
            "text",
            text,
        ));
    }
    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(word)
}

pub fn parse_bytes32_string(bytes: &[u8]) -> AbiResult<String> {
    if bytes.len() != 32 {
        return Err(AbiError::invalid_argument(
            "invalid bytes32 - not 32 bytes long",
            "bytes",
            crate::utils::bytes::hexlify(bytes),
        ));
    }
    if bytes[31] != 0 {
        return Err(AbiError::invalid_argument(
            "invalid bytes32 string - no null terminator",
            "bytes",
            crate::utils::bytes::hexlify(bytes),
        ));
    }
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(31);
    to_utf8_string(&bytes[..end], Utf8ErrorPolicy::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_policies() {
        let bytes = [b'h', b'i', 0xff, b'!', 0xc3];
        assert!(to_utf8_string(&bytes, Utf8ErrorPolicy::Error).is_err());
        assert_eq!(to_utf8_string(&bytes, Utf8ErrorPolicy::Ignore).unwrap(), "hi!");
        assert_eq!(
            to_utf8_string(&bytes, Utf8ErrorPolicy::Replace).unwrap(),
            "hi\u{fffd}!\u{fffd}"
        );
        assert_eq!(to_utf8_string("héllo".as_bytes(), Utf8ErrorPolicy::Error).unwrap(), "héllo");
    }

    #[test]
    fn test_error_reports_offset() {
        let err = to_utf8_string(&[b'a', b'b', 0x80], Utf8ErrorPolicy::Error).unwrap_err();
        assert!(err.to_string().contains("offset 2"));
    }

    #[test]
    fn test_normalization() {
        let decomposed = "e\u{301}";
        assert_eq!(to_utf8_bytes(decomposed, UnicodeNormalization::Nfc), "é".as_bytes());
        assert_eq!(to_utf8_bytes("é", UnicodeNormalization::Nfd), decomposed.as_bytes());
        assert_eq!(to_utf8_bytes(decomposed, UnicodeNormalization::Current), decomposed.as_bytes());
    }

    #[test]
    fn test_bytes32_strings() {
        let word = format_bytes32_string("hello").unwrap();
        assert_eq!(&word[..5], b"hello");
        assert_eq!(parse_bytes32_string(&word).unwrap(), "hello");
        assert!(format_bytes32_string(&"x".repeat(32)).is_err());
        assert!(parse_bytes32_string(&[1u8; 32]).is_err());
        assert!(parse_bytes32_string(&[0u8; 31]).is_err());
    }
}
