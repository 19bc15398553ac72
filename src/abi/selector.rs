//! Function selector and event topic calculation

use crate::bignumber::BigNumber;
use crate::utils::crypto::id;

/// ABI selector calculator
pub struct AbiSelector;

impl AbiSelector {
    /// First 4 bytes of keccak256(signature)
    pub fn selector_from_signature(signature: &str) -> [u8; 4] {
        let hash = id(signature);
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// keccak256(signature)
    pub fn topic_from_signature(signature: &str) -> [u8; 32] {
        id(signature)
    }

    pub fn selector_hex(signature: &str) -> String {
        format!("0x{}", hex::encode(Self::selector_from_signature(signature)))
    }

    pub fn topic_hex(signature: &str) -> String {
        format!("0x{}", hex::encode(Self::topic_from_signature(signature)))
    }
}

/// Revert payload understood without a user-supplied ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinError {
    pub selector: [u8; 4],
    pub signature: &'static str,
    pub name: &'static str,
    pub inputs: &'static [&'static str],
    /// The single input is a human-readable reason
    pub reason: bool,
}

/// `Error(string)`, emitted by `require` and `revert("...")`
pub const ERROR_STRING: BuiltinError = BuiltinError {
    selector: [0x08, 0xc3, 0x79, 0xa0],
    signature: "Error(string)",
    name: "Error",
    inputs: &["string"],
    reason: true,
};

/// `Panic(uint256)`, emitted on failed assertions and arithmetic faults
pub const PANIC_UINT256: BuiltinError = BuiltinError {
    selector: [0x4e, 0x48, 0x7b, 0x71],
    signature: "Panic(uint256)",
    name: "Panic",
    inputs: &["uint256"],
    reason: false,
};

pub static BUILTIN_ERRORS: [BuiltinError; 2] = [ERROR_STRING, PANIC_UINT256];

pub fn builtin_error(selector: &[u8]) -> Option<&'static BuiltinError> {
    BUILTIN_ERRORS.iter().find(|e| e.selector[..] == *selector)
}

/// Description of a Solidity panic code
pub fn panic_reason(code: &BigNumber) -> Option<&'static str> {
    let code = code.to_u64().ok()?;
    let reason = match code {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic underflow or overflow",
        0x12 => "division or modulo by zero",
        0x21 => "enum value out of bounds",
        0x22 => "invalid encoded storage byte array accessed",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory or array too large",
        0x51 => "called zero-initialized internal function",
        _ => return None,
    };
    Some(reason)
}
