//! Arbitrary-precision signed integers
//!
//! A [`BigNumber`] stores its value as a canonical hex string (`0x..` or
//! `-0x..`, an even number of digits, zero is `0x00`). Arithmetic converts to a
//! `num_bigint::BigInt`, computes, and canonicalizes the result again, so
//! values are never mutated in place.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{AbiError, AbiResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "BigNumberJson", try_from = "BigNumberJson")]
pub struct BigNumber {
    hex: String,
}

#[derive(Serialize, Deserialize)]
struct BigNumberJson {
    #[serde(rename = "type")]
    kind: String,
    hex: String,
}

impl From<BigNumber> for BigNumberJson {
    fn from(value: BigNumber) -> Self {
        BigNumberJson {
            kind: "BigNumber".to_string(),
            hex: value.hex,
        }
    }
}

impl TryFrom<BigNumberJson> for BigNumber {
    type Error = AbiError;

    fn try_from(value: BigNumberJson) -> AbiResult<Self> {
        if value.kind != "BigNumber" {
            return Err(AbiError::invalid_argument(
                "invalid BigNumber value",
                "type",
                value.kind,
            ));
        }
        BigNumber::parse(&value.hex)
    }
}

fn fault(fault: &str, operation: &str) -> AbiError {
    AbiError::numeric_fault(fault, fault, operation)
}

impl BigNumber {
    pub fn zero() -> Self {
        Self::from_bigint(&BigInt::zero())
    }

    pub fn one() -> Self {
        Self::from_bigint(&BigInt::one())
    }

    /// Parse a decimal or `0x` hex string, either optionally prefixed with `-`.
    pub fn parse(value: &str) -> AbiResult<Self> {
        let invalid = || AbiError::invalid_argument("invalid BigNumber string", "value", value);

        let (negative, body) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };

        let (digits, radix) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            Some(hex) => {
                if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                (hex, 16)
            }
            None => {
                if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                (body, 10)
            }
        };

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Self::from_bigint(&value))
    }

    pub fn from_bigint(value: &BigInt) -> Self {
        let mut digits = value.abs().to_str_radix(16);
        if digits.len() % 2 == 1 {
            digits.insert(0, '0');
        }
        let hex = if value.is_negative() {
            format!("-0x{}", digits)
        } else {
            format!("0x{}", digits)
        };
        BigNumber { hex }
    }

    /// Interpret big-endian bytes as an unsigned integer.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self::from_bigint(&BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    pub fn to_bigint(&self) -> BigInt {
        let (negative, body) = match self.hex.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, self.hex.as_str()),
        };
        let digits = body.trim_start_matches("0x");
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 16).unwrap_or_default();
        if negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Big-endian bytes of the absolute value, at least one byte long.
    pub fn magnitude_bytes(&self) -> Vec<u8> {
        self.to_bigint().abs().to_bytes_be().1
    }

    pub fn to_hex_string(&self) -> &str {
        &self.hex
    }

    pub fn is_zero(&self) -> bool {
        self.hex == "0x00"
    }

    pub fn is_negative(&self) -> bool {
        self.hex.starts_with('-')
    }

    pub fn abs(&self) -> Self {
        Self::from_bigint(&self.to_bigint().abs())
    }

    pub fn add(&self, other: &BigNumber) -> Self {
        Self::from_bigint(&(self.to_bigint() + other.to_bigint()))
    }

    pub fn sub(&self, other: &BigNumber) -> Self {
        Self::from_bigint(&(self.to_bigint() - other.to_bigint()))
    }

    pub fn mul(&self, other: &BigNumber) -> Self {
        Self::from_bigint(&(self.to_bigint() * other.to_bigint()))
    }

    /// Truncating division.
    pub fn div(&self, other: &BigNumber) -> AbiResult<Self> {
        if other.is_zero() {
            return Err(fault("division-by-zero", "div"));
        }
        Ok(Self::from_bigint(&(self.to_bigint() / other.to_bigint())))
    }

    /// Non-negative remainder; the divisor must be positive.
    pub fn modulo(&self, other: &BigNumber) -> AbiResult<Self> {
        if other.is_negative() || other.is_zero() {
            return Err(fault("division-by-zero", "mod"));
        }
        let divisor = other.to_bigint();
        let mut remainder = self.to_bigint() % &divisor;
        if remainder.is_negative() {
            remainder += &divisor;
        }
        Ok(Self::from_bigint(&remainder))
    }

    pub fn pow(&self, exponent: &BigNumber) -> AbiResult<Self> {
        if exponent.is_negative() {
            return Err(fault("negative-power", "pow"));
        }
        let exponent = exponent
            .to_bigint()
            .to_usize()
            .ok_or_else(|| fault("overflow", "pow"))?;
        Ok(Self::from_bigint(&num_traits::pow(self.to_bigint(), exponent)))
    }

    pub fn and(&self, other: &BigNumber) -> AbiResult<Self> {
        self.bitwise(other, "and", |a, b| a & b)
    }

    pub fn or(&self, other: &BigNumber) -> AbiResult<Self> {
        self.bitwise(other, "or", |a, b| a | b)
    }

    pub fn xor(&self, other: &BigNumber) -> AbiResult<Self> {
        self.bitwise(other, "xor", |a, b| a ^ b)
    }

    fn bitwise(
        &self,
        other: &BigNumber,
        operation: &str,
        op: impl Fn(BigInt, BigInt) -> BigInt,
    ) -> AbiResult<Self> {
        if self.is_negative() || other.is_negative() {
            return Err(fault("unbound-bitwise-result", operation));
        }
        Ok(Self::from_bigint(&op(self.to_bigint(), other.to_bigint())))
    }

    /// Keep only the low `bits` bits.
    pub fn mask(&self, bits: usize) -> AbiResult<Self> {
        if self.is_negative() {
            return Err(fault("negative-width", "mask"));
        }
        Ok(Self::from_bigint(&(self.to_bigint() & low_mask(bits))))
    }

    pub fn shl(&self, bits: usize) -> AbiResult<Self> {
        if self.is_negative() {
            return Err(fault("negative-width", "shl"));
        }
        Ok(Self::from_bigint(&(self.to_bigint() << bits)))
    }

    pub fn shr(&self, bits: usize) -> AbiResult<Self> {
        if self.is_negative() {
            return Err(fault("negative-width", "shr"));
        }
        Ok(Self::from_bigint(&(self.to_bigint() >> bits)))
    }

    /// Two's complement representation over `width` bits.
    /// Non-negative values are returned unchanged.
    pub fn to_twos(&self, width: usize) -> Self {
        if !self.is_negative() {
            return self.clone();
        }
        let flipped = self.to_bigint().abs() ^ low_mask(width);
        Self::from_bigint(&(flipped + BigInt::one()))
    }

    /// Inverse of [`to_twos`](Self::to_twos): a value whose bit `width - 1`
    /// is set is read as negative.
    pub fn from_twos(&self, width: usize) -> Self {
        if width == 0 {
            return self.clone();
        }
        let value = self.to_bigint();
        if !value.is_negative() && value.bit((width - 1) as u64) {
            let magnitude = ((value & low_mask(width)) ^ low_mask(width)) + BigInt::one();
            return Self::from_bigint(&-magnitude);
        }
        self.clone()
    }

    pub fn to_u64(&self) -> AbiResult<u64> {
        self.to_bigint()
            .to_u64()
            .ok_or_else(|| AbiError::numeric_fault("overflow", "overflow", "toNumber"))
    }

    pub fn to_usize(&self) -> AbiResult<usize> {
        self.to_bigint()
            .to_usize()
            .ok_or_else(|| AbiError::numeric_fault("overflow", "overflow", "toNumber"))
    }
}

fn low_mask(bits: usize) -> BigInt {
    (BigInt::one() << bits) - BigInt::one()
}

impl FromStr for BigNumber {
    type Err = AbiError;

    fn from_str(s: &str) -> AbiResult<Self> {
        BigNumber::parse(s)
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bigint())
    }
}

impl PartialOrd for BigNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bigint().cmp(&other.to_bigint())
    }
}

impl From<BigInt> for BigNumber {
    fn from(value: BigInt) -> Self {
        BigNumber::from_bigint(&value)
    }
}

macro_rules! impl_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigNumber {
                fn from(value: $t) -> Self {
                    BigNumber::from_bigint(&BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_canonical_hex() {
        assert_eq!(BigNumber::from(0u8).to_hex_string(), "0x00");
        assert_eq!(BigNumber::from(255u32).to_hex_string(), "0xff");
        assert_eq!(BigNumber::from(256u32).to_hex_string(), "0x0100");
        assert_eq!(BigNumber::from(-1i32).to_hex_string(), "-0x01");
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!(BigNumber::parse("1000").unwrap(), BigNumber::from(1000u32));
        assert_eq!(BigNumber::parse("0x3e8").unwrap(), BigNumber::from(1000u32));
        assert_eq!(BigNumber::parse("-0x10").unwrap(), BigNumber::from(-16i32));
        assert_eq!(BigNumber::parse("-42").unwrap().to_string(), "-42");
        assert!(BigNumber::parse("").is_err());
        assert!(BigNumber::parse("0x").is_err());
        assert!(BigNumber::parse("12a").is_err());
        assert!(BigNumber::parse("1.5").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = BigNumber::from(17u32);
        let b = BigNumber::from(5u32);
        assert_eq!(a.add(&b), BigNumber::from(22u32));
        assert_eq!(b.sub(&a), BigNumber::from(-12i32));
        assert_eq!(a.mul(&b), BigNumber::from(85u32));
        assert_eq!(a.div(&b).unwrap(), BigNumber::from(3u32));
        assert_eq!(BigNumber::from(-17i32).div(&b).unwrap(), BigNumber::from(-3i32));
        assert_eq!(BigNumber::from(-17i32).modulo(&b).unwrap(), BigNumber::from(3u32));
        assert_eq!(b.pow(&BigNumber::from(3u32)).unwrap(), BigNumber::from(125u32));
    }

    #[test]
    fn test_numeric_faults() {
        let a = BigNumber::from(1u8);
        let err = a.div(&BigNumber::zero()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NumericFault);
        assert!(a.modulo(&BigNumber::from(-3i32)).is_err());
        assert!(a.pow(&BigNumber::from(-1i32)).is_err());
        assert!(BigNumber::from(-1i32).and(&a).is_err());
        assert!(BigNumber::from(-1i32).mask(8).is_err());
        assert!(BigNumber::from(-1i32).shl(1).is_err());
        assert!(BigNumber::from(u128::MAX).to_u64().is_err());
    }

    #[test]
    fn test_bitwise_and_shifts() {
        let a = BigNumber::from(0b1100u8);
        let b = BigNumber::from(0b1010u8);
        assert_eq!(a.and(&b).unwrap(), BigNumber::from(0b1000u8));
        assert_eq!(a.or(&b).unwrap(), BigNumber::from(0b1110u8));
        assert_eq!(a.xor(&b).unwrap(), BigNumber::from(0b0110u8));
        assert_eq!(a.shl(4).unwrap(), BigNumber::from(0xc0u8));
        assert_eq!(a.shr(2).unwrap(), BigNumber::from(3u8));
        assert_eq!(BigNumber::from(0x1ffu32).mask(8).unwrap(), BigNumber::from(0xffu32));
    }

    #[test]
    fn test_twos_complement() {
        let minus_one = BigNumber::from(-1i32);
        let twos = minus_one.to_twos(256);
        assert_eq!(twos.to_hex_string(), format!("0x{}", "ff".repeat(32)));
        assert_eq!(twos.from_twos(256), minus_one);

        let min_i8 = BigNumber::from(-128i32);
        assert_eq!(min_i8.to_twos(8), BigNumber::from(0x80u32));
        assert_eq!(BigNumber::from(0x80u32).from_twos(8), min_i8);
        assert_eq!(BigNumber::from(0x7fu32).from_twos(8), BigNumber::from(127u32));
    }

    #[test]
    fn test_ordering() {
        assert!(BigNumber::from(-5i32) < BigNumber::from(3u8));
        assert!(BigNumber::from(300u32) > BigNumber::from(255u32));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(BigNumber::from(16u8)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "BigNumber", "hex": "0x10"}));
        let back: BigNumber = serde_json::from_value(json).unwrap();
        assert_eq!(back, BigNumber::from(16u8));
        assert!(serde_json::from_value::<BigNumber>(serde_json::json!({"type": "Other", "hex": "0x10"})).is_err());
    }
}
