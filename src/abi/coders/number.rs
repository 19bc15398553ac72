//! `uintN` / `intN`
//!
//! Signed values are bound-checked against the declared width, then written
//! as 256-bit two's complement. Decoding masks to the declared width and
//! sign-extends.

use crate::bignumber::BigNumber;
use crate::error::AbiResult;

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::{Writer, WORD_SIZE};

impl Coder {
    /// `size` is the width in bytes (1..=32)
    pub fn number(size: usize, signed: bool, local_name: Option<String>) -> Coder {
        let ty = format!("{}int{}", if signed { "" } else { "u" }, size * 8);
        Coder::new(ty.clone(), ty, local_name, false, CoderKind::Number { size, signed })
    }
}

fn max_for_bits(bits: usize) -> BigNumber {
    BigNumber::from_bigint(&((num_bigint::BigInt::from(1u8) << bits) - 1u8))
}

pub(super) fn encode(
    coder: &Coder,
    size: usize,
    signed: bool,
    writer: &mut Writer,
    value: &Value,
) -> AbiResult<usize> {
    let number = match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => {
            BigNumber::parse(s).map_err(|_| coder.error("invalid BigNumber value", value))?
        }
        _ => return Err(coder.error("invalid BigNumber value", value)),
    };

    let bits = size * 8;
    if signed {
        let upper = max_for_bits(bits - 1);
        let lower = upper.add(&BigNumber::one()).mul(&BigNumber::from(-1i8));
        if number > upper || number < lower {
            return Err(coder.error("value out-of-bounds", value));
        }
    } else if number.is_negative() || number > max_for_bits(bits) {
        return Err(coder.error("value out-of-bounds", value));
    }

    let mut word = number.to_twos(bits).mask(bits)?;
    if signed {
        word = word.from_twos(bits).to_twos(WORD_SIZE * 8);
    }
    writer.write_value(&word)
}

pub(super) fn decode(size: usize, signed: bool, reader: &mut Reader<'_>) -> AbiResult<Value> {
    let bits = size * 8;
    let mut value = reader.read_value()?.mask(bits)?;
    if signed {
        value = value.from_twos(bits);
    }
    Ok(Value::Number(value))
}
