use crate::address::get_address;
use crate::bignumber::BigNumber;
use crate::error::AbiResult;
use crate::utils::bytes::{arrayify, strip_zeros, zero_pad};
use crate::utils::crypto::to_checksum_address;

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::Writer;

impl Coder {
    pub fn address(local_name: Option<String>) -> Coder {
        Coder::new("address", "address", local_name, false, CoderKind::Address)
    }
}

pub(super) fn encode(coder: &Coder, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    let text = match value {
        Value::Address(s) | Value::String(s) => s,
        _ => return Err(coder.error("invalid address", value)),
    };
    let address = get_address(text).map_err(|e| match e {
        crate::error::AbiError::InvalidArgument { message, .. } => coder.error(&message, value),
        other => other,
    })?;
    let bytes = arrayify(&address)?;
    writer.write_value(&BigNumber::from_be_bytes(&bytes))
}

/// Upper 12 bytes must be clear.
pub(super) fn decode(reader: &mut Reader<'_>) -> AbiResult<Value> {
    let word = reader.read_value()?;
    let magnitude = word.magnitude_bytes();
    let raw = zero_pad(strip_zeros(&magnitude), 20)?;
    Ok(Value::Address(to_checksum_address(&raw)))
}

pub(super) fn default_value() -> Value {
    Value::Address(format!("0x{}", "0".repeat(40)))
}
