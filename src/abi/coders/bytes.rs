//! Dynamic `bytes` and `string`: a length word followed by the padded data

use crate::bignumber::BigNumber;
use crate::error::AbiResult;
use crate::utils::bytes::arrayify;
use crate::utils::strings::{to_utf8_bytes, to_utf8_string, UnicodeNormalization};

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::Writer;

impl Coder {
    pub fn bytes(local_name: Option<String>) -> Coder {
        Coder::new("bytes", "bytes", local_name, true, CoderKind::Bytes)
    }

    pub fn string(local_name: Option<String>) -> Coder {
        Coder::new("string", "string", local_name, true, CoderKind::String)
    }
}

fn write_dynamic(writer: &mut Writer, data: &[u8]) -> AbiResult<usize> {
    let mut length = writer.write_value(&BigNumber::from(data.len()))?;
    length += writer.write_bytes(data);
    Ok(length)
}

fn read_dynamic<'a>(reader: &mut Reader<'a>) -> AbiResult<&'a [u8]> {
    let length = reader.read_value()?.to_usize()?;
    reader.read_bytes(length, true)
}

/// Accepts raw bytes or a `0x` hex string.
pub(super) fn encode_bytes(coder: &Coder, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    let data = match value {
        Value::Bytes(b) => b.clone(),
        Value::String(s) => arrayify(s).map_err(|_| coder.error("invalid bytes value", value))?,
        _ => return Err(coder.error("invalid bytes value", value)),
    };
    write_dynamic(writer, &data)
}

pub(super) fn decode_bytes(reader: &mut Reader<'_>) -> AbiResult<Value> {
    Ok(Value::Bytes(read_dynamic(reader)?.to_vec()))
}

pub(super) fn encode_string(coder: &Coder, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    let text = match value {
        Value::String(s) => s,
        _ => return Err(coder.error("invalid string value", value)),
    };
    write_dynamic(writer, &to_utf8_bytes(text, UnicodeNormalization::Current))
}

pub(super) fn decode_string(reader: &mut Reader<'_>) -> AbiResult<Value> {
    let policy = reader.utf8_policy();
    let data = read_dynamic(reader)?;
    Ok(Value::String(to_utf8_string(data, policy)?))
}
