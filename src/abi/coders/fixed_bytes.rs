use crate::error::AbiResult;
use crate::utils::bytes::arrayify;

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::Writer;

impl Coder {
    /// `bytes<size>`, with `size` in `1..=32`
    pub fn fixed_bytes(size: usize, local_name: Option<String>) -> Coder {
        let ty = format!("bytes{}", size);
        Coder::new(ty.clone(), ty, local_name, false, CoderKind::FixedBytes(size))
    }
}

pub(super) fn encode(coder: &Coder, size: usize, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    let data = match value {
        Value::Bytes(b) => b.clone(),
        Value::String(s) => arrayify(s).map_err(|_| coder.error("invalid bytes value", value))?,
        _ => return Err(coder.error("invalid bytes value", value)),
    };
    if data.len() != size {
        return Err(coder.error("incorrect data length", value));
    }
    Ok(writer.write_bytes(&data))
}

pub(super) fn decode(size: usize, reader: &mut Reader<'_>) -> AbiResult<Value> {
    Ok(Value::Bytes(reader.read_bytes(size, false)?.to_vec()))
}
