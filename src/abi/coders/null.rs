use crate::error::AbiResult;

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::Writer;

impl Coder {
    /// Zero-width slot for an empty type
    pub fn null(local_name: Option<String>) -> Coder {
        Coder::new("null", "", local_name, false, CoderKind::Null)
    }
}

pub(super) fn encode(coder: &Coder, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    if !value.is_null() {
        return Err(coder.error("not null", value));
    }
    Ok(writer.write_bytes(&[]))
}

pub(super) fn decode(reader: &mut Reader<'_>) -> AbiResult<Value> {
    reader.read_bytes(0, false)?;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strings::Utf8ErrorPolicy;

    #[test]
    fn test_null_is_zero_width() {
        let coder = Coder::null(None);
        let mut writer = Writer::new();
        assert_eq!(coder.encode(&mut writer, &Value::Null).unwrap(), 0);
        assert!(coder.encode(&mut writer, &Value::from(1u8)).is_err());

        let mut reader = Reader::new(&[], false, Utf8ErrorPolicy::Error);
        assert_eq!(coder.decode(&mut reader).unwrap(), Value::Null);
        assert_eq!(reader.consumed(), 0);
    }
}
