use crate::bignumber::BigNumber;
use crate::error::AbiResult;

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::Writer;

impl Coder {
    pub fn boolean(local_name: Option<String>) -> Coder {
        Coder::new("bool", "bool", local_name, false, CoderKind::Boolean)
    }
}

pub(super) fn encode(coder: &Coder, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    let flag = match value {
        Value::Bool(b) => *b,
        _ => return Err(coder.error("invalid boolean value", value)),
    };
    writer.write_value(&BigNumber::from(flag as u8))
}

pub(super) fn decode(reader: &mut Reader<'_>) -> AbiResult<Value> {
    Ok(Value::Bool(!reader.read_value()?.is_zero()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strings::Utf8ErrorPolicy;

    #[test]
    fn test_bool_words() {
        let coder = Coder::boolean(None);
        let mut writer = Writer::new();
        coder.encode(&mut writer, &Value::Bool(true)).unwrap();
        coder.encode(&mut writer, &Value::Bool(false)).unwrap();
        let data = writer.data();
        assert_eq!(data[31], 1);
        assert_eq!(data[63], 0);

        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert_eq!(coder.decode(&mut reader).unwrap(), Value::Bool(true));
        assert_eq!(coder.decode(&mut reader).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_any_nonzero_word_is_true() {
        let mut data = [0u8; 32];
        data[5] = 9;
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert_eq!(Coder::boolean(None).decode(&mut reader).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_rejects_non_bool() {
        let mut writer = Writer::new();
        assert!(Coder::boolean(None).encode(&mut writer, &Value::from(1u8)).is_err());
    }
}
