use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};

use super::tuple::{pack_pairs, unpack_each};
use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::Value;
use crate::abi::writer::{Writer, WORD_SIZE};

impl Coder {
    /// `length` of `None` makes a dynamic array.
    pub fn array(coder: Coder, length: Option<usize>, local_name: Option<String>) -> Coder {
        let suffix = length.map(|l| l.to_string()).unwrap_or_default();
        let ty = format!("{}[{}]", coder.ty, suffix);
        let dynamic = length.is_none() || coder.dynamic;
        let element = Coder::anonymous(coder);
        Coder::new(
            "array",
            ty,
            local_name,
            dynamic,
            CoderKind::Array {
                coder: Box::new(element),
                length,
            },
        )
    }

    pub fn anonymous(coder: Coder) -> Coder {
        Coder::new(
            coder.name.clone(),
            coder.ty.clone(),
            None,
            coder.dynamic,
            CoderKind::Anonymous(Box::new(coder)),
        )
    }
}

pub(super) fn encode(
    coder: &Coder,
    element: &Coder,
    length: Option<usize>,
    writer: &mut Writer,
    value: &Value,
) -> AbiResult<usize> {
    let values: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Result(results) => (0..results.len())
            .map(|i| results.get(i))
            .collect::<AbiResult<_>>()?,
        _ => return Err(coder.error("expected array value", value)),
    };

    let mut written = 0;
    let count = match length {
        Some(count) => count,
        None => {
            written += writer.write_value(&BigNumber::from(values.len()))?;
            values.len()
        }
    };

    let label = match coder.local_name() {
        Some(name) => format!("coder array {}", name),
        None => "coder array".to_string(),
    };
    AbiError::check_argument_count(values.len(), count, &label)?;

    written += pack_pairs(writer, values.into_iter().map(|v| (element, v)))?;
    Ok(written)
}

pub(super) fn decode(element: &Coder, length: Option<usize>, reader: &mut Reader<'_>) -> AbiResult<Value> {
    let count = match length {
        Some(count) => count,
        None => {
            let count = reader.read_value()?.to_usize()?;
            // Every element needs at least one word, inline or as an offset
            let plausible = count
                .checked_mul(WORD_SIZE)
                .map_or(false, |needed| needed <= reader.data_len());
            if !plausible {
                return Err(AbiError::buffer_overrun(
                    "insufficient data length",
                    reader.data_len(),
                    count,
                ));
            }
            count
        }
    };

    let results = unpack_each(reader, std::iter::repeat(element).take(count))?;
    Ok(Value::Result(results))
}

pub(super) fn default_value(element: &Coder, length: Option<usize>, budget: &mut usize) -> AbiResult<Value> {
    let count = length.unwrap_or(0);
    if count > *budget {
        return Err(element.default_too_large());
    }
    let values = (0..count)
        .map(|_| element.default_value_within(budget))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(Value::Array(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::utils::strings::Utf8ErrorPolicy;

    fn uint_array(length: Option<usize>) -> Coder {
        Coder::array(Coder::number(32, false, None), length, Some("ids".to_string()))
    }

    fn encode_value(coder: &Coder, value: &Value) -> AbiResult<Vec<u8>> {
        let mut writer = Writer::new();
        coder.encode(&mut writer, value)?;
        Ok(writer.data())
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(uint_array(None).ty(), "uint256[]");
        assert_eq!(uint_array(Some(3)).ty(), "uint256[3]");
        assert!(uint_array(None).is_dynamic());
        assert!(!uint_array(Some(3)).is_dynamic());
        assert!(Coder::array(Coder::string(None), Some(2), None).is_dynamic());
    }

    #[test]
    fn test_dynamic_array_round_trip() {
        let coder = uint_array(None);
        let value = Value::Array(vec![Value::from(1u8), Value::from(2u8)]);
        let data = encode_value(&coder, &value).unwrap();
        assert_eq!(data.len(), 96);
        assert_eq!(data[31], 2);

        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        let decoded = coder.decode(&mut reader).unwrap();
        assert_eq!(decoded.into_plain().unwrap(), value);
    }

    #[test]
    fn test_fixed_array_count_checked() {
        let coder = uint_array(Some(2));
        let short = Value::Array(vec![Value::from(1u8)]);
        assert_eq!(
            encode_value(&coder, &short).unwrap_err().code(),
            ErrorCode::MissingArgument
        );
        let long = Value::Array(vec![Value::from(1u8); 3]);
        assert_eq!(
            encode_value(&coder, &long).unwrap_err().code(),
            ErrorCode::UnexpectedArgument
        );
        assert!(encode_value(&coder, &Value::from(1u8)).is_err());
    }

    #[test]
    fn test_implausible_count_rejected() {
        let mut data = vec![0u8; 32];
        data[31] = 200;
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        let err = uint_array(None).decode(&mut reader).unwrap_err();
        assert!(err.is_buffer_overrun());
        assert!(err.to_string().contains("insufficient data length"));
    }

    #[test]
    fn test_array_of_strings() {
        let coder = Coder::array(Coder::string(None), None, None);
        let value = Value::Array(vec![Value::from("a"), Value::from("bc")]);
        let data = encode_value(&coder, &value).unwrap();
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert_eq!(coder.decode(&mut reader).unwrap().into_plain().unwrap(), value);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(uint_array(None).default_value().unwrap(), Value::Array(vec![]));
        assert_eq!(
            Coder::array(Coder::boolean(None), Some(2), None).default_value().unwrap(),
            Value::Array(vec![Value::Bool(false); 2])
        );
    }

    #[test]
    fn test_huge_default_is_an_error() {
        let err = uint_array(Some(4_294_967_295)).default_value().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NumericFault);

        // Each level fits on its own, the product does not
        let nested = Coder::array(uint_array(Some(1 << 16)), Some(1 << 16), None);
        assert_eq!(nested.default_value().unwrap_err().code(), ErrorCode::NumericFault);
    }
}
