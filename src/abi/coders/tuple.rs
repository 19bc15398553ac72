//! Tuples and the head/tail layout shared with arrays
//!
//! Static members are written in place. Each dynamic member is written to a
//! separate tail buffer and referenced from the head by an offset word that
//! is back-patched once the head length is known.

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};

use super::{Coder, CoderKind};
use crate::abi::reader::Reader;
use crate::abi::value::{Results, Value};
use crate::abi::writer::Writer;

impl Coder {
    pub fn tuple(coders: Vec<Coder>, local_name: Option<String>) -> Coder {
        let dynamic = coders.iter().any(Coder::is_dynamic);
        let types = coders.iter().map(Coder::ty).collect::<Vec<_>>().join(",");
        Coder::new(
            "tuple",
            format!("tuple({})", types),
            local_name,
            dynamic,
            CoderKind::Tuple(coders),
        )
    }
}

pub(super) fn encode(coders: &[Coder], writer: &mut Writer, value: &Value) -> AbiResult<usize> {
    pack(writer, coders, value)
}

pub(super) fn default_value(coders: &[Coder], budget: &mut usize) -> AbiResult<Value> {
    let values = coders
        .iter()
        .map(|c| c.default_value_within(budget).map(Ok))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(Value::Result(Results::from_fields(values, &local_names(coders.iter()))))
}

fn local_names<'c>(coders: impl Iterator<Item = &'c Coder>) -> Vec<Option<String>> {
    coders.map(|c| c.local_name().map(str::to_string)).collect()
}

/// Members of a tuple value in coder order.
///
/// Positional values come from an array or a decoded result; a struct is
/// matched by binding name, which must then be present and unique.
fn tuple_values<'v>(coders: &[Coder], value: &'v Value) -> AbiResult<Vec<&'v Value>> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Result(results) => (0..results.len()).map(|i| results.get(i)).collect(),
        Value::Struct(fields) => {
            let mut seen: Vec<&str> = Vec::with_capacity(coders.len());
            coders
                .iter()
                .map(|coder| {
                    let name = coder.local_name().ok_or_else(|| {
                        AbiError::invalid_argument(
                            "cannot encode object for signature with missing names",
                            "values",
                            value.to_json().to_string(),
                        )
                    })?;
                    if seen.contains(&name) {
                        return Err(AbiError::invalid_argument(
                            "cannot encode object for signature with duplicate names",
                            "values",
                            value.to_json().to_string(),
                        ));
                    }
                    seen.push(name);
                    fields
                        .iter()
                        .find(|(field, _)| field == name)
                        .map(|(_, v)| v)
                        .ok_or_else(|| coder.error("missing value for component", value))
                })
                .collect()
        }
        _ => Err(AbiError::invalid_argument(
            "invalid tuple value",
            "tuple",
            value.to_json().to_string(),
        )),
    }
}

/// Encode `value` against `coders` as one head/tail block.
pub fn pack(writer: &mut Writer, coders: &[Coder], value: &Value) -> AbiResult<usize> {
    let values = tuple_values(coders, value)?;
    if values.len() != coders.len() {
        return Err(AbiError::invalid_argument(
            "types/value length mismatch",
            "tuple",
            value.to_json().to_string(),
        ));
    }
    pack_pairs(writer, coders.iter().zip(values))
}

pub(super) fn pack_pairs<'c, 'v>(
    writer: &mut Writer,
    pairs: impl Iterator<Item = (&'c Coder, &'v Value)>,
) -> AbiResult<usize> {
    let mut static_writer = Writer::new();
    let mut dynamic_writer = Writer::new();
    let mut updates = Vec::new();

    for (coder, value) in pairs {
        if coder.is_dynamic() {
            let dynamic_offset = dynamic_writer.len();
            coder.encode(&mut dynamic_writer, value)?;
            let slot = static_writer.write_updatable_value();
            updates.push((slot, dynamic_offset));
        } else {
            coder.encode(&mut static_writer, value)?;
        }
    }

    let head_length = static_writer.len();
    for (slot, dynamic_offset) in updates {
        static_writer.update_value(slot, &BigNumber::from(head_length + dynamic_offset))?;
    }

    let mut length = writer.append_writer(static_writer);
    length += writer.append_writer(dynamic_writer);
    Ok(length)
}

/// Decode one head/tail block. Field errors other than buffer overruns are
/// kept in the returned [`Results`].
pub fn unpack(reader: &mut Reader<'_>, coders: &[Coder]) -> AbiResult<Results> {
    unpack_each(reader, coders.iter())
}

pub(super) fn unpack_each<'c>(
    reader: &mut Reader<'_>,
    coders: impl Iterator<Item = &'c Coder>,
) -> AbiResult<Results> {
    let base = reader.sub_reader(0);
    let mut fields = Vec::new();
    let mut names = Vec::new();

    for coder in coders {
        let decoded = if coder.is_dynamic() {
            let offset = reader.read_value()?;
            offset.to_usize().and_then(|offset| {
                let mut offset_reader = base.sub_reader(offset);
                coder.decode(&mut offset_reader)
            })
        } else {
            coder.decode(reader)
        };

        match decoded {
            Err(e) if e.is_buffer_overrun() => return Err(e),
            field => fields.push(field),
        }
        names.push(coder.local_name().map(str::to_string));
    }

    Ok(Results::from_fields(fields, &names))
}
