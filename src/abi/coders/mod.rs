//! Coders for every canonical ABI type
//!
//! A [`Coder`] pairs the shared metadata (type string, binding name, whether
//! the encoding is dynamic) with a [`CoderKind`]. Encoding, decoding and
//! default values dispatch on the kind in one place each.

/// Most values a single `default_value` call will build.
pub const DEFAULT_VALUE_LIMIT: usize = 1 << 20;

mod address;
mod array;
mod boolean;
mod bytes;
mod fixed_bytes;
mod null;
mod number;
mod tuple;

pub use tuple::{pack, unpack};

use crate::error::{AbiError, AbiResult};

use super::reader::Reader;
use super::value::Value;
use super::writer::Writer;

#[derive(Debug, Clone, PartialEq)]
pub enum CoderKind {
    Address,
    Boolean,
    String,
    Bytes,
    /// `bytes1` ..= `bytes32`
    FixedBytes(usize),
    /// Width in bytes
    Number { size: usize, signed: bool },
    Null,
    /// `None` length for dynamic arrays
    Array { coder: Box<Coder>, length: Option<usize> },
    Tuple(Vec<Coder>),
    /// Array element: same encoding as the inner coder, no binding name
    Anonymous(Box<Coder>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coder {
    name: String,
    ty: String,
    local_name: Option<String>,
    dynamic: bool,
    kind: CoderKind,
}

impl Coder {
    fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        local_name: Option<String>,
        dynamic: bool,
        kind: CoderKind,
    ) -> Self {
        Coder {
            name: name.into(),
            ty: ty.into(),
            local_name: local_name.filter(|n| !n.is_empty()),
            dynamic,
            kind,
        }
    }

    /// Coder family name (`address`, `tuple`, `uint256`, ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical type string
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn kind(&self) -> &CoderKind {
        &self.kind
    }

    /// Encode `value`, returning the number of bytes written.
    pub fn encode(&self, writer: &mut Writer, value: &Value) -> AbiResult<usize> {
        match &self.kind {
            CoderKind::Address => address::encode(self, writer, value),
            CoderKind::Boolean => boolean::encode(self, writer, value),
            CoderKind::String => bytes::encode_string(self, writer, value),
            CoderKind::Bytes => bytes::encode_bytes(self, writer, value),
            CoderKind::FixedBytes(size) => fixed_bytes::encode(self, *size, writer, value),
            CoderKind::Number { size, signed } => number::encode(self, *size, *signed, writer, value),
            CoderKind::Null => null::encode(self, writer, value),
            CoderKind::Array { coder, length } => array::encode(self, coder, *length, writer, value),
            CoderKind::Tuple(coders) => tuple::encode(coders, writer, value),
            CoderKind::Anonymous(coder) => coder.encode(writer, value),
        }
    }

    pub fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<Value> {
        match &self.kind {
            CoderKind::Address => address::decode(reader),
            CoderKind::Boolean => boolean::decode(reader),
            CoderKind::String => bytes::decode_string(reader),
            CoderKind::Bytes => bytes::decode_bytes(reader),
            CoderKind::FixedBytes(size) => fixed_bytes::decode(*size, reader),
            CoderKind::Number { size, signed } => number::decode(*size, *signed, reader),
            CoderKind::Null => null::decode(reader),
            CoderKind::Array { coder, length } => array::decode(coder, *length, reader),
            CoderKind::Tuple(coders) => unpack(reader, coders).map(Value::Result),
            CoderKind::Anonymous(coder) => coder.decode(reader),
        }
    }

    /// Zero value for this type. Fails instead of building more than
    /// [`DEFAULT_VALUE_LIMIT`] values in total.
    pub fn default_value(&self) -> AbiResult<Value> {
        let mut budget = DEFAULT_VALUE_LIMIT;
        self.default_value_within(&mut budget)
    }

    pub(super) fn default_value_within(&self, budget: &mut usize) -> AbiResult<Value> {
        *budget = budget.checked_sub(1).ok_or_else(|| self.default_too_large())?;
        Ok(match &self.kind {
            CoderKind::Address => address::default_value(),
            CoderKind::Boolean => Value::Bool(false),
            CoderKind::String => Value::String(String::new()),
            CoderKind::Bytes => Value::Bytes(Vec::new()),
            CoderKind::FixedBytes(size) => Value::Bytes(vec![0u8; *size]),
            CoderKind::Number { .. } => Value::Number(crate::bignumber::BigNumber::zero()),
            CoderKind::Null => Value::Null,
            CoderKind::Array { coder, length } => array::default_value(coder, *length, budget)?,
            CoderKind::Tuple(coders) => tuple::default_value(coders, budget)?,
            CoderKind::Anonymous(coder) => coder.default_value_within(budget)?,
        })
    }

    pub(super) fn default_too_large(&self) -> AbiError {
        AbiError::numeric_fault("default value too large", "overflow", format!("defaultValue({})", self.ty))
    }

    /// Argument error naming this coder's binding.
    pub(crate) fn error(&self, message: &str, value: &Value) -> AbiError {
        let argument = self.local_name.as_deref().unwrap_or(&self.name);
        AbiError::invalid_argument(message, argument, value.to_json().to_string())
    }
}
