//! Values passed to and returned from the coders
//!
//! Decoded tuples and arrays come back as [`Results`], which keeps a
//! per-field `Result` so that one undecodable field does not hide its
//! siblings. The captured error is raised only when that field is read.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value as JsonValue};

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};
use crate::utils::bytes::hexlify;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(BigNumber),
    Address(String),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    /// Named members, matched to tuple components by name
    Struct(Vec<(String, Value)>),
    Result(Results),
    Indexed(Indexed),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigNumber> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Text of a `String` or `Address` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Address(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_results(&self) -> Option<&Results> {
        match self {
            Value::Result(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_indexed(&self) -> Option<&Indexed> {
        match self {
            Value::Indexed(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert decoded values into plain ones, raising the first captured
    /// field error.
    pub fn into_plain(self) -> AbiResult<Value> {
        match self {
            Value::Result(results) => Ok(Value::Array(results.into_values()?)),
            Value::Array(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(Value::into_plain)
                    .collect::<AbiResult<Vec<_>>>()?,
            )),
            other => Ok(other),
        }
    }

    /// Build a value from JSON.
    ///
    /// Numbers and strings stay loosely typed; the coder a value is handed to
    /// decides how a string is read (decimal, hex, address, text).
    pub fn from_json(json: &JsonValue) -> AbiResult<Value> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Value::Number(BigNumber::from(v)))
                } else if let Some(v) = n.as_i64() {
                    Ok(Value::Number(BigNumber::from(v)))
                } else {
                    Err(AbiError::numeric_fault(
                        "underflow",
                        "underflow",
                        format!("non-integer number {}", n),
                    ))
                }
            }
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            JsonValue::Array(items) => Ok(Value::Array(
                items.iter().map(Value::from_json).collect::<AbiResult<Vec<_>>>()?,
            )),
            JsonValue::Object(map) => {
                if map.get("type").and_then(JsonValue::as_str) == Some("BigNumber") {
                    let number: BigNumber = serde_json::from_value(json.clone())?;
                    return Ok(Value::Number(number));
                }
                let fields = map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Value::from_json(v)?)))
                    .collect::<AbiResult<Vec<_>>>()?;
                Ok(Value::Struct(fields))
            }
        }
    }

    /// Integers are written as decimal strings and bytes as `0x` hex.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => json!(b),
            Value::Number(n) => json!(n.to_string()),
            Value::Address(a) => json!(a),
            Value::Bytes(b) => json!(hexlify(b)),
            Value::String(s) => json!(s),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Struct(fields) => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
            Value::Result(results) => results.to_json(),
            Value::Indexed(indexed) => json!({
                "_isIndexed": true,
                "hash": indexed.hash.map(|h| hexlify(&h)),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<BigNumber> for Value {
    fn from(value: BigNumber) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

macro_rules! impl_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(BigNumber::from(value))
                }
            }
        )*
    };
}

impl_value_from_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128);

/// Stand-in for an indexed event parameter of dynamic type. Only the hash
/// stored in the topic is known; the original value cannot be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    hash: Option<[u8; 32]>,
}

impl Indexed {
    pub(crate) fn new(hash: Option<[u8; 32]>) -> Self {
        Indexed { hash }
    }

    pub fn hash(&self) -> Option<&[u8; 32]> {
        self.hash.as_ref()
    }
}

/// Decoded tuple or array
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Results {
    fields: Vec<Result<Value, AbiError>>,
    names: BTreeMap<String, usize>,
}

impl Results {
    /// Positional fields plus, for every binding name that occurs exactly
    /// once, a by-name alias. `length` is exposed as `_length`.
    pub(crate) fn from_fields(
        fields: Vec<Result<Value, AbiError>>,
        local_names: &[Option<String>],
    ) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for name in local_names.iter().flatten() {
            if !name.is_empty() {
                *counts.entry(name.as_str()).or_insert(0) += 1;
            }
        }

        let mut names = BTreeMap::new();
        for (index, name) in local_names.iter().enumerate() {
            let name = match name {
                Some(name) if counts.get(name.as_str()) == Some(&1) => name,
                _ => continue,
            };
            let key = if name == "length" {
                "_length".to_string()
            } else {
                name.clone()
            };
            if names.contains_key(&key) {
                continue;
            }
            names.insert(key, index);
        }

        Results { fields, names }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The raw field, with any decode error still captured
    pub fn field(&self, index: usize) -> Option<&Result<Value, AbiError>> {
        self.fields.get(index)
    }

    pub fn get(&self, index: usize) -> AbiResult<&Value> {
        match self.fields.get(index) {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(AbiError::Deferred {
                accessor: format!("index {}", index),
                source: Box::new(e.clone()),
            }),
            None => Err(AbiError::invalid_argument(
                "index out of range",
                "index",
                index.to_string(),
            )),
        }
    }

    pub fn by_name(&self, name: &str) -> AbiResult<&Value> {
        let index = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| AbiError::invalid_argument("no such field", "name", name))?;
        match &self.fields[index] {
            Ok(value) => Ok(value),
            Err(e) => Err(AbiError::Deferred {
                accessor: format!("property {:?}", name),
                source: Box::new(e.clone()),
            }),
        }
    }

    pub fn name_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Result<Value, AbiError>> {
        self.fields.iter()
    }

    /// Captured errors with their positions
    pub fn errors(&self) -> Vec<(usize, &AbiError)> {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().err().map(|e| (i, e)))
            .collect()
    }

    /// Plain values, nested results flattened to arrays. Fails on the first
    /// captured error.
    pub fn into_values(self) -> AbiResult<Vec<Value>> {
        self.fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| match field {
                Ok(value) => value.into_plain(),
                Err(e) => Err(AbiError::Deferred {
                    accessor: format!("index {}", index),
                    source: Box::new(e),
                }),
            })
            .collect()
    }

    /// Failed fields are rendered as `{"error": message}`.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.fields
                .iter()
                .map(|field| match field {
                    Ok(value) => value.to_json(),
                    Err(e) => json!({ "error": e.to_string() }),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn sample() -> Results {
        Results::from_fields(
            vec![
                Ok(Value::from(1u8)),
                Err(AbiError::numeric_fault("overflow", "overflow", "toNumber")),
                Ok(Value::from("x")),
                Ok(Value::from(true)),
            ],
            &[
                Some("amount".to_string()),
                Some("broken".to_string()),
                Some("length".to_string()),
                None,
            ],
        )
    }

    #[test]
    fn test_positional_and_named_access() {
        let results = sample();
        assert_eq!(results.len(), 4);
        assert_eq!(results.get(0).unwrap(), &Value::from(1u8));
        assert_eq!(results.by_name("amount").unwrap(), &Value::from(1u8));
        assert_eq!(results.by_name("_length").unwrap(), &Value::from("x"));
        assert!(results.by_name("length").is_err());
    }

    #[test]
    fn test_deferred_error_only_on_access() {
        let results = sample();
        assert!(results.get(2).is_ok());
        let err = results.get(1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NumericFault);
        assert!(err.to_string().contains("index 1"));
        let err = results.by_name("broken").unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert_eq!(results.errors().len(), 1);
        assert!(results.field(1).unwrap().is_err());
    }

    #[test]
    fn test_duplicate_names_skipped() {
        let results = Results::from_fields(
            vec![Ok(Value::from(1u8)), Ok(Value::from(2u8))],
            &[Some("a".to_string()), Some("a".to_string())],
        );
        assert!(results.by_name("a").is_err());
        assert_eq!(results.names().count(), 0);
    }

    #[test]
    fn test_into_values_flattens() {
        let inner = Results::from_fields(vec![Ok(Value::from(7u8))], &[None]);
        let outer = Results::from_fields(vec![Ok(Value::Result(inner))], &[None]);
        assert_eq!(
            outer.into_values().unwrap(),
            vec![Value::Array(vec![Value::from(7u8)])]
        );
        assert!(sample().into_values().is_err());
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!([1, "0xab", true, null, {"to": "a"}]);
        let value = Value::from_json(&json).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::from(1u64),
                Value::from("0xab"),
                Value::Bool(true),
                Value::Null,
                Value::Struct(vec![("to".to_string(), Value::from("a"))]),
            ])
        );
        assert!(Value::from_json(&serde_json::json!(1.5)).is_err());
        assert_eq!(Value::Bytes(vec![0xab]).to_json(), serde_json::json!("0xab"));
        assert_eq!(Value::from(300u32).to_json(), serde_json::json!("300"));
    }
}
