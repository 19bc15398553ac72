//! Type-directed encoding and decoding of value lists

use crate::config::CoderConfig;
use crate::error::{AbiError, AbiResult};
use crate::log_debug;
use crate::utils::logging::Logger;

use super::coders::Coder;
use super::param_type::ParamType;
use super::reader::Reader;
use super::value::{Results, Value};
use super::writer::Writer;

const MODULE: &str = "abi_coder";

#[derive(Debug, Clone, Default)]
pub struct AbiCoder {
    config: CoderConfig,
    logger: Logger,
}

impl AbiCoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoderConfig) -> AbiResult<Self> {
        let logger = config.logger()?;
        Ok(AbiCoder { config, logger })
    }

    /// Use an existing logger; other settings keep their defaults.
    pub fn with_logger(logger: Logger) -> Self {
        AbiCoder {
            config: CoderConfig {
                log_level: logger.level(),
                ..Default::default()
            },
            logger,
        }
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Build the coder for a parameter type.
    pub fn get_coder(&self, param: &ParamType) -> AbiResult<Coder> {
        let name = param.name().map(str::to_string);

        match param.base_type() {
            "address" => return Ok(Coder::address(name)),
            "bool" => return Ok(Coder::boolean(name)),
            "string" => return Ok(Coder::string(name)),
            "bytes" => return Ok(Coder::bytes(name)),
            "array" => {
                let child = param.array_children().ok_or_else(|| invalid_type(param))?;
                let length = match param.array_length() {
                    Some(length) if length >= 0 => Some(length as usize),
                    _ => None,
                };
                return Ok(Coder::array(self.get_coder(child)?, length, name));
            }
            "tuple" => {
                let coders = param
                    .components()
                    .ok_or_else(|| invalid_type(param))?
                    .iter()
                    .map(|c| self.get_coder(c))
                    .collect::<AbiResult<Vec<_>>>()?;
                return Ok(Coder::tuple(coders, name));
            }
            "" => return Ok(Coder::null(name)),
            _ => {}
        }

        let ty = param.ty();
        if let Some((signed, digits)) = split_number_type(ty) {
            let bits = if digits.is_empty() {
                256
            } else {
                digits.parse::<usize>().unwrap_or(0)
            };
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                let kind = if signed { "int" } else { "uint" };
                return Err(AbiError::invalid_argument(
                    format!("invalid {} bit length", kind),
                    "param",
                    ty,
                ));
            }
            return Ok(Coder::number(bits / 8, signed, name));
        }

        if let Some(digits) = ty.strip_prefix("bytes") {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                let size = digits.parse::<usize>().unwrap_or(0);
                if size == 0 || size > 32 {
                    return Err(AbiError::invalid_argument("invalid bytes length", "param", ty));
                }
                return Ok(Coder::fixed_bytes(size, name));
            }
        }

        Err(invalid_type(param))
    }

    fn tuple_coder(&self, types: &[ParamType]) -> AbiResult<Coder> {
        let coders = types
            .iter()
            .map(|t| self.get_coder(t))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(Coder::tuple(coders, Some("_".to_string())))
    }

    pub fn default_value(&self, types: &[ParamType]) -> AbiResult<Value> {
        self.logger
            .censor(self.tuple_coder(types).and_then(|coder| coder.default_value()))
    }

    pub fn encode(&self, types: &[ParamType], values: &[Value]) -> AbiResult<Vec<u8>> {
        self.logger.censor(self.encode_params(types, values))
    }

    pub fn decode(&self, types: &[ParamType], data: &[u8]) -> AbiResult<Results> {
        self.logger.censor(self.decode_params(types, data, false))
    }

    /// Like [`decode`](Self::decode), but a final dynamic `bytes`/`string`
    /// may be missing its word padding.
    pub fn decode_loose(&self, types: &[ParamType], data: &[u8]) -> AbiResult<Results> {
        self.logger.censor(self.decode_params(types, data, true))
    }

    pub(crate) fn encode_params(&self, types: &[ParamType], values: &[Value]) -> AbiResult<Vec<u8>> {
        if types.len() != values.len() {
            return Err(AbiError::invalid_argument(
                "types/values length mismatch",
                "values",
                format!("types={}, values={}", types.len(), values.len()),
            ));
        }

        let coder = self.tuple_coder(types)?;
        let mut writer = Writer::new();
        coder.encode(&mut writer, &Value::Array(values.to_vec()))?;
        log_debug!(self.logger, MODULE, "encoded", types = coder.ty(), length = writer.len());
        Ok(writer.data())
    }

    pub(crate) fn decode_params(&self, types: &[ParamType], data: &[u8], loose: bool) -> AbiResult<Results> {
        let coder = self.tuple_coder(types)?;
        let mut reader = Reader::new(data, loose, self.config.utf8_policy);
        log_debug!(self.logger, MODULE, "decoding", types = coder.ty(), length = data.len());
        match coder.decode(&mut reader)? {
            Value::Result(results) => Ok(results),
            other => Err(AbiError::invalid_argument(
                "unexpected tuple decoding",
                "data",
                other.to_json().to_string(),
            )),
        }
    }
}

/// Parse a list of type strings such as `["address", "uint256[]"]`.
pub fn parse_types(types: &[&str]) -> AbiResult<Vec<ParamType>> {
    types.iter().map(|t| ParamType::from_string(t, false)).collect()
}

fn invalid_type(param: &ParamType) -> AbiError {
    AbiError::invalid_argument("invalid type", "type", param.ty())
}

/// `uintN` / `intN` / bare `uint` / `int`: signedness and the width digits.
fn split_number_type(ty: &str) -> Option<(bool, &str)> {
    let (signed, digits) = match ty.strip_prefix("uint") {
        Some(digits) => (false, digits),
        None => (true, ty.strip_prefix("int")?),
    };
    if digits.chars().all(|c| c.is_ascii_digit()) {
        Some((signed, digits))
    } else {
        None
    }
}
