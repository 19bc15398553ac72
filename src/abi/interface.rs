//! Contract interface: fragment lookup plus call, result, error and event
//! log encoding
//!
//! An [`Interface`] is built once from a fragment list and is read-only
//! afterwards. Functions, events and errors are keyed by their `sighash`
//! signature. Errors leaving the public methods pass through the coder's
//! logger, so a censoring logger hides their details.

use std::collections::BTreeMap;

use serde_json::{json, Value as JsonValue};

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult, CallException};
use crate::utils::bytes::{arrayify, hexlify, is_hex_string};
use crate::utils::crypto::{id, keccak256};
use crate::utils::logging::Logger;
use crate::{log_debug, log_warn};

use super::coder::AbiCoder;
use super::fragments::{ConstructorFragment, ErrorFragment, EventFragment, Fragment, FunctionFragment};
use super::param_type::{FormatType, ParamType};
use super::selector::{builtin_error, panic_reason};
use super::value::{Indexed, Results, Value};
use super::writer::WORD_SIZE;

const MODULE: &str = "interface";

/// One entry of a log filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    Hash([u8; 32]),
    /// Matches any of the hashes
    AnyOf(Vec<[u8; 32]>),
}

impl Topic {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Topic::Hash(hash) => json!(hexlify(hash)),
            Topic::AnyOf(hashes) => JsonValue::Array(hashes.iter().map(|h| json!(hexlify(h))).collect()),
        }
    }
}

/// An emitted event: topic words plus the data blob
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Log {
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

impl Log {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "topics": self.topics.iter().map(|t| hexlify(t)).collect::<Vec<_>>(),
            "data": hexlify(&self.data),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDescription {
    pub function: FunctionFragment,
    pub name: String,
    pub args: Results,
    pub signature: String,
    pub sighash: [u8; 4],
    pub value: BigNumber,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogDescription {
    pub event: EventFragment,
    pub name: String,
    pub signature: String,
    pub topic: [u8; 32],
    pub args: Results,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDescription {
    pub error: ErrorFragment,
    pub name: String,
    pub args: Results,
    pub signature: String,
    pub sighash: [u8; 4],
}

#[derive(Debug, Clone)]
pub struct Interface {
    fragments: Vec<Fragment>,
    functions: BTreeMap<String, FunctionFragment>,
    events: BTreeMap<String, EventFragment>,
    errors: BTreeMap<String, ErrorFragment>,
    deploy: ConstructorFragment,
    coder: AbiCoder,
}

impl Interface {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self::with_coder(fragments, AbiCoder::default())
    }

    /// Later definitions of an already known signature are dropped with a
    /// warning.
    pub fn with_coder(fragments: Vec<Fragment>, coder: AbiCoder) -> Self {
        let mut interface = Interface {
            fragments: Vec::new(),
            functions: BTreeMap::new(),
            events: BTreeMap::new(),
            errors: BTreeMap::new(),
            deploy: ConstructorFragment::default(),
            coder,
        };

        let mut have_deploy = false;
        for fragment in fragments {
            let accepted = match fragment {
                Fragment::Constructor(ref ctor) => {
                    if have_deploy {
                        log_warn!(interface.logger(), MODULE, "duplicate definition - constructor");
                        false
                    } else {
                        have_deploy = true;
                        interface.deploy = ctor.clone();
                        true
                    }
                }
                Fragment::Function(ref f) => {
                    insert_unique(&mut interface.functions, f.format(FormatType::Sighash), f, &interface.coder)
                }
                Fragment::Event(ref e) => {
                    insert_unique(&mut interface.events, e.format(FormatType::Sighash), e, &interface.coder)
                }
                Fragment::Error(ref e) => {
                    insert_unique(&mut interface.errors, e.format(FormatType::Sighash), e, &interface.coder)
                }
            };
            if accepted {
                interface.fragments.push(fragment);
            }
        }

        log_debug!(
            interface.logger(),
            MODULE,
            "interface built",
            functions = interface.functions.len(),
            events = interface.events.len(),
            errors = interface.errors.len()
        );
        interface
    }

    /// Parse a JSON ABI. Entries may be objects or human-readable strings.
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Self::from_json_with_coder(json, AbiCoder::default())
    }

    pub fn from_json_with_coder(json: &str, coder: AbiCoder) -> AbiResult<Self> {
        let parsed: JsonValue = serde_json::from_str(json)?;
        let entries = parsed
            .as_array()
            .ok_or_else(|| AbiError::invalid_argument("invalid abi", "abi", json))?;
        let mut fragments = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(fragment) = Fragment::from_json_value(entry, coder.logger())? {
                fragments.push(fragment);
            }
        }
        Ok(Self::with_coder(fragments, coder))
    }

    pub fn from_human_readable(signatures: &[&str]) -> AbiResult<Self> {
        Self::from_human_readable_with_coder(signatures, AbiCoder::default())
    }

    pub fn from_human_readable_with_coder(signatures: &[&str], coder: AbiCoder) -> AbiResult<Self> {
        let fragments = signatures
            .iter()
            .map(|s| Fragment::from_string_with_logger(s, coder.logger()))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(Self::with_coder(fragments, coder))
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn functions(&self) -> &BTreeMap<String, FunctionFragment> {
        &self.functions
    }

    pub fn events(&self) -> &BTreeMap<String, EventFragment> {
        &self.events
    }

    pub fn errors(&self) -> &BTreeMap<String, ErrorFragment> {
        &self.errors
    }

    pub fn deploy(&self) -> &ConstructorFragment {
        &self.deploy
    }

    pub fn coder(&self) -> &AbiCoder {
        &self.coder
    }

    fn logger(&self) -> &Logger {
        self.coder.logger()
    }

    /// Every fragment in the given format. JSON entries are one object each.
    pub fn format(&self, format: FormatType) -> AbiResult<Vec<String>> {
        if format == FormatType::Sighash {
            return self.logger().censor(Err(AbiError::unsupported(
                "interface does not support formatting sighash",
                "format(sighash)",
            )));
        }
        self.logger()
            .censor(self.fragments.iter().map(|f| f.format(format)).collect())
    }

    /// Resolve by selector (`0x` + 4 bytes), bare name or full signature.
    pub fn get_function(&self, key: &str) -> AbiResult<&FunctionFragment> {
        self.logger().censor(self.find_function(key))
    }

    /// Resolve by topic (`0x` + 32 bytes), bare name or full signature.
    pub fn get_event(&self, key: &str) -> AbiResult<&EventFragment> {
        self.logger().censor(self.find_event(key))
    }

    /// Resolve by selector, bare name or full signature.
    pub fn get_error(&self, key: &str) -> AbiResult<&ErrorFragment> {
        self.logger().censor(self.find_error(key))
    }

    pub fn get_sighash(&self, function: &str) -> AbiResult<[u8; 4]> {
        self.get_function(function).map(FunctionFragment::selector)
    }

    pub fn get_event_topic(&self, event: &str) -> AbiResult<[u8; 32]> {
        self.get_event(event).map(EventFragment::topic)
    }

    fn find_function(&self, key: &str) -> AbiResult<&FunctionFragment> {
        if is_hex_string(key, None) {
            let selector = arrayify(key)?;
            return self
                .functions
                .values()
                .find(|f| f.selector()[..] == selector[..])
                .ok_or_else(|| AbiError::invalid_argument("no matching function", "sighash", key));
        }
        if !key.contains('(') {
            return find_by_name(&self.functions, key.trim(), "function");
        }
        let signature = FunctionFragment::from_string(key)?.format(FormatType::Sighash);
        self.functions
            .get(&signature)
            .ok_or_else(|| AbiError::invalid_argument("no matching function", "signature", key))
    }

    fn find_event(&self, key: &str) -> AbiResult<&EventFragment> {
        if is_hex_string(key, None) {
            let topic = arrayify(key)?;
            return self
                .events
                .values()
                .find(|e| e.topic()[..] == topic[..])
                .ok_or_else(|| AbiError::invalid_argument("no matching event", "topichash", key));
        }
        if !key.contains('(') {
            return find_by_name(&self.events, key.trim(), "event");
        }
        let signature = EventFragment::from_string(key)?.format(FormatType::Sighash);
        self.events
            .get(&signature)
            .ok_or_else(|| AbiError::invalid_argument("no matching event", "signature", key))
    }

    fn find_error(&self, key: &str) -> AbiResult<&ErrorFragment> {
        if is_hex_string(key, None) {
            let selector = arrayify(key)?;
            return self.find_error_by_selector(&selector);
        }
        if !key.contains('(') {
            return find_by_name(&self.errors, key.trim(), "error");
        }
        // Built-in names are rejected by the error parser, so read the key as a function
        let signature = FunctionFragment::from_string(key)?.format(FormatType::Sighash);
        self.errors
            .get(&signature)
            .ok_or_else(|| AbiError::invalid_argument("no matching error", "signature", key))
    }

    fn find_error_by_selector(&self, selector: &[u8]) -> AbiResult<&ErrorFragment> {
        self.errors
            .values()
            .find(|e| e.selector()[..] == *selector)
            .ok_or_else(|| AbiError::invalid_argument("no matching error", "sighash", hexlify(selector)))
    }

    /// Selector followed by the encoded inputs
    pub fn encode_function_data(&self, function: &FunctionFragment, values: &[Value]) -> AbiResult<Vec<u8>> {
        self.logger().censor(self.with_selector(
            function.selector(),
            function.inputs(),
            values,
        ))
    }

    pub fn decode_function_data(&self, function: &FunctionFragment, data: &[u8]) -> AbiResult<Results> {
        let result = self.strip_selector(&function.selector(), data, "function", function.name())
            .and_then(|payload| self.coder.decode_params(function.inputs(), payload, false));
        self.logger().censor(result)
    }

    pub fn encode_function_result(&self, function: &FunctionFragment, values: &[Value]) -> AbiResult<Vec<u8>> {
        self.logger()
            .censor(self.coder.encode_params(function.outputs(), values))
    }

    /// Decode return data, or classify it as a revert.
    ///
    /// Data that is a whole number of words is decoded against the outputs.
    /// Data of four bytes past a word boundary is read as a revert:
    /// `Error(string)` and `Panic(uint256)` are recognised without an ABI,
    /// other selectors are looked up among the interface's errors. Anything
    /// else becomes a [`CallException`] carrying what could be recovered.
    pub fn decode_function_result(&self, function: &FunctionFragment, data: &[u8]) -> AbiResult<Results> {
        self.logger().censor(self.function_result(function, data))
    }

    fn function_result(&self, function: &FunctionFragment, data: &[u8]) -> AbiResult<Results> {
        let mut exception = CallException {
            method: function.format(FormatType::Sighash),
            data: hexlify(data),
            ..Default::default()
        };
        let mut detail = String::new();

        match data.len() % WORD_SIZE {
            0 => match self.coder.decode_params(function.outputs(), data, false) {
                Ok(results) => return Ok(results),
                Err(e) => exception.cause = Some(Box::new(e)),
            },
            4 => {
                let (selector, payload) = data.split_at(4);
                if let Some(builtin) = builtin_error(selector) {
                    let types = builtin
                        .inputs
                        .iter()
                        .map(|t| ParamType::from_string(t, false))
                        .collect::<AbiResult<Vec<_>>>()?;
                    let args = self.coder.decode_params(&types, payload, false)?;

                    if builtin.reason {
                        let reason = args.get(0)?.as_str().map(str::to_string);
                        detail = format!(
                            "; VM Exception while processing transaction: reverted with reason string {}",
                            serde_json::to_string(&reason.clone().unwrap_or_default())?
                        );
                        exception.reason = reason;
                    } else {
                        let code = args.get(0)?.as_number().cloned();
                        if let Some(ref code) = code {
                            detail = format!(
                                "; VM Exception while processing transaction: reverted with panic code {}",
                                code
                            );
                            if let Some(description) = panic_reason(code) {
                                detail.push_str(&format!(" ({})", description));
                            }
                        }
                        exception.panic_code = code;
                    }
                    exception.error_name = Some(builtin.name.to_string());
                    exception.error_signature = Some(builtin.signature.to_string());
                    exception.error_args = Some(args);
                } else if let Ok(error) = self.find_error_by_selector(selector) {
                    match self.coder.decode_params(error.inputs(), payload, false) {
                        Ok(args) => {
                            exception.error_name = Some(error.name().to_string());
                            exception.error_signature = Some(error.format(FormatType::Sighash));
                            exception.error_args = Some(args);
                        }
                        Err(e) => exception.cause = Some(Box::new(e)),
                    }
                }
            }
            _ => {}
        }

        exception.message = format!("call revert exception{}", detail);
        log_debug!(self.logger(), MODULE, "call reverted", method = exception.method);
        Err(AbiError::CallException(Box::new(exception)))
    }

    pub fn encode_error_result(&self, error: &ErrorFragment, values: &[Value]) -> AbiResult<Vec<u8>> {
        self.logger()
            .censor(self.with_selector(error.selector(), error.inputs(), values))
    }

    pub fn decode_error_result(&self, error: &ErrorFragment, data: &[u8]) -> AbiResult<Results> {
        let result = self.strip_selector(&error.selector(), data, "error", error.name())
            .and_then(|payload| self.coder.decode_params(error.inputs(), payload, false));
        self.logger().censor(result)
    }

    /// Constructor arguments, appended to the init code on deployment
    pub fn encode_deploy(&self, values: &[Value]) -> AbiResult<Vec<u8>> {
        self.logger()
            .censor(self.coder.encode_params(self.deploy.inputs(), values))
    }

    fn with_selector(&self, selector: [u8; 4], types: &[ParamType], values: &[Value]) -> AbiResult<Vec<u8>> {
        let mut data = selector.to_vec();
        data.extend(self.coder.encode_params(types, values)?);
        Ok(data)
    }

    fn strip_selector<'a>(&self, selector: &[u8; 4], data: &'a [u8], kind: &str, name: &str) -> AbiResult<&'a [u8]> {
        if data.len() < 4 || data[..4] != selector[..] {
            return Err(AbiError::invalid_argument(
                format!("data signature does not match {} {}.", kind, name),
                "data",
                hexlify(data),
            ));
        }
        Ok(&data[4..])
    }

    /// Topics for a log filter. `Null` leaves a position open, an array
    /// matches any of its elements, and trailing open positions are dropped.
    pub fn encode_filter_topics(&self, event: &EventFragment, values: &[Value]) -> AbiResult<Vec<Option<Topic>>> {
        self.logger().censor(self.filter_topics(event, values))
    }

    fn filter_topics(&self, event: &EventFragment, values: &[Value]) -> AbiResult<Vec<Option<Topic>>> {
        if values.len() > event.inputs().len() {
            return Err(AbiError::UnexpectedArgument {
                message: format!("too many arguments for {}", event.format(FormatType::Sighash)),
                count: values.len(),
                expected: event.inputs().len(),
            });
        }

        let mut topics = Vec::new();
        if !event.anonymous() {
            topics.push(Some(Topic::Hash(event.topic())));
        }

        for (param, value) in event.inputs().iter().zip(values) {
            let argument = format!("contract.{}", param.name().unwrap_or_default());
            if param.indexed() != Some(true) {
                if !value.is_null() {
                    return Err(AbiError::invalid_argument(
                        "cannot filter non-indexed parameters; must be null",
                        argument,
                        value.to_json().to_string(),
                    ));
                }
                continue;
            }

            if value.is_null() {
                topics.push(None);
            } else if matches!(param.base_type(), "array" | "tuple") {
                return Err(AbiError::invalid_argument(
                    "filtering with tuples or arrays not supported",
                    argument,
                    value.to_json().to_string(),
                ));
            } else if let Value::Array(items) = value {
                let hashes = items
                    .iter()
                    .map(|item| self.encode_topic(param, item))
                    .collect::<AbiResult<Vec<_>>>()?;
                topics.push(Some(Topic::AnyOf(hashes)));
            } else {
                topics.push(Some(Topic::Hash(self.encode_topic(param, value)?)));
            }
        }

        while matches!(topics.last(), Some(None)) {
            topics.pop();
        }
        Ok(topics)
    }

    /// Topic word of one indexed value. Dynamic values are hashed; static
    /// ones take their single-word encoding.
    fn encode_topic(&self, param: &ParamType, value: &Value) -> AbiResult<[u8; 32]> {
        match param.ty() {
            "string" => match value {
                Value::String(s) => Ok(id(s)),
                _ => Err(AbiError::invalid_argument(
                    "invalid string value",
                    param.name().unwrap_or("string"),
                    value.to_json().to_string(),
                )),
            },
            "bytes" => match value {
                Value::Bytes(b) => Ok(keccak256(b)),
                Value::String(s) => Ok(keccak256(&arrayify(s)?)),
                _ => Err(AbiError::invalid_argument(
                    "invalid bytes value",
                    param.name().unwrap_or("bytes"),
                    value.to_json().to_string(),
                )),
            },
            ty => {
                let types = [ParamType::elementary(ty, None)];
                let data = self.coder.encode_params(&types, std::slice::from_ref(value))?;
                data.get(..WORD_SIZE)
                    .and_then(|word| <[u8; 32]>::try_from(word).ok())
                    .ok_or_else(|| AbiError::invalid_argument("invalid topic type", "type", ty))
            }
        }
    }

    /// Build the topics and data an emitting contract would produce.
    pub fn encode_event_log(&self, event: &EventFragment, values: &[Value]) -> AbiResult<Log> {
        self.logger().censor(self.event_log(event, values))
    }

    fn event_log(&self, event: &EventFragment, values: &[Value]) -> AbiResult<Log> {
        if values.len() != event.inputs().len() {
            return Err(AbiError::invalid_argument(
                "event arguments/values mismatch",
                "values",
                format!("inputs={}, values={}", event.inputs().len(), values.len()),
            ));
        }

        let mut topics = Vec::new();
        if !event.anonymous() {
            topics.push(event.topic());
        }

        let mut data_types = Vec::new();
        let mut data_values = Vec::new();
        for (param, value) in event.inputs().iter().zip(values) {
            if param.indexed() == Some(true) {
                if matches!(param.base_type(), "array" | "tuple") {
                    return Err(AbiError::unsupported(
                        "indexed tuple and array parameters are not supported",
                        "encodeEventLog",
                    ));
                }
                topics.push(self.encode_topic(param, value)?);
            } else {
                data_types.push(param.clone());
                data_values.push(value.clone());
            }
        }

        Ok(Log {
            topics,
            data: self.coder.encode_params(&data_types, &data_values)?,
        })
    }

    /// Decode a log. Without topics every indexed field is an empty
    /// [`Indexed`]; indexed dynamic fields only ever carry their hash.
    pub fn decode_event_log(
        &self,
        event: &EventFragment,
        data: &[u8],
        topics: Option<&[[u8; 32]]>,
    ) -> AbiResult<Results> {
        self.logger().censor(self.event_args(event, data, topics))
    }

    fn event_args(&self, event: &EventFragment, data: &[u8], topics: Option<&[[u8; 32]]>) -> AbiResult<Results> {
        let topics = match topics {
            Some(topics) if !event.anonymous() => {
                let expected = event.topic();
                match topics.split_first() {
                    Some((first, rest)) if *first == expected => Some(rest),
                    first => {
                        let value = first.map(|(t, _)| hexlify(t)).unwrap_or_default();
                        return Err(AbiError::invalid_argument("fragment/topic mismatch", "topics[0]", value));
                    }
                }
            }
            other => other,
        };

        let mut indexed = Vec::new();
        let mut non_indexed = Vec::new();
        let mut hashed = Vec::with_capacity(event.inputs().len());
        for param in event.inputs() {
            if param.indexed() == Some(true) {
                let dynamic = matches!(param.ty(), "string" | "bytes")
                    || matches!(param.base_type(), "array" | "tuple");
                if dynamic {
                    indexed.push(ParamType::elementary("bytes32", param.name().map(str::to_string)));
                } else {
                    indexed.push(param.clone());
                }
                hashed.push(dynamic);
            } else {
                non_indexed.push(param.clone());
                hashed.push(false);
            }
        }

        let indexed_results = match topics {
            Some(topics) => Some(self.coder.decode_params(&indexed, &topics.concat(), false)?),
            None => None,
        };
        let data_results = self.coder.decode_params(&non_indexed, data, true)?;

        let mut fields = Vec::with_capacity(event.inputs().len());
        let mut names = Vec::with_capacity(event.inputs().len());
        let (mut indexed_index, mut data_index) = (0, 0);

        for (param, is_hashed) in event.inputs().iter().zip(hashed) {
            let field = if param.indexed() == Some(true) {
                match indexed_results {
                    None => Some(Ok(Value::Indexed(Indexed::new(None)))),
                    Some(ref results) => {
                        let field = results.field(indexed_index).cloned();
                        indexed_index += 1;
                        if is_hashed {
                            field.map(|f| f.map(|v| Value::Indexed(Indexed::new(to_hash(&v)))))
                        } else {
                            field
                        }
                    }
                }
            } else {
                let field = data_results.field(data_index).cloned();
                data_index += 1;
                field
            };
            let position = fields.len();
            fields.push(field.unwrap_or_else(|| {
                Err(AbiError::invalid_argument("missing event field", "index", position.to_string()))
            }));
            names.push(param.name().map(str::to_string));
        }

        Ok(Results::from_fields(fields, &names))
    }

    /// Identify the function a call targets and decode its arguments.
    pub fn parse_transaction(&self, data: &[u8], value: Option<BigNumber>) -> AbiResult<TransactionDescription> {
        let result = (|| -> AbiResult<_> {
            let selector = data.get(..4).unwrap_or(data);
            let function = self.find_function(&hexlify(selector))?;
            let args = self.coder.decode_params(function.inputs(), &data[selector.len()..], false)?;
            Ok(TransactionDescription {
                function: function.clone(),
                name: function.name().to_string(),
                args,
                signature: function.format(FormatType::Sighash),
                sighash: function.selector(),
                value: value.unwrap_or_else(BigNumber::zero),
            })
        })();
        self.logger().censor(result)
    }

    /// Identify and decode a log. Logs without topics, and logs matching an
    /// anonymous event, give `None`.
    pub fn parse_log(&self, log: &Log) -> AbiResult<Option<LogDescription>> {
        let result = (|| -> AbiResult<_> {
            let Some(topic) = log.topics.first() else {
                return Ok(None);
            };
            let event = self.find_event(&hexlify(topic))?;
            if event.anonymous() {
                return Ok(None);
            }
            let args = self.event_args(event, &log.data, Some(log.topics.as_slice()))?;
            Ok(Some(LogDescription {
                event: event.clone(),
                name: event.name().to_string(),
                signature: event.format(FormatType::Sighash),
                topic: event.topic(),
                args,
            }))
        })();
        self.logger().censor(result)
    }

    /// Identify a user-defined error from revert data and decode its
    /// arguments.
    pub fn parse_error(&self, data: &[u8]) -> AbiResult<ErrorDescription> {
        let result = (|| -> AbiResult<_> {
            let selector = data.get(..4).unwrap_or(data);
            let error = self.find_error_by_selector(selector)?;
            let args = self.coder.decode_params(error.inputs(), &data[selector.len()..], false)?;
            Ok(ErrorDescription {
                error: error.clone(),
                name: error.name().to_string(),
                args,
                signature: error.format(FormatType::Sighash),
                sighash: error.selector(),
            })
        })();
        self.logger().censor(result)
    }
}

fn insert_unique<T: Clone>(
    bucket: &mut BTreeMap<String, T>,
    signature: String,
    fragment: &T,
    coder: &AbiCoder,
) -> bool {
    if bucket.contains_key(&signature) {
        log_warn!(coder.logger(), MODULE, "duplicate definition", signature = signature);
        return false;
    }
    bucket.insert(signature, fragment.clone());
    true
}

/// A bare name must match exactly one overload.
fn find_by_name<'a, T>(bucket: &'a BTreeMap<String, T>, name: &str, kind: &str) -> AbiResult<&'a T> {
    let mut matching = bucket
        .iter()
        .filter(|(signature, _)| signature.split('(').next() == Some(name))
        .map(|(_, fragment)| fragment);

    match (matching.next(), matching.next()) {
        (Some(fragment), None) => Ok(fragment),
        (None, _) => Err(AbiError::invalid_argument(format!("no matching {}", kind), "name", name)),
        (Some(_), Some(_)) => Err(AbiError::invalid_argument(
            format!("multiple matching {}s", kind),
            "name",
            name,
        )),
    }
}

fn to_hash(value: &Value) -> Option<[u8; 32]> {
    value.as_bytes().and_then(|b| <[u8; 32]>::try_from(b).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::utils::logging::LogLevel;

    const ERC20: &[&str] = &[
        "constructor(string name, string symbol)",
        "function name() view returns (string)",
        "function balanceOf(address owner) view returns (uint256)",
        "function transfer(address to, uint256 amount) returns (bool)",
        "event Transfer(address indexed from, address indexed to, uint256 value)",
        "event Note(string indexed text, bytes data)",
        "event Ping(uint256 value) anonymous",
        "error InsufficientBalance(uint256 available, uint256 required)",
    ];

    const ALICE: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

    fn erc20() -> Interface {
        Interface::from_human_readable(ERC20).unwrap()
    }

    fn word(n: u8) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[31] = n;
        w
    }

    #[test]
    fn test_get_function_three_ways() {
        let iface = erc20();
        let by_name = iface.get_function("transfer").unwrap();
        let by_signature = iface.get_function("transfer(address,uint256)").unwrap();
        let by_selector = iface.get_function("0xa9059cbb").unwrap();
        assert_eq!(by_name, by_signature);
        assert_eq!(by_name, by_selector);
        assert_eq!(iface.get_sighash("transfer").unwrap(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_lookup_failures() {
        let iface = Interface::from_human_readable(&[
            "function foo(uint256)",
            "function foo(address)",
        ])
        .unwrap();
        let err = iface.get_function("foo").unwrap_err();
        assert!(err.to_string().contains("multiple matching functions"));
        assert!(iface.get_function("foo(uint256)").is_ok());
        assert!(iface.get_function("bar").unwrap_err().to_string().contains("no matching function"));
        assert!(iface.get_function("0x12345678").is_err());
    }

    #[test]
    fn test_duplicates_dropped_with_warning() {
        let coder = AbiCoder::with_logger(Logger::capturing(LogLevel::Warning));
        let iface = Interface::from_human_readable_with_coder(
            &[
                "function foo(uint256 a)",
                "function foo(uint256 b) view",
                "constructor()",
                "constructor(uint256)",
            ],
            coder,
        )
        .unwrap();
        assert_eq!(iface.functions().len(), 1);
        assert_eq!(iface.fragments().len(), 2);
        assert!(iface.deploy().inputs().is_empty());

        let entries = iface.coder().logger().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].field_value("signature"), Some("foo(uint256)"));
    }

    #[test]
    fn test_default_deploy() {
        let iface = Interface::from_human_readable(&["function foo()"]).unwrap();
        assert!(!iface.deploy().payable());
        assert!(iface.encode_deploy(&[]).unwrap().is_empty());

        let token = erc20();
        let data = token
            .encode_deploy(&[Value::from("Token"), Value::from("TKN")])
            .unwrap();
        assert_eq!(data.len(), 32 * 6);
    }

    #[test]
    fn test_function_data_round_trip() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();
        let data = iface
            .encode_function_data(transfer, &[Value::from(ALICE), Value::from(1000u32)])
            .unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 68);

        let args = iface.decode_function_data(transfer, &data).unwrap();
        assert_eq!(args.by_name("to").unwrap(), &Value::Address(ALICE.to_string()));
        assert_eq!(args.by_name("amount").unwrap(), &Value::from(1000u32));

        let balance_of = iface.get_function("balanceOf").unwrap();
        let err = iface.decode_function_data(balance_of, &data).unwrap_err();
        assert!(err.to_string().contains("data signature does not match function balanceOf."));
    }

    #[test]
    fn test_decode_function_result_value() {
        let iface = erc20();
        let balance_of = iface.get_function("balanceOf").unwrap();
        let results = iface.decode_function_result(balance_of, &word(1)).unwrap();
        assert_eq!(results.get(0).unwrap(), &Value::Number(BigNumber::one()));

        let encoded = iface
            .encode_function_result(balance_of, &[Value::from(1u8)])
            .unwrap();
        assert_eq!(encoded, word(1));
    }

    #[test]
    fn test_revert_with_reason() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();
        let mut data = vec![0x08, 0xc3, 0x79, 0xa0];
        data.extend(
            iface
                .coder()
                .encode(&[ParamType::from_string("string", false).unwrap()], &[Value::from("Not enough")])
                .unwrap(),
        );

        let err = iface.decode_function_result(transfer, &data).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CallException);
        let exception = err.call_exception().unwrap();
        assert_eq!(exception.reason.as_deref(), Some("Not enough"));
        assert_eq!(exception.error_signature.as_deref(), Some("Error(string)"));
        assert_eq!(exception.method, "transfer(address,uint256)");
        assert!(exception.message.contains("reverted with reason string \"Not enough\""));
    }

    #[test]
    fn test_revert_with_panic() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();
        let mut data = vec![0x4e, 0x48, 0x7b, 0x71];
        data.extend(word(0x11));

        let err = iface.decode_function_result(transfer, &data).unwrap_err();
        let exception = err.call_exception().unwrap();
        assert_eq!(exception.panic_code, Some(BigNumber::from(0x11u8)));
        assert_eq!(exception.reason, None);
        assert!(exception.message.contains("panic code 17 (arithmetic underflow or overflow)"));
    }

    #[test]
    fn test_revert_with_custom_error() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();
        let error = iface.get_error("InsufficientBalance").unwrap();
        let data = iface
            .encode_error_result(error, &[Value::from(5u8), Value::from(10u8)])
            .unwrap();

        let err = iface.decode_function_result(transfer, &data).unwrap_err();
        let exception = err.call_exception().unwrap();
        assert_eq!(exception.error_name.as_deref(), Some("InsufficientBalance"));
        let args = exception.error_args.as_ref().unwrap();
        assert_eq!(args.by_name("required").unwrap(), &Value::from(10u8));

        let described = iface.parse_error(&data).unwrap();
        assert_eq!(described.signature, "InsufficientBalance(uint256,uint256)");
        let decoded = iface.decode_error_result(error, &data).unwrap();
        assert_eq!(decoded.get(0).unwrap(), &Value::from(5u8));
    }

    #[test]
    fn test_unclassified_results() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();

        let err = iface.decode_function_result(transfer, &[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        let exception = err.call_exception().unwrap();
        assert_eq!(exception.error_name, None);
        assert_eq!(exception.data, "0xdeadbeef");

        let err = iface.decode_function_result(transfer, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CallException);

        // Word-aligned data that cannot be decoded keeps the cause
        let name = iface.get_function("name").unwrap();
        let err = iface.decode_function_result(name, &word(0x20)).unwrap_err();
        let cause = err.call_exception().unwrap().cause.as_ref().unwrap();
        assert!(cause.is_buffer_overrun());
    }

    #[test]
    fn test_event_log_round_trip() {
        let iface = erc20();
        let transfer = iface.get_event("Transfer").unwrap();
        let log = iface
            .encode_event_log(
                transfer,
                &[Value::from(ALICE), Value::from(format!("0x{}", "0".repeat(40))), Value::from(7u8)],
            )
            .unwrap();
        assert_eq!(log.topics.len(), 3);
        assert_eq!(
            hexlify(&log.topics[0]),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(log.data, word(7));

        let description = iface.parse_log(&log).unwrap().unwrap();
        assert_eq!(description.name, "Transfer");
        assert_eq!(description.args.by_name("from").unwrap(), &Value::Address(ALICE.to_string()));
        assert_eq!(description.args.by_name("value").unwrap(), &Value::from(7u8));
    }

    #[test]
    fn test_indexed_string_is_hash_only() {
        let iface = erc20();
        let note = iface.get_event("Note").unwrap();
        let log = iface
            .encode_event_log(note, &[Value::from("hello"), Value::Bytes(vec![1, 2, 3])])
            .unwrap();

        let args = iface.decode_event_log(note, &log.data, Some(log.topics.as_slice())).unwrap();
        let indexed = args.by_name("text").unwrap().as_indexed().unwrap();
        assert_eq!(indexed.hash(), Some(&id("hello")));
        assert_eq!(args.by_name("data").unwrap(), &Value::Bytes(vec![1, 2, 3]));

        let args = iface.decode_event_log(note, &log.data, None).unwrap();
        assert_eq!(args.get(0).unwrap(), &Value::Indexed(Indexed::new(None)));
    }

    #[test]
    fn test_topic_mismatch() {
        let iface = erc20();
        let note = iface.get_event("Note").unwrap();
        let err = iface
            .decode_event_log(note, &[], Some(&[[0u8; 32]][..]))
            .unwrap_err();
        assert!(err.to_string().contains("fragment/topic mismatch"));
    }

    #[test]
    fn test_anonymous_log_not_parsed() {
        let iface = erc20();
        let ping = iface.get_event("Ping").unwrap();
        let log = iface.encode_event_log(ping, &[Value::from(1u8)]).unwrap();
        assert!(log.topics.is_empty());
        assert_eq!(iface.parse_log(&log).unwrap(), None);

        let args = iface.decode_event_log(ping, &log.data, Some(log.topics.as_slice())).unwrap();
        assert_eq!(args.get(0).unwrap(), &Value::from(1u8));
    }

    #[test]
    fn test_filter_topics() {
        let iface = erc20();
        let transfer = iface.get_event("Transfer").unwrap();

        let topics = iface
            .encode_filter_topics(transfer, &[Value::Null, Value::from(ALICE)])
            .unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], Some(Topic::Hash(transfer.topic())));
        assert_eq!(topics[1], None);
        let Some(Topic::Hash(to)) = topics[2] else {
            panic!("expected a hash topic");
        };
        assert_eq!(hexlify(&to[12..]), ALICE.to_lowercase());

        let trimmed = iface
            .encode_filter_topics(transfer, &[Value::Null, Value::Null])
            .unwrap();
        assert_eq!(trimmed.len(), 1);

        let any = iface
            .encode_filter_topics(transfer, &[Value::Array(vec![Value::from(ALICE), Value::from(ALICE)])])
            .unwrap();
        assert!(matches!(any[1], Some(Topic::AnyOf(ref hashes)) if hashes.len() == 2));

        let err = iface
            .encode_filter_topics(transfer, &[Value::Null, Value::Null, Value::from(1u8)])
            .unwrap_err();
        assert!(err.to_string().contains("cannot filter non-indexed parameters"));

        let err = iface
            .encode_filter_topics(transfer, &[Value::Null, Value::Null, Value::Null, Value::Null])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnexpectedArgument);
    }

    #[test]
    fn test_indexed_array_rejected() {
        let iface = Interface::from_human_readable(&["event Batch(uint256[] indexed ids)"]).unwrap();
        let batch = iface.get_event("Batch").unwrap();
        let err = iface
            .encode_event_log(batch, &[Value::Array(vec![Value::from(1u8)])])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedOperation);
        assert!(iface.encode_filter_topics(batch, &[Value::Array(vec![])]).is_err());
    }

    #[test]
    fn test_parse_transaction() {
        let iface = erc20();
        let transfer = iface.get_function("transfer").unwrap();
        let data = iface
            .encode_function_data(transfer, &[Value::from(ALICE), Value::from(1u8)])
            .unwrap();
        let tx = iface.parse_transaction(&data, None).unwrap();
        assert_eq!(tx.name, "transfer");
        assert_eq!(tx.signature, "transfer(address,uint256)");
        assert!(tx.value.is_zero());
        assert!(iface.parse_transaction(&[0, 0, 0, 0], None).is_err());
    }

    #[test]
    fn test_from_json_abi() {
        let json = r#"[
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "fallback", "stateMutability": "payable"},
            "event Approval(address indexed owner, address indexed spender, uint256 value)"
        ]"#;
        let iface = Interface::from_json(json).unwrap();
        assert_eq!(iface.fragments().len(), 2);
        assert!(iface.get_event("Approval").is_ok());
        assert_eq!(
            iface.format(FormatType::Minimal).unwrap(),
            vec![
                "function balanceOf(address) view returns (uint256)".to_string(),
                "event Approval(address indexed,address indexed,uint256)".to_string(),
            ]
        );
        assert_eq!(iface.format(FormatType::Sighash).unwrap_err().code(), ErrorCode::UnsupportedOperation);
        assert!(Interface::from_json("{}").is_err());
    }

    #[test]
    fn test_censored_interface() {
        let mut logger = Logger::new(LogLevel::Off);
        logger.set_censorship(true, false).unwrap();
        let iface = Interface::from_human_readable_with_coder(ERC20, AbiCoder::with_logger(logger)).unwrap();
        let err = iface.get_function("missing").unwrap_err();
        assert_eq!(err, AbiError::Censored(ErrorCode::InvalidArgument));
    }
}
