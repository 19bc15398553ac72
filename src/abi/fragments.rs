//! Function, event, error and constructor descriptions
//!
//! Fragments are built only through the `from_string` / `from_object`
//! factories, which validate names, parameter types and the
//! constant/payable/stateMutability combination. The fields are private and
//! never change after construction.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};
use crate::log_warn;
use crate::utils::logging::Logger;

use super::param_type::{FormatType, JsonParamType, ParamType};
use super::selector::AbiSelector;

const MODULE: &str = "fragments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::Nonpayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }
}

/// Entry of a JSON ABI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFragment {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<JsonParamType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<JsonParamType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<JsonValue>,
}

impl JsonFragment {
    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Function(FunctionFragment),
    Event(EventFragment),
    Error(ErrorFragment),
    Constructor(ConstructorFragment),
}

impl Fragment {
    /// Parse a human-readable fragment such as
    /// `function transfer(address to, uint256 amount) returns (bool)`.
    ///
    /// A signature without a leading keyword is read as a function.
    pub fn from_string(value: &str) -> AbiResult<Self> {
        Self::from_string_with_logger(value, &Logger::default())
    }

    pub fn from_string_with_logger(value: &str, logger: &Logger) -> AbiResult<Self> {
        let value = normalize_signature(value);
        let keyword = value.split(' ').next().unwrap_or("");

        match keyword {
            "event" => EventFragment::parse(value[5..].trim(), logger).map(Fragment::Event),
            "function" => FunctionFragment::parse(value[8..].trim(), logger).map(Fragment::Function),
            "error" => ErrorFragment::parse(value[5..].trim()).map(Fragment::Error),
            _ if value.split('(').next().unwrap_or("").trim() == "constructor" => {
                ConstructorFragment::parse(&value, logger).map(Fragment::Constructor)
            }
            _ if value.contains('(') => FunctionFragment::parse(&value, logger).map(Fragment::Function),
            _ => Err(AbiError::invalid_argument("unsupported fragment", "value", value)),
        }
    }

    /// Build from a JSON ABI entry. `fallback` and `receive` entries have no
    /// fragment and give `None`.
    pub fn from_object(value: &JsonFragment) -> AbiResult<Option<Self>> {
        let fragment = match value.ty.as_deref() {
            Some("function") => Fragment::Function(FunctionFragment::from_object(value)?),
            Some("event") => Fragment::Event(EventFragment::from_object(value)?),
            Some("constructor") => Fragment::Constructor(ConstructorFragment::from_object(value)?),
            Some("error") => Fragment::Error(ErrorFragment::from_object(value)?),
            Some("fallback") | Some("receive") => return Ok(None),
            _ => {
                return Err(AbiError::invalid_argument(
                    "invalid fragment object",
                    "value",
                    value.describe(),
                ))
            }
        };
        Ok(Some(fragment))
    }

    /// A JSON ABI entry may itself be a human-readable string.
    pub fn from_json_value(value: &JsonValue, logger: &Logger) -> AbiResult<Option<Self>> {
        match value {
            JsonValue::String(s) => Self::from_string_with_logger(s, logger).map(Some),
            JsonValue::Object(_) => {
                let object: JsonFragment = serde_json::from_value(value.clone())?;
                Self::from_object(&object)
            }
            other => Err(AbiError::invalid_argument(
                "invalid fragment object",
                "value",
                other.to_string(),
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Fragment::Function(f) => &f.name,
            Fragment::Event(f) => &f.name,
            Fragment::Error(f) => &f.name,
            Fragment::Constructor(_) => "",
        }
    }

    pub fn inputs(&self) -> &[ParamType] {
        match self {
            Fragment::Function(f) => &f.inputs,
            Fragment::Event(f) => &f.inputs,
            Fragment::Error(f) => &f.inputs,
            Fragment::Constructor(f) => &f.inputs,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Fragment::Function(_) => "function",
            Fragment::Event(_) => "event",
            Fragment::Error(_) => "error",
            Fragment::Constructor(_) => "constructor",
        }
    }

    pub fn format(&self, format: FormatType) -> AbiResult<String> {
        match self {
            Fragment::Function(f) => Ok(f.format(format)),
            Fragment::Event(f) => Ok(f.format(format)),
            Fragment::Error(f) => Ok(f.format(format)),
            Fragment::Constructor(f) => f.format(format),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionFragment {
    name: String,
    inputs: Vec<ParamType>,
    outputs: Vec<ParamType>,
    state_mutability: StateMutability,
    constant: bool,
    payable: bool,
    gas: Option<BigNumber>,
}

impl FunctionFragment {
    pub fn from_string(value: &str) -> AbiResult<Self> {
        let value = normalize_signature(value);
        let value = value.strip_prefix("function ").unwrap_or(&value);
        Self::parse(value, &Logger::default())
    }

    fn parse(value: &str, logger: &Logger) -> AbiResult<Self> {
        let (value, gas) = parse_gas(value)?;

        let comps: Vec<&str> = value.split(" returns ").collect();
        if comps.len() > 2 {
            return Err(AbiError::invalid_argument("invalid function string", "value", value));
        }

        let (name, params, modifiers) = match_paren(comps[0])
            .ok_or_else(|| AbiError::invalid_argument("invalid function signature", "value", value))?;
        let name = verify_identifier(name.trim())?;
        let inputs = parse_params(params, false)?;
        let state = parse_modifiers(modifiers.trim(), logger);

        let outputs = match comps.get(1) {
            Some(returns) => {
                let (prefix, params, suffix) = match_paren(returns).ok_or_else(|| {
                    AbiError::invalid_argument("invalid function string", "value", value)
                })?;
                if !prefix.trim().is_empty() || !suffix.trim().is_empty() {
                    return Err(AbiError::invalid_argument("unexpected tokens", "value", value));
                }
                parse_params(params, false)?
            }
            None => Vec::new(),
        };

        let state = verify_state(&state, false, value)?;
        Ok(FunctionFragment {
            name: name.to_string(),
            inputs,
            outputs,
            state_mutability: state.state_mutability,
            constant: state.constant,
            payable: state.payable,
            gas,
        })
    }

    pub fn from_object(value: &JsonFragment) -> AbiResult<Self> {
        if value.ty.as_deref() != Some("function") {
            return Err(AbiError::invalid_argument("invalid function object", "value", value.describe()));
        }
        let state = verify_state(&StateInput::from_json(value), false, &value.describe())?;
        Ok(FunctionFragment {
            name: verify_identifier(value.name.as_deref().unwrap_or(""))?.to_string(),
            inputs: params_from_object(value.inputs.as_deref())?,
            outputs: params_from_object(value.outputs.as_deref())?,
            state_mutability: state.state_mutability,
            constant: state.constant,
            payable: state.payable,
            gas: gas_from_json(value)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ParamType] {
        &self.outputs
    }

    pub fn state_mutability(&self) -> StateMutability {
        self.state_mutability
    }

    pub fn constant(&self) -> bool {
        self.constant
    }

    pub fn payable(&self) -> bool {
        self.payable
    }

    pub fn gas(&self) -> Option<&BigNumber> {
        self.gas.as_ref()
    }

    pub fn selector(&self) -> [u8; 4] {
        AbiSelector::selector_from_signature(&self.format(FormatType::Sighash))
    }

    pub fn format(&self, format: FormatType) -> String {
        if format == FormatType::Json {
            let mut result = json!({
                "type": "function",
                "name": self.name,
                "constant": self.constant,
                "payable": self.payable,
                "inputs": params_json(&self.inputs),
                "outputs": params_json(&self.outputs),
            });
            if self.state_mutability != StateMutability::Nonpayable {
                result["stateMutability"] = json!(self.state_mutability.as_str());
            }
            if let Some(ref gas) = self.gas {
                result["gas"] = gas_json(gas);
            }
            return result.to_string();
        }

        let mut result = String::new();
        if format != FormatType::Sighash {
            result.push_str("function ");
        }
        result.push_str(&self.name);
        result.push_str(&format_params(&self.inputs, format));
        result.push(' ');

        if format != FormatType::Sighash {
            if self.state_mutability != StateMutability::Nonpayable {
                result.push_str(self.state_mutability.as_str());
                result.push(' ');
            }
            if !self.outputs.is_empty() {
                let outputs = self
                    .outputs
                    .iter()
                    .map(|o| o.format(format))
                    .collect::<Vec<_>>()
                    .join(", ");
                result.push_str(&format!("returns ({}) ", outputs));
            }
            if let Some(ref gas) = self.gas {
                result.push_str(&format!("@{} ", gas));
            }
        }

        result.trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventFragment {
    name: String,
    inputs: Vec<ParamType>,
    anonymous: bool,
}

impl EventFragment {
    pub fn from_string(value: &str) -> AbiResult<Self> {
        let value = normalize_signature(value);
        let value = value.strip_prefix("event ").unwrap_or(&value);
        Self::parse(value, &Logger::default())
    }

    fn parse(value: &str, logger: &Logger) -> AbiResult<Self> {
        let (name, params, modifiers) = match_paren(value)
            .ok_or_else(|| AbiError::invalid_argument("invalid event string", "value", value))?;

        let mut anonymous = false;
        for modifier in modifiers.split(' ') {
            match modifier.trim() {
                "anonymous" => anonymous = true,
                "" => {}
                other => log_warn!(logger, MODULE, "unknown modifier", modifier = other),
            }
        }

        Ok(EventFragment {
            name: verify_identifier(name.trim())?.to_string(),
            inputs: parse_params(params, true)?,
            anonymous,
        })
    }

    pub fn from_object(value: &JsonFragment) -> AbiResult<Self> {
        if value.ty.as_deref() != Some("event") {
            return Err(AbiError::invalid_argument("invalid event object", "value", value.describe()));
        }
        Ok(EventFragment {
            name: verify_identifier(value.name.as_deref().unwrap_or(""))?.to_string(),
            inputs: params_from_object(value.inputs.as_deref())?,
            anonymous: value.anonymous.unwrap_or(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn topic(&self) -> [u8; 32] {
        AbiSelector::topic_from_signature(&self.format(FormatType::Sighash))
    }

    pub fn format(&self, format: FormatType) -> String {
        if format == FormatType::Json {
            return json!({
                "type": "event",
                "anonymous": self.anonymous,
                "name": self.name,
                "inputs": params_json(&self.inputs),
            })
            .to_string();
        }

        let mut result = String::new();
        if format != FormatType::Sighash {
            result.push_str("event ");
        }
        result.push_str(&self.name);
        result.push_str(&format_params(&self.inputs, format));
        if format != FormatType::Sighash && self.anonymous {
            result.push_str(" anonymous");
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorFragment {
    name: String,
    inputs: Vec<ParamType>,
}

impl ErrorFragment {
    pub fn from_string(value: &str) -> AbiResult<Self> {
        let value = normalize_signature(value);
        let value = value.strip_prefix("error ").unwrap_or(&value);
        Self::parse(value)
    }

    fn parse(value: &str) -> AbiResult<Self> {
        let (name, params, _) = match_paren(value)
            .ok_or_else(|| AbiError::invalid_argument("invalid error signature", "value", value))?;
        let fragment = ErrorFragment {
            name: verify_identifier(name.trim())?.to_string(),
            inputs: parse_params(params, false)?,
        };
        fragment.check_forbidden()
    }

    pub fn from_object(value: &JsonFragment) -> AbiResult<Self> {
        if value.ty.as_deref() != Some("error") {
            return Err(AbiError::invalid_argument("invalid error object", "value", value.describe()));
        }
        let fragment = ErrorFragment {
            name: verify_identifier(value.name.as_deref().unwrap_or(""))?.to_string(),
            inputs: params_from_object(value.inputs.as_deref())?,
        };
        fragment.check_forbidden()
    }

    /// `Error(string)` and `Panic(uint256)` are reserved for built-in reverts.
    fn check_forbidden(self) -> AbiResult<Self> {
        let signature = self.format(FormatType::Sighash);
        if signature == "Error(string)" || signature == "Panic(uint256)" {
            return Err(AbiError::invalid_argument(
                format!("cannot specify user defined {} error", signature),
                "fragment",
                signature,
            ));
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn selector(&self) -> [u8; 4] {
        AbiSelector::selector_from_signature(&self.format(FormatType::Sighash))
    }

    pub fn format(&self, format: FormatType) -> String {
        if format == FormatType::Json {
            return json!({
                "type": "error",
                "name": self.name,
                "inputs": params_json(&self.inputs),
            })
            .to_string();
        }

        let mut result = String::new();
        if format != FormatType::Sighash {
            result.push_str("error ");
        }
        result.push_str(&self.name);
        result.push_str(&format_params(&self.inputs, format));
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorFragment {
    inputs: Vec<ParamType>,
    state_mutability: StateMutability,
    payable: bool,
    gas: Option<BigNumber>,
}

impl Default for ConstructorFragment {
    /// No arguments, not payable
    fn default() -> Self {
        ConstructorFragment {
            inputs: Vec::new(),
            state_mutability: StateMutability::Nonpayable,
            payable: false,
            gas: None,
        }
    }
}

impl ConstructorFragment {
    pub fn from_string(value: &str) -> AbiResult<Self> {
        Self::parse(&normalize_signature(value), &Logger::default())
    }

    fn parse(value: &str, logger: &Logger) -> AbiResult<Self> {
        let (value, gas) = parse_gas(value)?;
        let (params, modifiers) = match match_paren(value) {
            Some((keyword, params, modifiers)) if keyword.trim() == "constructor" => (params, modifiers),
            _ => return Err(AbiError::invalid_argument("invalid constructor string", "value", value)),
        };

        let inputs = parse_params(params.trim(), false)?;
        let state = parse_modifiers(modifiers.trim(), logger);
        let state = verify_state(&state, true, value)?;
        if state.constant {
            return Err(AbiError::invalid_argument("constructor cannot be constant", "value", value));
        }

        Ok(ConstructorFragment {
            inputs,
            state_mutability: state.state_mutability,
            payable: state.payable,
            gas,
        })
    }

    pub fn from_object(value: &JsonFragment) -> AbiResult<Self> {
        if value.ty.as_deref() != Some("constructor") {
            return Err(AbiError::invalid_argument(
                "invalid constructor object",
                "value",
                value.describe(),
            ));
        }
        let state = verify_state(&StateInput::from_json(value), true, &value.describe())?;
        if state.constant {
            return Err(AbiError::invalid_argument(
                "constructor cannot be constant",
                "value",
                value.describe(),
            ));
        }
        Ok(ConstructorFragment {
            inputs: params_from_object(value.inputs.as_deref())?,
            state_mutability: state.state_mutability,
            payable: state.payable,
            gas: gas_from_json(value)?,
        })
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn state_mutability(&self) -> StateMutability {
        self.state_mutability
    }

    pub fn payable(&self) -> bool {
        self.payable
    }

    pub fn gas(&self) -> Option<&BigNumber> {
        self.gas.as_ref()
    }

    /// Constructors have no selector, so `Sighash` is rejected.
    pub fn format(&self, format: FormatType) -> AbiResult<String> {
        match format {
            FormatType::Json => {
                let mut result = json!({
                    "type": "constructor",
                    "payable": self.payable,
                    "inputs": params_json(&self.inputs),
                });
                if self.state_mutability != StateMutability::Nonpayable {
                    result["stateMutability"] = json!(self.state_mutability.as_str());
                }
                if let Some(ref gas) = self.gas {
                    result["gas"] = gas_json(gas);
                }
                Ok(result.to_string())
            }
            FormatType::Sighash => Err(AbiError::unsupported(
                "cannot format a constructor for sighash",
                "format(sighash)",
            )),
            _ => {
                let mut result = format!("constructor{} ", format_params(&self.inputs, format));
                if self.state_mutability != StateMutability::Nonpayable {
                    result.push_str(self.state_mutability.as_str());
                }
                Ok(result.trim().to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StateInput {
    constant: Option<bool>,
    payable: Option<bool>,
    state_mutability: Option<StateMutability>,
}

impl StateInput {
    fn from_json(value: &JsonFragment) -> Self {
        StateInput {
            constant: value.constant,
            payable: value.payable,
            state_mutability: value.state_mutability,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    constant: bool,
    payable: bool,
    state_mutability: StateMutability,
}

/// Reconcile the legacy `constant` / `payable` flags with `stateMutability`.
fn verify_state(value: &StateInput, is_constructor: bool, source: &str) -> AbiResult<State> {
    let fail = |message: String| AbiError::invalid_argument(message, "value", source);

    if let Some(state_mutability) = value.state_mutability {
        let constant = matches!(state_mutability, StateMutability::View | StateMutability::Pure);
        if value.constant.map_or(false, |c| c != constant) {
            return Err(fail(format!(
                "cannot have constant function with mutability {}",
                state_mutability.as_str()
            )));
        }
        let payable = state_mutability == StateMutability::Payable;
        if value.payable.map_or(false, |p| p != payable) {
            return Err(fail(format!(
                "cannot have payable function with mutability {}",
                state_mutability.as_str()
            )));
        }
        return Ok(State {
            constant,
            payable,
            state_mutability,
        });
    }

    if let Some(payable) = value.payable {
        if value.constant.is_none() && !payable && !is_constructor {
            return Err(fail("unable to determine stateMutability".to_string()));
        }
        let constant = value.constant.unwrap_or(false);
        if payable && constant {
            return Err(fail("cannot have constant payable function".to_string()));
        }
        let state_mutability = if constant {
            StateMutability::View
        } else if payable {
            StateMutability::Payable
        } else {
            StateMutability::Nonpayable
        };
        return Ok(State {
            constant,
            payable,
            state_mutability,
        });
    }

    if let Some(constant) = value.constant {
        return Ok(State {
            constant,
            payable: !constant,
            state_mutability: if constant {
                StateMutability::View
            } else {
                StateMutability::Payable
            },
        });
    }

    if !is_constructor {
        return Err(fail("unable to determine stateMutability".to_string()));
    }
    Ok(State {
        constant: false,
        payable: true,
        state_mutability: StateMutability::Payable,
    })
}

/// Human-readable modifiers. The result always carries all three flags.
fn parse_modifiers(value: &str, logger: &Logger) -> StateInput {
    let mut constant = false;
    let mut payable = false;
    let mut state_mutability = StateMutability::Nonpayable;

    for modifier in value.split(' ') {
        match modifier.trim() {
            "constant" => constant = true,
            "payable" => {
                payable = true;
                state_mutability = StateMutability::Payable;
            }
            "nonpayable" => {
                payable = false;
                state_mutability = StateMutability::Nonpayable;
            }
            "pure" => {
                constant = true;
                state_mutability = StateMutability::Pure;
            }
            "view" => {
                constant = true;
                state_mutability = StateMutability::View;
            }
            "external" | "public" | "" => {}
            other => log_warn!(logger, MODULE, "unknown modifier", modifier = other),
        }
    }

    StateInput {
        constant: Some(constant),
        payable: Some(payable),
        state_mutability: Some(state_mutability),
    }
}

/// Split a trailing `@<gas>` hint off a signature.
fn parse_gas(value: &str) -> AbiResult<(&str, Option<BigNumber>)> {
    let comps: Vec<&str> = value.split('@').collect();
    match comps.len() {
        1 => Ok((value, None)),
        2 => {
            let gas = comps[1];
            if gas.is_empty() || !gas.chars().all(|c| c.is_ascii_digit()) {
                return Err(AbiError::invalid_argument(
                    "invalid human-readable ABI signature gas",
                    "value",
                    value,
                ));
            }
            Ok((comps[0].trim(), Some(BigNumber::parse(gas)?)))
        }
        _ => Err(AbiError::invalid_argument(
            "invalid human-readable ABI signature",
            "value",
            value,
        )),
    }
}

fn gas_from_json(value: &JsonFragment) -> AbiResult<Option<BigNumber>> {
    match value.gas {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(ref n)) => match n.as_u64() {
            Some(gas) => Ok(Some(BigNumber::from(gas))),
            None => Err(AbiError::invalid_argument("invalid gas", "gas", n.to_string())),
        },
        Some(JsonValue::String(ref s)) => Ok(Some(BigNumber::parse(s)?)),
        Some(ref other) => Err(AbiError::invalid_argument("invalid gas", "gas", other.to_string())),
    }
}

fn gas_json(gas: &BigNumber) -> JsonValue {
    match gas.to_u64() {
        Ok(gas) => json!(gas),
        Err(_) => json!(gas.to_string()),
    }
}

/// Collapse whitespace and put a space before every `(` and after every `)`.
fn normalize_signature(value: &str) -> String {
    let mut spaced = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '(' => spaced.push_str(" ("),
            ')' => spaced.push_str(") "),
            c if c.is_whitespace() => spaced.push(' '),
            c => spaced.push(c),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `name(params)modifiers`: text before the first `(`, between it and the
/// last `)`, and after that. The outer parts may not contain parentheses.
fn match_paren(value: &str) -> Option<(&str, &str, &str)> {
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    if close < open {
        return None;
    }
    let prefix = &value[..open];
    let suffix = &value[close + 1..];
    if prefix.contains(')') || suffix.contains('(') {
        return None;
    }
    Some((prefix, &value[open + 1..close], suffix))
}

/// Split on top-level commas.
fn split_nesting(value: &str) -> AbiResult<Vec<String>> {
    let value = value.trim();
    let mut result = Vec::new();
    let mut accum = String::new();
    let mut depth = 0i32;

    for c in value.chars() {
        if c == ',' && depth == 0 {
            result.push(std::mem::take(&mut accum));
            continue;
        }
        accum.push(c);
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth < 0 {
                return Err(AbiError::invalid_argument("unbalanced parenthesis", "value", value));
            }
        }
    }
    if !accum.is_empty() {
        result.push(accum);
    }
    Ok(result)
}

fn parse_params(value: &str, allow_indexed: bool) -> AbiResult<Vec<ParamType>> {
    split_nesting(value)?
        .iter()
        .map(|param| ParamType::from_string(param, allow_indexed))
        .collect()
}

fn params_from_object(params: Option<&[JsonParamType]>) -> AbiResult<Vec<ParamType>> {
    params
        .unwrap_or_default()
        .iter()
        .map(ParamType::from_object)
        .collect()
}

fn format_params(params: &[ParamType], format: FormatType) -> String {
    let separator = if format == FormatType::Full { ", " } else { "," };
    let inner = params
        .iter()
        .map(|p| p.format(format))
        .collect::<Vec<_>>()
        .join(separator);
    format!("({})", inner)
}

fn params_json(params: &[ParamType]) -> JsonValue {
    JsonValue::Array(params.iter().map(ParamType::to_json).collect())
}

/// Identifiers follow Solidity: letters, digits, `_` and `$`, not starting
/// with a digit.
fn verify_identifier(value: &str) -> AbiResult<&str> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if !valid {
        return Err(AbiError::invalid_argument(
            format!("invalid identifier {:?}", value),
            "value",
            value,
        ));
    }
    Ok(value)
}
