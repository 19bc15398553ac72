//! Parameter types
//!
//! A [`ParamType`] is an immutable tree describing one parameter: its
//! canonical type string, its base type and, for tuples and arrays, its
//! children. It is built from a human-readable type string by a small
//! state machine or from a JSON ABI parameter object.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{AbiError, AbiResult};

/// Output styles for types and fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Bare canonical form hashed for selectors and topics
    Sighash,
    /// Human-readable, without parameter names
    Minimal,
    /// Human-readable, with names, `indexed` and spacing
    Full,
    /// Standard JSON ABI
    Json,
}

/// Parameter object of the JSON ABI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonParamType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<JsonParamType>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    name: Option<String>,
    ty: String,
    base_type: String,
    indexed: Option<bool>,
    components: Option<Vec<ParamType>>,
    array_length: Option<i64>,
    array_children: Option<Box<ParamType>>,
}

impl ParamType {
    /// Parse a type with an optional name, e.g. `tuple(address to, uint256) memory pay`.
    ///
    /// `allow_indexed` permits the `indexed` keyword (event inputs).
    pub fn from_string(value: &str, allow_indexed: bool) -> AbiResult<Self> {
        TypeParser::new(value, allow_indexed).parse()
    }

    pub fn from_object(value: &JsonParamType) -> AbiResult<Self> {
        let components = match value.components {
            Some(ref components) => Some(
                components
                    .iter()
                    .map(ParamType::from_object)
                    .collect::<AbiResult<Vec<_>>>()?,
            ),
            None => None,
        };
        let name = value.name.clone().filter(|name| !name.is_empty());
        ParamType::from_parts(&verify_type(&value.ty), name, value.indexed, components)
    }

    /// Elementary type with no children, used for synthetic slots.
    pub(crate) fn elementary(ty: &str, name: Option<String>) -> Self {
        ParamType {
            name,
            ty: ty.to_string(),
            base_type: ty.to_string(),
            indexed: None,
            components: None,
            array_length: None,
            array_children: None,
        }
    }

    fn from_parts(
        raw_type: &str,
        name: Option<String>,
        indexed: Option<bool>,
        components: Option<Vec<ParamType>>,
    ) -> AbiResult<Self> {
        if let Some((inner, digits)) = split_array_suffix(raw_type) {
            let child = ParamType::from_parts(inner, None, None, components)?;
            let array_length = if digits.is_empty() {
                -1
            } else {
                digits.parse::<i64>().map_err(|_| {
                    AbiError::invalid_argument("invalid array length", "param", raw_type)
                })?
            };
            let suffix = if array_length < 0 {
                String::new()
            } else {
                array_length.to_string()
            };
            return Ok(ParamType {
                name,
                ty: format!("{}[{}]", child.ty, suffix),
                base_type: "array".to_string(),
                indexed,
                components: None,
                array_length: Some(array_length),
                array_children: Some(Box::new(child)),
            });
        }

        if let Some(components) = components {
            let inner = components
                .iter()
                .map(|c| c.ty.as_str())
                .collect::<Vec<_>>()
                .join(",");
            return Ok(ParamType {
                name,
                ty: format!("tuple({})", inner),
                base_type: "tuple".to_string(),
                indexed,
                components: Some(components),
                array_length: None,
                array_children: None,
            });
        }

        if raw_type == "tuple" {
            return Err(AbiError::invalid_argument("tuple type missing components", "param", raw_type));
        }

        Ok(ParamType {
            name,
            ty: raw_type.to_string(),
            base_type: raw_type.to_string(),
            indexed,
            components: None,
            array_length: None,
            array_children: None,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Canonical type string, tuples spelled out: `tuple(address,bytes)[3]`
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn base_type(&self) -> &str {
        &self.base_type
    }

    pub fn indexed(&self) -> Option<bool> {
        self.indexed
    }

    pub fn components(&self) -> Option<&[ParamType]> {
        self.components.as_deref()
    }

    /// `-1` for dynamic arrays, `None` when not an array
    pub fn array_length(&self) -> Option<i64> {
        self.array_length
    }

    pub fn array_children(&self) -> Option<&ParamType> {
        self.array_children.as_deref()
    }

    pub fn format(&self, format: FormatType) -> String {
        if format == FormatType::Json {
            return self.to_json().to_string();
        }

        let mut result = String::new();
        match (&self.array_children, &self.components) {
            (Some(child), _) => {
                result.push_str(&child.format(format));
                result.push('[');
                if let Some(length) = self.array_length.filter(|l| *l >= 0) {
                    result.push_str(&length.to_string());
                }
                result.push(']');
            }
            (None, Some(components)) => {
                if format != FormatType::Sighash {
                    result.push_str("tuple");
                }
                let separator = if format == FormatType::Full { ", " } else { "," };
                let inner = components
                    .iter()
                    .map(|c| c.format(format))
                    .collect::<Vec<_>>()
                    .join(separator);
                result.push('(');
                result.push_str(&inner);
                result.push(')');
            }
            (None, None) => result.push_str(&self.ty),
        }

        if format != FormatType::Sighash {
            if self.indexed == Some(true) {
                result.push_str(" indexed");
            }
            if format == FormatType::Full {
                if let Some(ref name) = self.name {
                    result.push(' ');
                    result.push_str(name);
                }
            }
        }

        result
    }

    pub fn to_json(&self) -> JsonValue {
        let mut result = Map::new();
        result.insert("type".to_string(), json!(self.json_type()));
        if let Some(ref name) = self.name {
            result.insert("name".to_string(), json!(name));
        }
        if let Some(indexed) = self.indexed {
            result.insert("indexed".to_string(), json!(indexed));
        }
        if let Some(components) = self.json_components() {
            let components: Vec<JsonValue> = components.iter().map(|c| c.to_json()).collect();
            result.insert("components".to_string(), JsonValue::Array(components));
        }
        JsonValue::Object(result)
    }

    /// JSON ABI spelling, where tuples are written `tuple` / `tuple[2]`
    fn json_type(&self) -> String {
        match (&self.array_children, &self.components) {
            (Some(child), _) => {
                let suffix = match self.array_length {
                    Some(length) if length >= 0 => length.to_string(),
                    _ => String::new(),
                };
                format!("{}[{}]", child.json_type(), suffix)
            }
            (None, Some(_)) => "tuple".to_string(),
            (None, None) => self.ty.clone(),
        }
    }

    fn json_components(&self) -> Option<&[ParamType]> {
        match self.array_children {
            Some(ref child) => child.json_components(),
            None => self.components.as_deref(),
        }
    }
}

/// `T[N]` / `T[]` split into `T` and the digits between the last brackets.
fn split_array_suffix(ty: &str) -> Option<(&str, &str)> {
    let body = ty.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let digits = &body[open + 1..];
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((&body[..open], digits))
}

/// Expand bare `uint` / `int` to their 256-bit forms.
fn verify_type(ty: &str) -> String {
    fn bare(ty: &str, prefix: &str) -> bool {
        match ty.strip_prefix(prefix) {
            Some(rest) => !matches!(rest.chars().next(), Some('1'..='9')),
            None => false,
        }
    }

    if bare(ty, "uint") {
        format!("uint256{}", &ty[4..])
    } else if bare(ty, "int") {
        format!("int256{}", &ty[3..])
    } else {
        ty.to_string()
    }
}

/// Whether `name` is a data-location or `payable` keyword valid for `ty`.
/// Such keywords are dropped from the parameter; misplaced ones are errors.
fn check_modifier(ty: &str, name: &str) -> AbiResult<bool> {
    let location = matches!(name, "calldata" | "memory" | "storage");
    let nested = matches!(name, "calldata" | "memory");

    if ty == "bytes" || ty == "string" {
        if location {
            return Ok(true);
        }
    } else if ty == "address" {
        if name == "payable" {
            return Ok(true);
        }
    } else if (ty.contains('[') || ty == "tuple") && nested {
        return Ok(true);
    }

    if location || name == "payable" {
        return Err(AbiError::invalid_argument("invalid modifier", "name", name));
    }
    Ok(false)
}

#[derive(Debug, Default)]
struct ParseState {
    allow_type: bool,
    allow_name: bool,
    allow_params: bool,
    allow_array: bool,
    read_array: bool,
}

#[derive(Debug)]
struct ParseNode {
    ty: String,
    name: String,
    indexed: Option<bool>,
    parent: Option<usize>,
    components: Option<Vec<usize>>,
    state: ParseState,
}

/// Single pass over the characters, keeping the open tuple frames as parent
/// links in a node arena instead of recursing.
struct TypeParser<'a> {
    source: &'a str,
    allow_indexed: bool,
    nodes: Vec<ParseNode>,
}

impl<'a> TypeParser<'a> {
    fn new(source: &'a str, allow_indexed: bool) -> Self {
        let root = ParseNode {
            ty: String::new(),
            name: String::new(),
            indexed: None,
            parent: None,
            components: None,
            state: ParseState {
                allow_type: true,
                ..Default::default()
            },
        };
        TypeParser {
            source,
            allow_indexed,
            nodes: vec![root],
        }
    }

    fn unexpected(&self, position: usize) -> AbiError {
        AbiError::invalid_argument(
            format!("unexpected character at position {}", position),
            "param",
            self.source,
        )
    }

    fn new_node(&mut self, parent: usize) -> usize {
        self.nodes.push(ParseNode {
            ty: String::new(),
            name: String::new(),
            indexed: if self.allow_indexed { Some(false) } else { None },
            parent: Some(parent),
            components: None,
            state: ParseState {
                allow_type: true,
                ..Default::default()
            },
        });
        self.nodes.len() - 1
    }

    /// Resolve a trailing `indexed` or modifier word and canonicalize the type.
    fn finish_node(&mut self, idx: usize, position: usize) -> AbiResult<()> {
        if self.nodes[idx].name == "indexed" {
            if !self.allow_indexed || self.nodes[idx].indexed == Some(true) {
                return Err(self.unexpected(position));
            }
            self.nodes[idx].indexed = Some(true);
            self.nodes[idx].name.clear();
        }

        let node = &mut self.nodes[idx];
        if check_modifier(&node.ty, &node.name)? {
            node.name.clear();
        }
        node.ty = verify_type(&node.ty);
        Ok(())
    }

    fn parse(mut self) -> AbiResult<ParamType> {
        let normalized: String = self
            .source
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();

        let mut current = 0usize;

        for (i, c) in normalized.chars().enumerate() {
            match c {
                '(' => {
                    let node = &mut self.nodes[current];
                    if node.state.allow_type && node.ty.is_empty() {
                        node.ty = "tuple".to_string();
                    } else if !node.state.allow_params {
                        return Err(self.unexpected(i));
                    }
                    let node = &mut self.nodes[current];
                    node.state.allow_type = false;
                    node.ty = verify_type(&node.ty);
                    let child = self.new_node(current);
                    self.nodes[current].components = Some(vec![child]);
                    current = child;
                }

                ')' => {
                    self.nodes[current].state = ParseState::default();
                    self.finish_node(current, i)?;

                    let parent = match self.nodes[current].parent {
                        Some(parent) => parent,
                        None => return Err(self.unexpected(i)),
                    };
                    current = parent;
                    let state = &mut self.nodes[current].state;
                    state.allow_params = false;
                    state.allow_name = true;
                    state.allow_array = true;
                }

                ',' => {
                    self.nodes[current].state = ParseState::default();
                    self.finish_node(current, i)?;

                    let parent = match self.nodes[current].parent {
                        Some(parent) => parent,
                        None => return Err(self.unexpected(i)),
                    };
                    let sibling = self.new_node(parent);
                    if let Some(ref mut components) = self.nodes[parent].components {
                        components.push(sibling);
                    }
                    current = sibling;
                }

                ' ' => {
                    let node = &mut self.nodes[current];
                    if node.state.allow_type && !node.ty.is_empty() {
                        node.ty = verify_type(&node.ty);
                        node.state.allow_type = false;
                        node.state.allow_name = true;
                        node.state.allow_params = true;
                    }

                    if node.state.allow_name && !node.name.is_empty() {
                        if node.name == "indexed" {
                            if !self.allow_indexed || node.indexed == Some(true) {
                                return Err(self.unexpected(i));
                            }
                            node.indexed = Some(true);
                            node.name.clear();
                        } else if check_modifier(&node.ty, &node.name)? {
                            node.name.clear();
                        } else {
                            node.state.allow_name = false;
                        }
                    }
                }

                '[' => {
                    if !self.nodes[current].state.allow_array {
                        return Err(self.unexpected(i));
                    }
                    let node = &mut self.nodes[current];
                    node.ty.push(c);
                    node.state.allow_array = false;
                    node.state.allow_name = false;
                    node.state.read_array = true;
                }

                ']' => {
                    if !self.nodes[current].state.read_array {
                        return Err(self.unexpected(i));
                    }
                    let node = &mut self.nodes[current];
                    node.ty.push(c);
                    node.state.read_array = false;
                    node.state.allow_array = true;
                    node.state.allow_name = true;
                }

                _ => {
                    let node = &mut self.nodes[current];
                    if node.state.allow_type {
                        node.ty.push(c);
                        node.state.allow_params = true;
                        node.state.allow_array = true;
                    } else if node.state.allow_name {
                        node.name.push(c);
                        node.state.allow_array = false;
                    } else if node.state.read_array {
                        node.ty.push(c);
                    } else {
                        return Err(self.unexpected(i));
                    }
                }
            }
        }

        if self.nodes[current].parent.is_some() {
            return Err(AbiError::invalid_argument("unexpected eof", "param", self.source));
        }

        let length = self.source.chars().count();
        self.finish_node(0, length.saturating_sub(7))?;
        self.build(0)
    }

    fn build(&self, idx: usize) -> AbiResult<ParamType> {
        let node = &self.nodes[idx];
        let components = match node.components {
            Some(ref children) => Some(
                children
                    .iter()
                    .map(|child| self.build(*child))
                    .collect::<AbiResult<Vec<_>>>()?,
            ),
            None => None,
        };
        let name = if node.name.is_empty() {
            None
        } else {
            Some(node.name.clone())
        };
        ParamType::from_parts(&node.ty, name, node.indexed, components)
    }
}
