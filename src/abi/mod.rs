//! ABI (Application Binary Interface) codec for Solidity/EVM contracts
//!
//! This module provides:
//! - Type strings parsed into [`ParamType`] trees (human-readable or JSON)
//! - Function, event, error and constructor fragments
//! - Head/tail encoding and decoding of every canonical type
//! - Selector and topic calculation, built-in revert decoding
//! - The [`Interface`] tying fragments to call, result and log data

pub mod coder;
pub mod coders;
pub mod fragments;
pub mod interface;
pub mod param_type;
pub mod reader;
pub mod selector;
pub mod value;
pub mod writer;


pub use coder::{parse_types, AbiCoder};
pub use coders::{Coder, CoderKind};
pub use fragments::{
    ConstructorFragment, ErrorFragment, EventFragment, Fragment, FunctionFragment, JsonFragment,
    StateMutability,
};
pub use interface::{ErrorDescription, Interface, Log, LogDescription, Topic, TransactionDescription};
pub use param_type::{FormatType, JsonParamType, ParamType};
pub use reader::Reader;
pub use selector::{builtin_error, panic_reason, AbiSelector, BuiltinError};
pub use value::{Indexed, Results, Value};
pub use writer::{Writer, WORD_SIZE};
