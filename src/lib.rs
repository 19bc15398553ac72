//! Contract ABI codec
//!
//! Encodes and decodes the word-aligned binary layout used for EVM contract
//! calls, return data, reverts and event logs.
//!
//! # Architecture
//!
//! This crate provides:
//! - **abi**: type parser, coders, fragments, selectors and the `Interface`
//! - **bignumber**: arbitrary-precision integers with two's-complement helpers
//! - **address**: checksummed, ICAP and contract address derivation
//! - **utils**: byte/hex and UTF-8 helpers, keccak-256, structured logging
//! - **config**: coder settings loaded from JSON
//!
//! # Example
//!
//! ```rust
//! use contract_abi::{Interface, Value};
//!
//! let iface = Interface::from_human_readable(&[
//!     "function transfer(address to, uint256 amount) returns (bool)",
//! ])?;
//! let transfer = iface.get_function("transfer")?;
//! let data = iface.encode_function_data(
//!     transfer,
//!     &[Value::from("0x8ba1f109551bD432803012645Ac136ddd64DBA72"), Value::from(1000u32)],
//! )?;
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//! # Ok::<(), contract_abi::AbiError>(())
//! ```

pub mod abi;
pub mod address;
pub mod bignumber;
pub mod config;
pub mod error;
pub mod utils;

pub use error::{AbiError, AbiResult, CallException, ErrorCode};

pub use abi::{
    AbiCoder, AbiSelector, Fragment, FormatType, Indexed, Interface, ParamType, Results, Value,
};
pub use address::{get_address, get_contract_address, get_create2_address, get_icap_address, is_address};
pub use bignumber::BigNumber;
pub use config::CoderConfig;
pub use utils::crypto::{id, keccak256, to_checksum_address};
pub use utils::logging::{LogLevel, Logger};
