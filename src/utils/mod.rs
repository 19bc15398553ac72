//! Utilities Module
//!
//! Byte, string and hashing helpers plus the diagnostics logger.

pub mod bytes;
pub mod crypto;
pub mod logging;
pub mod strings;

pub use bytes::*;
pub use crypto::*;
pub use strings::*;
