//! Unified error types for the ABI codec
//!
//! Every fallible operation in the crate returns [`AbiError`]. Each variant
//! maps onto one [`ErrorCode`], which is what survives censorship and what
//! callers should match on when they only care about the failure class.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abi::value::Results;
use crate::bignumber::BigNumber;

/// Main error type for all codec operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbiError {
    /// Malformed type, signature or value; failed checksum; wrong arity
    #[error("{message} (argument={argument:?}, value={value:?})")]
    InvalidArgument {
        message: String,
        argument: String,
        value: String,
    },

    #[error("missing argument: {message} (count={count}, expected={expected})")]
    MissingArgument {
        message: String,
        count: usize,
        expected: usize,
    },

    #[error("too many arguments: {message} (count={count}, expected={expected})")]
    UnexpectedArgument {
        message: String,
        count: usize,
        expected: usize,
    },

    /// A read or write went past the available data. Never deferred.
    #[error("{message} (length={length}, offset={offset})")]
    BufferOverrun {
        message: String,
        length: usize,
        offset: usize,
    },

    #[error("{message} (fault={fault:?}, operation={operation:?})")]
    NumericFault {
        message: String,
        fault: String,
        operation: String,
    },

    #[error("{message} (operation={operation:?})")]
    UnsupportedOperation { message: String, operation: String },

    #[error("{0}")]
    CallException(Box<CallException>),

    /// A per-field decode failure, raised when that field is accessed
    #[error("deferred error during ABI decoding triggered accessing {accessor}: {source}")]
    Deferred {
        accessor: String,
        source: Box<AbiError>,
    },

    #[error("censored error (code={0:?})")]
    Censored(ErrorCode),
}

impl AbiError {
    pub fn invalid_argument(
        message: impl Into<String>,
        argument: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        AbiError::InvalidArgument {
            message: message.into(),
            argument: argument.into(),
            value: value.into(),
        }
    }

    pub fn buffer_overrun(message: impl Into<String>, length: usize, offset: usize) -> Self {
        AbiError::BufferOverrun {
            message: message.into(),
            length,
            offset,
        }
    }

    pub fn numeric_fault(
        message: impl Into<String>,
        fault: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        AbiError::NumericFault {
            message: message.into(),
            fault: fault.into(),
            operation: operation.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>, operation: impl Into<String>) -> Self {
        AbiError::UnsupportedOperation {
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Compare a supplied count against the expected one.
    pub fn check_argument_count(count: usize, expected: usize, message: &str) -> AbiResult<()> {
        if count < expected {
            return Err(AbiError::MissingArgument {
                message: message.to_string(),
                count,
                expected,
            });
        }
        if count > expected {
            return Err(AbiError::UnexpectedArgument {
                message: message.to_string(),
                count,
                expected,
            });
        }
        Ok(())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AbiError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            AbiError::MissingArgument { .. } => ErrorCode::MissingArgument,
            AbiError::UnexpectedArgument { .. } => ErrorCode::UnexpectedArgument,
            AbiError::BufferOverrun { .. } => ErrorCode::BufferOverrun,
            AbiError::NumericFault { .. } => ErrorCode::NumericFault,
            AbiError::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            AbiError::CallException(_) => ErrorCode::CallException,
            AbiError::Deferred { source, .. } => source.code(),
            AbiError::Censored(code) => *code,
        }
    }

    /// Buffer overruns leave the cursor state untrustworthy and must propagate.
    pub fn is_buffer_overrun(&self) -> bool {
        self.code() == ErrorCode::BufferOverrun
    }

    pub fn call_exception(&self) -> Option<&CallException> {
        match self {
            AbiError::CallException(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    MissingArgument,
    UnexpectedArgument,
    BufferOverrun,
    NumericFault,
    UnsupportedOperation,
    CallException,
}

/// A decoded (or undecodable) revert
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallException {
    pub message: String,
    /// Signature of the function whose result was being decoded
    pub method: String,
    /// Raw return data, `0x` prefixed
    pub data: String,
    pub error_name: Option<String>,
    pub error_signature: Option<String>,
    pub error_args: Option<Results>,
    /// Reason string of a built-in `Error(string)` revert
    pub reason: Option<String>,
    /// Code of a built-in `Panic(uint256)` revert
    pub panic_code: Option<BigNumber>,
    pub cause: Option<Box<AbiError>>,
}

impl std::fmt::Display for CallException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (method={:?}, data={:?}", self.message, self.method, self.data)?;
        if let Some(ref signature) = self.error_signature {
            write!(f, ", errorSignature={:?}", signature)?;
        }
        if let Some(ref reason) = self.reason {
            write!(f, ", reason={:?}", reason)?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, ", cause={}", cause)?;
        }
        write!(f, ")")
    }
}

/// Result type alias for codec operations
pub type AbiResult<T> = Result<T, AbiError>;

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::invalid_argument(format!("invalid hex data: {}", e), "value", "")
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::invalid_argument(format!("invalid JSON: {}", e), "json", "")
    }
}
