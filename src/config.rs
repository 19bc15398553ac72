//! Coder configuration
//!
//! Everything is optional; an empty JSON object yields the defaults.

use serde::{Deserialize, Serialize};

use crate::error::AbiResult;
use crate::utils::logging::{LogLevel, Logger};
use crate::utils::strings::Utf8ErrorPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoderConfig {
    /// How `string` values with malformed UTF-8 are decoded
    pub utf8_policy: Utf8ErrorPolicy,
    pub log_level: LogLevel,
    /// Replace error details with the bare error code
    pub censor_errors: bool,
    /// Lock censorship on for the lifetime of the logger
    pub permanent_censorship: bool,
}

impl CoderConfig {
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn logger(&self) -> AbiResult<Logger> {
        let mut logger = Logger::new(self.log_level);
        self.apply_censorship(&mut logger)?;
        Ok(logger)
    }

    /// Apply the censorship flags to an existing logger.
    pub fn apply_censorship(&self, logger: &mut Logger) -> AbiResult<()> {
        if self.censor_errors || self.permanent_censorship {
            logger.set_censorship(true, self.permanent_censorship)?;
        }
        Ok(())
    }
}
