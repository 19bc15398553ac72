//! Structured diagnostics
//!
//! A [`Logger`] is an explicit value handed to the coder, the fragment parser
//! and the interface. It carries:
//! - the minimum level that is emitted
//! - the sink entries are written to (stderr or an in-memory capture)
//! - the error censorship state

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{AbiError, AbiResult};

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Structured log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn field_value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render without the timestamp
    pub fn render(&self) -> String {
        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields_str.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields_str)
        }
    }
}

#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    Memory(Arc<Mutex<Vec<LogEntry>>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Censorship {
    Off,
    On,
    Permanent,
}

#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    censorship: Censorship,
    sink: LogSink,
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogLevel::default())
    }
}

impl Logger {
    pub fn new(level: LogLevel) -> Self {
        Logger {
            level,
            censorship: Censorship::Off,
            sink: LogSink::Stderr,
        }
    }

    /// Logger that keeps entries in memory instead of printing them.
    pub fn capturing(level: LogLevel) -> Self {
        Logger {
            level,
            censorship: Censorship::Off,
            sink: LogSink::Memory(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn log(&self, entry: LogEntry) {
        if self.level == LogLevel::Off || entry.level < self.level {
            return;
        }

        match &self.sink {
            LogSink::Stderr => {
                let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
                eprintln!("[{}] {}", timestamp, entry.render());
            }
            LogSink::Memory(entries) => {
                if let Ok(mut entries) = entries.lock() {
                    entries.push(entry);
                }
            }
        }
    }

    /// Entries captured so far. Always empty for the stderr sink.
    pub fn entries(&self) -> Vec<LogEntry> {
        match &self.sink {
            LogSink::Stderr => Vec::new(),
            LogSink::Memory(entries) => entries
                .lock()
                .map(|entries| entries.clone())
                .unwrap_or_default(),
        }
    }

    /// Turn error censorship on or off.
    ///
    /// Once censorship is permanent it can no longer be changed: disabling
    /// is ignored and re-enabling fails.
    pub fn set_censorship(&mut self, censor: bool, permanent: bool) -> AbiResult<()> {
        if !censor && permanent {
            return Err(AbiError::unsupported(
                "cannot permanently disable censorship",
                "setCensorship",
            ));
        }

        if self.censorship == Censorship::Permanent {
            if !censor {
                return Ok(());
            }
            return Err(AbiError::unsupported(
                "error censorship permanent",
                "setCensorship",
            ));
        }

        self.censorship = match (censor, permanent) {
            (true, true) => Censorship::Permanent,
            (true, false) => Censorship::On,
            _ => Censorship::Off,
        };
        Ok(())
    }

    pub fn is_censored(&self) -> bool {
        self.censorship != Censorship::Off
    }

    /// Strip error details when censorship is on, keeping only the code.
    pub fn censor<T>(&self, result: AbiResult<T>) -> AbiResult<T> {
        match result {
            Err(e) if self.is_censored() => Err(AbiError::Censored(e.code())),
            other => other,
        }
    }
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $module:expr, $msg:expr) => {
        $logger.log($crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ))
    };
    ($logger:expr, $module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $logger.log(
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Debug,
                $module,
                $msg
            )
            $(.field(stringify!($key), &$value))*
        )
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $module:expr, $msg:expr) => {
        $logger.log($crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ))
    };
    ($logger:expr, $module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $logger.log(
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Info,
                $module,
                $msg
            )
            $(.field(stringify!($key), &$value))*
        )
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $module:expr, $msg:expr) => {
        $logger.log($crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warning,
            $module,
            $msg
        ))
    };
    ($logger:expr, $module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $logger.log(
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Warning,
                $module,
                $msg
            )
            $(.field(stringify!($key), &$value))*
        )
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $module:expr, $msg:expr) => {
        $logger.log($crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ))
    };
    ($logger:expr, $module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $logger.log(
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Error,
                $module,
                $msg
            )
            $(.field(stringify!($key), &$value))*
        )
    };
}
