//! Leveled diagnostics emitted during a generation run

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// Verbosity threshold for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Equivalent `tracing` filter directive
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            level => level.as_str(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(CodegenError::ConfigError(format!(
                "Unknown log level '{}'",
                other
            ))),
        }
    }
}

/// Severity of a single diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Success,
    Debug,
}

impl Severity {
    /// Lowest [`LogLevel`] at which the message is shown
    pub fn threshold(&self) -> LogLevel {
        match self {
            Severity::Error => LogLevel::Error,
            Severity::Warn => LogLevel::Warn,
            Severity::Info | Severity::Success => LogLevel::Info,
            Severity::Debug => LogLevel::Debug,
        }
    }
}

/// Receives diagnostics from a run. Implementations must not fail.
pub trait Diagnostics: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    fn error(&self, message: &str) {
        self.log(Severity::Error, message)
    }

    fn warn(&self, message: &str) {
        self.log(Severity::Warn, message)
    }

    fn info(&self, message: &str) {
        self.log(Severity::Info, message)
    }

    fn success(&self, message: &str) {
        self.log(Severity::Success, message)
    }

    fn debug(&self, message: &str) {
        self.log(Severity::Debug, message)
    }
}

/// Forwards diagnostics to `tracing`, filtered by a [`LogLevel`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics {
    level: LogLevel,
}

impl TracingDiagnostics {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.level != LogLevel::Silent && severity.threshold() <= self.level
    }
}

impl Diagnostics for TracingDiagnostics {
    fn log(&self, severity: Severity, message: &str) {
        if !self.enabled(severity) {
            return;
        }
        match severity {
            Severity::Error => tracing::error!("{}", message),
            Severity::Warn => tracing::warn!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Success => tracing::info!("✓ {}", message),
            Severity::Debug => tracing::debug!("{}", message),
        }
    }
}
