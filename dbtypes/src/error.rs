//! Error types for dbtypes

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for dbtypes operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during a generation run
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to resolve connection string: {0}")]
    ConnectionResolutionError(String),

    #[error("Unsupported dialect: '{0}'")]
    UnsupportedDialectError(String),

    #[error("Failed to introspect database: {0}")]
    IntrospectionError(String),

    #[error("Failed to serialize table metadata: {0}")]
    SerializationError(String),

    #[error("Failed to write {}: {source}", path.display())]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CodegenError {
    /// Short, stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CodegenError::ConnectionResolutionError(_) => "ConnectionResolutionError",
            CodegenError::UnsupportedDialectError(_) => "UnsupportedDialectError",
            CodegenError::IntrospectionError(_) => "IntrospectionError",
            CodegenError::SerializationError(_) => "SerializationError",
            CodegenError::OutputWriteError { .. } => "OutputWriteError",
            CodegenError::ConfigError(_) => "ConfigError",
            CodegenError::ValidationError(_) => "ValidationError",
        }
    }
}

impl From<mysql_async::Error> for CodegenError {
    fn from(err: mysql_async::Error) -> Self {
        CodegenError::IntrospectionError(err.to_string())
    }
}

impl From<sqlx::Error> for CodegenError {
    fn from(err: sqlx::Error) -> Self {
        CodegenError::IntrospectionError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
