//! Unified error handling for autoapprove-mcp
//!
//! Failures are classified so the launch flow can tell a timeout apart from
//! anything else, and so every diagnostic carries a readable message.

use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AutoApproveError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Process management errors
    #[error("Process error: {message}")]
    Process {
        message: String,
        command: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Timeout errors
    #[error("Timeout error: {message} (timeout: {timeout_ms}ms)")]
    Timeout { message: String, timeout_ms: u64 },

    /// Script injection errors
    #[error("Injection error: {message}")]
    Injection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// MCP server errors
    #[error("Server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unknown errors
    #[error("Unknown error: {message}")]
    Unknown {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },
    #[error("Invalid JSON format in config file {path}: {message}")]
    InvalidFormat { path: String, message: String },
    #[error("{field} must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
    #[error("Cannot determine the configuration directory")]
    NoConfigDir,
    #[error("Config file error: {message}")]
    Io { message: String },
}

impl AutoApproveError {
    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            AutoApproveError::Config { .. } => ErrorCategory::Config,
            AutoApproveError::Process { .. } => ErrorCategory::Process,
            AutoApproveError::Timeout { .. } => ErrorCategory::Timeout,
            AutoApproveError::Injection { .. } => ErrorCategory::Injection,
            AutoApproveError::Server { .. } => ErrorCategory::Server,
            AutoApproveError::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.category() == ErrorCategory::Timeout
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AutoApproveError::Config { message, .. } => {
                format!("Configuration problem: {}", message)
            }
            AutoApproveError::Process {
                message, command, ..
            } => {
                format!("Process problem ({}): {}", command, message)
            }
            AutoApproveError::Timeout { message, .. } => {
                format!("Operation timed out: {}", message)
            }
            AutoApproveError::Injection { message, .. } => {
                format!("Script injection failed: {}", message)
            }
            AutoApproveError::Server { message, .. } => {
                format!("MCP server failed: {}", message)
            }
            AutoApproveError::Unknown { message, .. } => {
                format!("Unexpected error: {}", message)
            }
        }
    }
}

impl From<io::Error> for AutoApproveError {
    fn from(err: io::Error) -> Self {
        AutoApproveError::Unknown {
            message: format!("I/O error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ConfigError> for AutoApproveError {
    fn from(err: ConfigError) -> Self {
        AutoApproveError::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Process,
    Timeout,
    Injection,
    Server,
    Unknown,
}

impl ErrorCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "Configuration",
            ErrorCategory::Process => "Process",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::Injection => "Injection",
            ErrorCategory::Server => "Server",
            ErrorCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result type alias for convenience
pub type AutoApproveResult<T> = Result<T, AutoApproveError>;

/// Convenience functions for creating common errors
pub mod errors {
    use super::*;

    pub fn config_error(message: impl Into<String>) -> AutoApproveError {
        AutoApproveError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn process_error(
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> AutoApproveError {
        AutoApproveError::Process {
            message: message.into(),
            command: command.into(),
            source: None,
        }
    }

    pub fn process_error_with_source(
        command: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> AutoApproveError {
        AutoApproveError::Process {
            message: message.into(),
            command: command.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn timeout_error(message: impl Into<String>, timeout_ms: u64) -> AutoApproveError {
        AutoApproveError::Timeout {
            message: message.into(),
            timeout_ms,
        }
    }

    pub fn injection_error(message: impl Into<String>) -> AutoApproveError {
        AutoApproveError::Injection {
            message: message.into(),
            source: None,
        }
    }

    pub fn injection_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> AutoApproveError {
        AutoApproveError::Injection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn server_error(message: impl Into<String>) -> AutoApproveError {
        AutoApproveError::Server {
            message: message.into(),
            source: None,
        }
    }
}
