//! Error types for trackwise
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, failed validation, unknown id, bad config)
//! - 4: Operation failed (I/O, serialization, lock timeout, advisor)
//!
//! The state reducer never produces errors; lookup misses inside it are
//! no-ops. Errors only surface at the edges (validation, storage, CLI).

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the trackwise CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for trackwise operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Checklist item not found: {0}")]
    ChecklistItemNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Ambiguous id '{prefix}' matches {count} entries")]
    AmbiguousId { prefix: String, count: usize },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Advisor error: {0}")]
    Advisor(#[from] crate::advisor::AdvisorError),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::Validation { .. }
            | Error::InvalidConfig(_)
            | Error::TaskNotFound(_)
            | Error::ChecklistItemNotFound(_)
            | Error::TemplateNotFound(_)
            | Error::AmbiguousId { .. } => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Advisor(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Short machine-readable classification used in JSON output
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            exit_codes::USER_ERROR => "user_error",
            _ => "operation_failed",
        }
    }

    /// Structured fields for JSON error output, when the variant has any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, message } => Some(serde_json::json!({
                "field": field,
                "message": message,
            })),
            Error::AmbiguousId { prefix, count } => Some(serde_json::json!({
                "prefix": prefix,
                "matches": count,
            })),
            Error::TaskNotFound(id)
            | Error::ChecklistItemNotFound(id)
            | Error::TemplateNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for trackwise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
