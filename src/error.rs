//! Error types for translated attribute access
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// No accessor with this name exists on the receiver.
    ///
    /// Produced identically for names that look like translated accessors on
    /// undeclared fields (`other_fr`) and for arbitrary unknown names, so
    /// callers can treat it as a plain "no such method".
    #[error("undefined method `{method}` for {receiver}")]
    MethodNotFound { receiver: String, method: String },

    /// A write received a value of the wrong shape.
    #[error("type mismatch for `{attribute}`: expected {expected}, found {found}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{model} record {id} not found")]
    RecordNotFound { model: String, id: u64 },

    /// The operation requires a record that has been saved at least once.
    #[error("{model} record has not been persisted")]
    NotPersisted { model: String },

    #[error("failed to load '{}': {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    pub(crate) fn method_not_found(receiver: &str, method: &str) -> Self {
        TranslateError::MethodNotFound {
            receiver: receiver.to_string(),
            method: method.to_string(),
        }
    }

    /// True for the "no such method" signal, whatever its origin.
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, TranslateError::MethodNotFound { .. })
    }
}

/// Result type for translated attribute operations
pub type Result<T> = std::result::Result<T, TranslateError>;

/// Short JSON type name used in `TypeMismatch` messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
