//! Error types for dyninv-inventory

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while decoding a source document
///
/// Absent keys are never errors; these only describe content that is present
/// but cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Payload is not valid JSON
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),

    /// A present key has the wrong structural shape
    #[error("malformed document at `{path}`: expected {expected}, found {found}")]
    Malformed {
        /// Key path of the offending value, e.g. `groups.web[1]`
        path: String,
        /// Shape that was expected at this path
        expected: &'static str,
        /// Shape that was found instead
        found: &'static str,
    },
}

impl InventoryError {
    /// Build a `Malformed` error for the value found at `path`
    pub(crate) fn malformed(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        InventoryError::Malformed {
            path: path.into(),
            expected,
            found: describe(found),
        }
    }

    /// Key path of the offending value, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            InventoryError::Malformed { path, .. } => Some(path),
            InventoryError::InvalidJson(_) => None,
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(s) if s.is_empty() => "an empty string",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
