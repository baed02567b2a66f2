//! Errors produced while parsing or serializing values

use crate::path::Path;
use std::fmt;
use thiserror::Error;

/// Which direction the failing operation was running in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Input JSON to output value
    Parsing,
    /// Output value back to JSON
    Serializing,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Parsing => f.write_str("parsing"),
            Operation::Serializing => f.write_str("serializing"),
        }
    }
}

/// Reason a value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidType { expected: String, received: String },
    MissingField,
    UnexpectedKey(String),
    InvalidLiteral { expected: String, received: String },
    InvalidTupleSize { expected: usize, received: usize },
    InvalidUnion(Vec<String>),
    CheckFailed(String),
    TransformFailed(String),
    MissingSerializer,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidType { expected, received }
            | ErrorCode::InvalidLiteral { expected, received } => {
                write!(f, "Expected {expected}, received {received}")
            }
            ErrorCode::MissingField => f.write_str("Missing required field"),
            ErrorCode::UnexpectedKey(key) => {
                write!(f, "Encountered disallowed unknown key \"{key}\"")
            }
            ErrorCode::InvalidTupleSize { expected, received } => {
                write!(f, "Expected Tuple with {expected} items, received {received}")
            }
            ErrorCode::InvalidUnion(reasons) => {
                write!(f, "Invalid union with following errors: {}", reasons.join("; "))
            }
            ErrorCode::CheckFailed(message) | ErrorCode::TransformFailed(message) => {
                f.write_str(message)
            }
            ErrorCode::MissingSerializer => f.write_str("The transform serializer is missing"),
        }
    }
}

/// A parse or serialize failure with the location of the offending value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed {operation} at {path}. Reason: {code}")]
pub struct Error {
    pub operation: Operation,
    pub code: ErrorCode,
    pub path: Path,
}

impl Error {
    /// Build an error located at the current value
    #[must_use]
    pub fn new(operation: Operation, code: ErrorCode) -> Self {
        Self {
            operation,
            code,
            path: Path::root(),
        }
    }

    /// Build a type mismatch error, describing the received JSON value
    #[must_use]
    pub fn invalid_type(
        operation: Operation,
        expected: impl Into<String>,
        received: &serde_json::Value,
    ) -> Self {
        Self::new(
            operation,
            ErrorCode::InvalidType {
                expected: expected.into(),
                received: describe_value(received),
            },
        )
    }

    /// Return the error with `segment` prepended to its location
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.prepend(segment);
        self
    }
}

/// Short human description of a JSON value used in error reasons
#[must_use]
pub fn describe_value(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
