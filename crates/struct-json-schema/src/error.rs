//! Conversion errors for the schema to JSON Schema direction

use std::fmt;
use struct_schema::Path;
use thiserror::Error;

/// Prefix of every rendered conversion error
pub const TOOL_NAME: &str = "ReScript JSON Schema";

/// Why a schema has no JSON Schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The root schema is an Option
    UnsupportedRootOptional,
    /// An Option wraps another Option
    UnsupportedNestedOptional,
    /// An Option is used as an item; carries the container's type name
    UnsupportedOptionalItem(String),
    /// A variant with no JSON Schema form; carries the schema's type name
    UnsupportedVariant(String),
    /// The declared default failed to serialize; carries the inner message
    DefaultSerializationFailed(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::UnsupportedRootOptional => {
                f.write_str("Optional schema is not supported at root")
            }
            Reason::UnsupportedNestedOptional => {
                f.write_str("Optional schema is not supported inside the Option schema")
            }
            Reason::UnsupportedOptionalItem(container) => {
                write!(f, "Optional schema is not supported as {container} item")
            }
            Reason::UnsupportedVariant(name) => write!(f, "The {name} schema is not supported"),
            Reason::DefaultSerializationFailed(message) => {
                write!(f, "Couldn't destruct default value. Error: {message}")
            }
        }
    }
}

/// A failed conversion with the location of the offending node
///
/// The location starts empty at the failing node; every enclosing object
/// field or item index prepends itself as the error unwinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{TOOL_NAME}] Failed converting at {path}. Reason: {reason}")]
pub struct ConversionError {
    pub reason: Reason,
    pub path: Path,
}

impl ConversionError {
    /// Error located at the node being converted
    #[must_use]
    pub fn new(reason: Reason) -> Self {
        Self {
            reason,
            path: Path::root(),
        }
    }

    /// Prepend a location segment
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.prepend(segment);
        self
    }
}

impl From<Reason> for ConversionError {
    fn from(reason: Reason) -> Self {
        Self::new(reason)
    }
}

/// Crate-local result type for the forward conversion.
pub type Result<T> = std::result::Result<T, ConversionError>;
