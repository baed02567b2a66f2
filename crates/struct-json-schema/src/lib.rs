#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # struct-json-schema
//!
//! Conversion between [`struct_schema::Schema`] values and JSON Schema
//! draft-07 documents, in both directions.
//!
//! [`make`] turns a schema into a document and fails with a location-tagged
//! message when part of the schema has no JSON Schema form. [`to_schema`]
//! turns a document back into a schema that accepts the same values.
//! [`extend`], [`example`], [`description`] and [`deprecate`] attach raw
//! keywords to schema nodes for the forward direction.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use struct_json_schema::{make, to_schema};
//! use struct_schema::Schema;
//!
//! let schema = Schema::object([("field", Schema::string())]);
//! let document = make(&schema).unwrap();
//!
//! assert_eq!(
//!     document.clone().into_value(),
//!     json!({
//!         "$schema": "http://json-schema.org/draft-07/schema#",
//!         "type": "object",
//!         "properties": {"field": {"type": "string"}},
//!         "required": ["field"],
//!         "additionalProperties": true
//!     })
//! );
//!
//! let reversed = to_schema(&document).unwrap();
//! assert!(reversed.accepts(&json!({"field": "value"})));
//! assert!(!reversed.accepts(&json!({})));
//! ```

pub mod error;
pub mod extend;
pub mod forward;
pub mod fragment;
pub mod reverse;

pub use error::{ConversionError, Reason, TOOL_NAME};
pub use extend::{SCHEMA_EXTEND, deprecate, description, example, extend};
pub use forward::{ToJsonSchema, make, try_make};
pub use fragment::{Arrayable, Definition, FragmentError, JsonSchema, SCHEMA_DIALECT};
pub use reverse::{ReverseConfig, ReverseError, Reverser, Strictness, to_schema};
