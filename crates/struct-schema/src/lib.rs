#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # struct-schema
//!
//! Schema model, checks, and parse/serialize engine for JSON values.
//!
//! A [`Schema`] describes which JSON values are accepted and how they are
//! turned into output values and back. Other crates read schemas through
//! [`Schema::classify`] and the accessors, and keep their own per-node data
//! in namespaced [`metadata`].
//!
//! ## Example Usage
//!
//! ```rust
//! use struct_schema::Schema;
//! use serde_json::json;
//!
//! let film = Schema::object([
//!     ("title", Schema::string().min_length(1)),
//!     ("year", Schema::option(Schema::int())),
//! ]);
//!
//! assert!(film.accepts(&json!({"title": "Alien"})));
//! assert!(!film.accepts(&json!({"title": ""})));
//! ```

/// Refinements attached to base kinds.
pub mod checks;
/// Parse and serialize walks.
pub mod engine;
/// Parse and serialize errors.
pub mod error;
/// Namespaced per-node side-channel storage.
pub mod metadata;
/// Schema tree and builders.
pub mod model;
/// Error locations.
pub mod path;

pub use checks::{ArrayCheck, Check, CustomCheck, FloatCheck, IntCheck, StringCheck};
pub use error::{Error, ErrorCode, Operation};
pub use metadata::{Metadata, MetadataId};
pub use model::{
    DefaultValue, Deprecation, Field, Literal, ObjectSchema, Schema, SchemaKind, Transform,
    UnknownKeys,
};
pub use path::Path;

/// Crate-local result type for parse and serialize operations.
pub type Result<T> = std::result::Result<T, Error>;
