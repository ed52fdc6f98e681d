//! Error types for the patchwork engine.
//!
//! Data operations never fail: invalid payloads are dropped and no-ops are
//! reported through identity. Errors only arise while building a
//! [`Definition`](crate::Definition) or converting foreign JSON into records.

use crate::FieldName;
use thiserror::Error;

/// All possible errors from the patchwork engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Definition errors
    #[error("field '{second}' cannot be a key: '{first}' is already the key")]
    MultipleKeys { first: FieldName, second: FieldName },

    #[error("key field cannot be optional: {0}")]
    OptionalKey(FieldName),

    #[error("field declared more than once: {0}")]
    DuplicateField(FieldName),

    // Conversion errors
    #[error("expected an object, got {0}")]
    NotAnObject(&'static str),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
