//! Error types for SOS.

use crate::handle::Handle;
use crate::types::DataType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for SOS operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for SOS operations.
///
/// Every failure is reported at the call that caused it; nothing here is
/// retried on the caller's behalf except hash table growth, which is bounded.
#[derive(Debug, Error)]
pub enum Error {
    /// Text does not match the grammar of the target type.
    #[error("cannot parse {input:?} as {data_type}: {reason}")]
    Parse {
        data_type: DataType,
        input: String,
        reason: String,
    },
    /// Numeric text is well formed but does not fit the declared width.
    #[error("{input:?} is out of range for {data_type}")]
    Range { data_type: DataType, input: String },
    /// An operation was applied across incompatible value or key types.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    /// Attribute name is not part of the schema.
    #[error("attribute {attribute} not found in schema {schema}")]
    UnknownAttribute { schema: String, attribute: String },
    /// Index name is not part of the schema.
    #[error("index {index} not found in schema {schema}")]
    IndexNotFound { schema: String, index: String },
    /// The handle does not refer to a live object.
    #[error("object {handle} was already deleted")]
    AlreadyDeleted { handle: Handle },
    /// The store location is missing or not writable.
    #[error("storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },
    /// Persisted data could not be decoded.
    #[error("corrupted store image: {message}")]
    Corrupted { message: String },
    /// Allocation failed while growing a structure.
    #[error("resource exhausted: {message}")]
    ResourceExhausted { message: String },
    /// Invalid schema definition.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

impl Error {
    /// Creates a parse error.
    pub fn parse(data_type: DataType, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            data_type,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a range error.
    pub fn range(data_type: DataType, input: impl Into<String>) -> Self {
        Error::Range {
            data_type,
            input: input.into(),
        }
    }

    /// Creates a type mismatch error from anything displayable.
    pub fn type_mismatch(expected: impl core::fmt::Display, got: impl core::fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(schema: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::UnknownAttribute {
            schema: schema.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an index not found error.
    pub fn index_not_found(schema: impl Into<String>, index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            schema: schema.into(),
            index: index.into(),
        }
    }

    /// Creates a storage unavailable error.
    pub fn storage_unavailable(path: impl Into<PathBuf>, reason: impl core::fmt::Display) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Error::Corrupted {
            message: message.into(),
        }
    }

    /// Creates a resource exhaustion error.
    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Error::ResourceExhausted {
            message: message.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }
}
