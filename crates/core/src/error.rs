//! Error types for the Haystack server
//!
//! This module defines the error taxonomy shared by every layer below the
//! executor. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `UnknownEntity` | checked entity reads (by id or by filter) |
//! | `UnknownWatch` | checked watch lookups and closed/expired watch handles |
//! | `MalformedRequest` | request shape validation, filter/range parsing |
//! | `UnsupportedWrite` | backends that cannot perform a write |
//! | `InvalidConfig` | `haystack.toml` loading |

use std::io;
use thiserror::Error;

/// Result type alias for Haystack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Haystack server
#[derive(Debug, Error)]
pub enum Error {
    /// Checked read could not resolve an id or filter
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Checked watch lookup failed, or the watch was closed or expired
    #[error("Unknown watch: {0}")]
    UnknownWatch(String),

    /// Request is missing a required field or carries an invalid one
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Backend cannot perform the requested write
    #[error("Unsupported write: {0}")]
    UnsupportedWrite(String),

    /// I/O error (seed files, config files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration file is unreadable or holds an invalid setting
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Shorthand for [`Error::MalformedRequest`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedRequest(reason.into())
    }

    /// Shorthand for [`Error::UnknownEntity`]
    pub fn unknown_entity(id_or_filter: impl Into<String>) -> Self {
        Error::UnknownEntity(id_or_filter.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
