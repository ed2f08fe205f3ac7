//! Error types for operation execution.
//!
//! All errors from operation execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Classified**: [`Error::status`] maps each variant to a transport status

use serde::{Deserialize, Serialize};

/// Operation execution errors.
///
/// # Categories
///
/// | Status | Variants | Description |
/// |--------|----------|-------------|
/// | Not Found | `UnknownEntity`, `UnknownWatch`, `UnknownOperation` | Target doesn't exist |
/// | Bad Request | `MalformedRequest`, `InvalidConfig` | Bad input |
/// | Unsupported | `UnsupportedWrite` | Backend can't do it |
/// | Internal | `Io`, `Serialization`, `Internal` | Infrastructure errors |
///
/// # Example
///
/// ```ignore
/// use haystackdb::{Error, Executor};
///
/// match executor.execute("read", &request) {
///     Ok(table) => { /* handle rows */ }
///     Err(Error::UnknownEntity { id }) => {
///         println!("No entity {}", id);
///     }
///     Err(e) => {
///         println!("Error: {}", e);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// Checked read did not resolve an id or filter
    #[error("unknown entity: {id}")]
    UnknownEntity { id: String },

    /// Watch does not exist, was closed, or expired
    #[error("unknown watch: {watch}")]
    UnknownWatch { watch: String },

    /// No operation with this name
    #[error("unknown operation: {op}")]
    UnknownOperation { op: String },

    // ==================== Validation Errors ====================
    /// Request missing a required field or carrying an invalid one
    #[error("malformed request: {reason}")]
    MalformedRequest { reason: String },

    /// Configuration could not be loaded
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    // ==================== Capability Errors ====================
    /// Backend cannot perform the write
    #[error("unsupported write: {reason}")]
    UnsupportedWrite { reason: String },

    // ==================== System Errors ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

/// Transport-neutral classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Target entity, watch or operation does not exist
    NotFound,
    /// Request is malformed
    BadRequest,
    /// Request is valid but the server cannot honor it
    Unsupported,
    /// Server-side failure
    Internal,
}

impl Error {
    /// Shorthand for [`Error::MalformedRequest`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Classification used by transports
    pub fn status(&self) -> Status {
        match self {
            Error::UnknownEntity { .. }
            | Error::UnknownWatch { .. }
            | Error::UnknownOperation { .. } => Status::NotFound,
            Error::MalformedRequest { .. } | Error::InvalidConfig { .. } => Status::BadRequest,
            Error::UnsupportedWrite { .. } => Status::Unsupported,
            Error::Io { .. } | Error::Serialization { .. } | Error::Internal { .. } => {
                Status::Internal
            }
        }
    }
}
