//! Error conversion from internal error types.
//!
//! This module provides conversions from core Haystack errors to
//! the executor's [`Error`] type.

use crate::Error;
use haystack_core::Error as CoreError;

/// Convert a core error to an executor Error.
///
/// Every core variant has a counterpart, so no detail is lost.
impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownEntity(id) => Error::UnknownEntity { id },
            CoreError::UnknownWatch(watch) => Error::UnknownWatch { watch },
            CoreError::MalformedRequest(reason) => Error::MalformedRequest { reason },
            CoreError::UnsupportedWrite(reason) => Error::UnsupportedWrite { reason },
            CoreError::InvalidConfig(reason) => Error::InvalidConfig { reason },
            CoreError::IoError(e) => Error::Io {
                reason: e.to_string(),
            },
            CoreError::SerializationError(reason) => Error::Serialization { reason },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Convert a core result to an executor Result.
pub fn convert_result<T>(result: haystack_core::Result<T>) -> crate::Result<T> {
    result.map_err(Error::from)
}
