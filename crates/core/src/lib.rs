//! Core types for the Haystack server
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityId / Ref: identifiers of tagged entity records
//! - Value: tagged scalar value model (Marker, Number, Str, Ref, ...)
//! - Dict: immutable tag mapping, the shape of every entity record
//! - Table: rows-with-named-columns payload of every request and response
//! - TimeZone / ZonedDateTime: timezone registry and zoned timestamps
//! - HistoryItem / DateTimeRange: time-series samples and query ranges
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dict;
pub mod error;
pub mod history;
pub mod table;
pub mod time;
pub mod types;
pub mod value;

pub use dict::{Dict, Entity};
pub use error::{Error, Result};
pub use history::{DateTimeRange, HistoryItem};
pub use table::{Column, Row, Table, TableBuilder};
pub use time::{TimeZone, ZonedDateTime};
pub use types::{EntityId, Ref};
pub use value::{Number, Value};
