//! Identifier types
//!
//! - EntityId: opaque unique identifier of one entity record
//! - Ref: an EntityId plus an optional display string, as stored in tags

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Unique identifier of an entity record
///
/// An EntityId is an opaque string. The `@` sigil used in the textual
/// encodings is not part of the id; [`EntityId::parse`] strips it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an EntityId without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an id from user input, stripping a leading `@`
    ///
    /// Valid characters are ASCII letters, digits and `_ : - . ~`.
    ///
    /// # Errors
    /// Returns `MalformedRequest` for an empty id or an invalid character.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.strip_prefix('@').unwrap_or(s);
        if raw.is_empty() {
            return Err(Error::malformed("empty id"));
        }
        if let Some(c) = raw.chars().find(|c| !Self::is_id_char(*c)) {
            return Err(Error::malformed(format!(
                "invalid char {:?} in id '{}'",
                c, raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Whether `c` may appear in an id
    pub fn is_id_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.' | '~')
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with its `@` sigil
    pub fn to_code(&self) -> String {
        format!("@{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference tag value: an id with an optional display string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ref {
    /// Referenced entity
    pub id: EntityId,
    /// Display name captured when the ref was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dis: Option<String>,
}

impl Ref {
    /// Ref without a display string
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            dis: None,
        }
    }

    /// Ref with a display string
    pub fn with_dis(id: impl Into<EntityId>, dis: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dis: Some(dis.into()),
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dis {
            Some(dis) => write!(f, "{} {:?}", self.id.to_code(), dis),
            None => f.write_str(&self.id.to_code()),
        }
    }
}

impl From<EntityId> for Ref {
    fn from(id: EntityId) -> Self {
        Self { id, dis: None }
    }
}
