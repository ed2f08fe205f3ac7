//! Tag dictionaries
//!
//! A [`Dict`] maps tag names to values. Every entity record is a Dict that
//! carries its own `id` tag; request and response metadata are Dicts too.
//! Dicts are values: updating an entity means building a new Dict.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::types::EntityId;
use crate::value::{Number, Value};

/// An entity record
pub type Entity = Dict;

/// Immutable-by-convention mapping from tag name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dict(BTreeMap<String, Value>);

impl Dict {
    /// Empty dict
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Builder-style marker insert
    pub fn with_marker(self, name: impl Into<String>) -> Self {
        self.with(name, Value::Marker)
    }

    /// Insert or replace a tag
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove a tag
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Tag value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the tag is present
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Whether the tag is absent
    pub fn missing(&self, name: &str) -> bool {
        !self.has(name)
    }

    /// Str tag value
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Number tag value
    pub fn get_number(&self, name: &str) -> Option<&Number> {
        self.get(name).and_then(Value::as_number)
    }

    /// Id of the `id` tag, if it is a Ref
    pub fn id(&self) -> Option<&EntityId> {
        self.get("id")
            .and_then(Value::as_entity_ref)
            .map(|r| &r.id)
    }

    /// Display string: `dis` tag, else the ref's display, else the id
    pub fn dis(&self) -> String {
        if let Some(dis) = self.get_str("dis") {
            return dis.to_string();
        }
        match self.get("id").and_then(Value::as_entity_ref) {
            Some(r) => r.dis.clone().unwrap_or_else(|| r.id.to_string()),
            None => String::new(),
        }
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dict has no tags
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Tag names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy every tag of `other` into this dict, overwriting duplicates
    pub fn merge(mut self, other: &Dict) -> Self {
        for (name, value) in other.iter() {
            self.0.insert(name.clone(), value.clone());
        }
        self
    }
}

impl FromIterator<(String, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Dict {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsRef<Dict> for Dict {
    fn as_ref(&self) -> &Dict {
        self
    }
}
