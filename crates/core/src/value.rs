//! Value types for the Haystack server
//!
//! This module defines:
//! - Value: the tagged scalar stored in entity tags and table cells
//! - Number: a float with an optional unit
//!
//! ## Type Rules
//!
//! - No implicit coercions: `Str("1") != Number(1)`
//! - Numbers compare only when their units agree (or one side is unitless)
//! - Float equality follows IEEE-754: `NaN != NaN`
//! - A missing cell is `None` at the table level, never a `Value`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::time::ZonedDateTime;
use crate::types::{EntityId, Ref};

/// Numeric value with an optional unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Number {
    /// Magnitude
    pub val: f64,
    /// Unit symbol, e.g. `°F` or `kW`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Number {
    /// Unitless number
    pub fn new(val: f64) -> Self {
        Self { val, unit: None }
    }

    /// Number with a unit
    pub fn with_unit(val: f64, unit: impl Into<String>) -> Self {
        Self {
            val,
            unit: Some(unit.into()),
        }
    }

    /// Truncate to an integer if the value is finite and integral
    pub fn as_int(&self) -> Option<i64> {
        if self.val.is_finite() && self.val.fract() == 0.0 {
            Some(self.val as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val)?;
        if let Some(unit) = &self.unit {
            f.write_str(unit)?;
        }
        Ok(())
    }
}

/// Tagged value stored in entity tags and table cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Presence-only tag (`site`, `point`, ...)
    Marker,
    /// Boolean value
    Bool(bool),
    /// Number with optional unit
    Number(Number),
    /// UTF-8 string
    Str(String),
    /// Reference to another entity
    Ref(Ref),
    /// URI
    Uri(String),
    /// Calendar date
    Date(NaiveDate),
    /// Zoned timestamp
    DateTime(ZonedDateTime),
    /// Ordered list of values
    List(Vec<Value>),
}

impl Value {
    /// Unitless number
    pub fn number(val: f64) -> Self {
        Value::Number(Number::new(val))
    }

    /// Number with a unit
    pub fn number_with_unit(val: f64, unit: impl Into<String>) -> Self {
        Value::Number(Number::with_unit(val, unit))
    }

    /// String value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Reference value
    pub fn reference(id: impl Into<EntityId>) -> Self {
        Value::Ref(Ref::new(id))
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Marker => "Marker",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::Str(_) => "Str",
            Value::Ref(_) => "Ref",
            Value::Uri(_) => "Uri",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::List(_) => "List",
        }
    }

    /// Check if this is a marker
    pub fn is_marker(&self) -> bool {
        matches!(self, Value::Marker)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as Number if this is a Number value
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Get as &str if this is a Str value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as Ref if this is a Ref value
    pub fn as_entity_ref(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Get as ZonedDateTime if this is a DateTime value
    pub fn as_datetime(&self) -> Option<&ZonedDateTime> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Order two values of the same kind
    ///
    /// Returns `None` for values of different kinds, for numbers with
    /// conflicting units, and for kinds with no natural order (markers,
    /// lists).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => match (&a.unit, &b.unit) {
                (Some(ua), Some(ub)) if ua != ub => None,
                _ => a.val.partial_cmp(&b.val),
            },
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Ref(a), Value::Ref(b)) => Some(a.id.cmp(&b.id)),
            (Value::Uri(a), Value::Uri(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Marker => f.write_str("M"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Ref(r) => write!(f, "{}", r),
            Value::Uri(u) => write!(f, "`{}`", u),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::number(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::number(i as f64)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::number(i as f64)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Ref(Ref::from(id))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<ZonedDateTime> for Value {
    fn from(dt: ZonedDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
