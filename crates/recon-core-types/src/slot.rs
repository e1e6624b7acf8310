//! The "value or absent" sentinel
//!
//! JSON `null` is a real value. A field that does not exist at all is
//! represented by [`Slot::Absent`], so lookups, comparisons and rendering
//! share one representation for missing data.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A value that may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot {
    /// Nothing is stored at the location
    #[default]
    Absent,
    /// A value (possibly `null`) is stored at the location
    Present(Value),
}

impl Slot {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Absent => None,
        }
    }

    /// Canonical compact JSON for present values, `None` when absent.
    ///
    /// Map keys are serialized in sorted order and integral floats are written
    /// as integers, so two slots have the same canonical form exactly when
    /// they are [`same_value`].
    pub fn canonical(&self) -> Option<String> {
        self.as_value().map(canonical_json)
    }
}

/// Deep equality where numbers compare by numeric value, so `1` and `1.0`
/// are the same value.
pub fn same_value(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => {
            l == r || matches!((l.as_f64(), r.as_f64()), (Some(a), Some(b)) if a == b)
        }
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| same_value(a, b)))
        }
        _ => lhs == rhs,
    }
}

/// Compact JSON with integral floats written as integers.
pub fn canonical_json(value: &Value) -> String {
    if has_integral_float(value) {
        integral_floats_as_integers(value).to_string()
    } else {
        value.to_string()
    }
}

fn integral_float(number: &serde_json::Number) -> Option<i64> {
    let float = number.as_f64().filter(|_| number.is_f64())?;
    // 2^63 is exact in f64; anything at or past it does not fit an i64
    let in_range = float.fract() == 0.0
        && float >= -9_223_372_036_854_775_808.0
        && float < 9_223_372_036_854_775_808.0;
    in_range.then_some(float as i64)
}

fn has_integral_float(value: &Value) -> bool {
    match value {
        Value::Number(number) => integral_float(number).is_some(),
        Value::Array(items) => items.iter().any(has_integral_float),
        Value::Object(map) => map.values().any(has_integral_float),
        _ => false,
    }
}

fn integral_floats_as_integers(value: &Value) -> Value {
    match value {
        Value::Number(number) => integral_float(number).map_or_else(|| value.clone(), Value::from),
        Value::Array(items) => items.iter().map(integral_floats_as_integers).collect(),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), integral_floats_as_integers(item)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Present(value)
    }
}

impl From<Option<Value>> for Slot {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Slot::Absent, Slot::Present)
    }
}

impl From<Option<&Value>> for Slot {
    fn from(value: Option<&Value>) -> Self {
        value.cloned().into()
    }
}

/// Canonical compact JSON for present values, `undefined` when absent.
impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Present(value) => f.write_str(&canonical_json(value)),
            Slot::Absent => f.write_str("undefined"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Present(value) => value.serialize(serializer),
            Slot::Absent => serializer.serialize_none(),
        }
    }
}

/// Every deserialized slot is present; absent slots are expressed by omitting
/// the field (`#[serde(default)]`).
impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Slot::Present)
    }
}
