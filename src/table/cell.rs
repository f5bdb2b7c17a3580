//! Dynamically typed table cells

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// One value in a [`Table`](super::Table)
///
/// JSON scalars map onto the matching variant; arrays and objects that were
/// not flattened are kept verbatim as [`Cell::Json`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    /// Missing value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer that fits in i64
    Int(i64),
    /// Any other number
    Float(f64),
    /// String
    Text(String),
    /// Point in time (produced by datetime coercion)
    Timestamp(DateTime<Utc>),
    /// Unflattened JSON (arrays, empty objects)
    Json(Value),
}

impl Cell {
    /// Whether this is [`Cell::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// String contents of a [`Cell::Text`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp of a [`Cell::Timestamp`]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Text(_) => "text",
            Cell::Timestamp(_) => "timestamp",
            Cell::Json(_) => "json",
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(s) => Cell::Text(s),
            other => Cell::Json(other),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Cell::Json(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_map_to_variants() {
        assert_eq!(Cell::from(json!(null)), Cell::Null);
        assert_eq!(Cell::from(json!(true)), Cell::Bool(true));
        assert_eq!(Cell::from(json!(42)), Cell::Int(42));
        assert_eq!(Cell::from(json!(4.25)), Cell::Float(4.25));
        assert_eq!(Cell::from(json!("abc")), Cell::from("abc"));
        assert_eq!(Cell::from(json!([1, 2])), Cell::Json(json!([1, 2])));
    }

    #[test]
    fn accessors_and_display() {
        assert_eq!(Cell::from("x").as_str(), Some("x"));
        assert_eq!(Cell::Int(3).as_str(), None);
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::Float(1.5).to_string(), "1.5");
        assert_eq!(Cell::Json(json!({"a": 1})).to_string(), r#"{"a":1}"#);
        assert_eq!(Cell::Text("t".into()).type_name(), "text");
    }
}
