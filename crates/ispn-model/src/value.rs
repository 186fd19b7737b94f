//! Attribute values
//!
//! A defined attribute always carries a [`Value`]. Undefined attributes are
//! simply absent from a node's attribute map.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered attribute map, keyed by attribute name
pub type Attributes = IndexMap<String, Value>;

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    /// Text
    String,
    /// Boolean flag
    Bool,
    /// Signed integer
    Int,
    /// Ordered list of values
    List,
    /// Nested attribute map
    Object,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Bool => "BOOL",
            Self::Int => "INT",
            Self::List => "LIST",
            Self::Object => "OBJECT",
        };
        f.write_str(name)
    }
}

/// A defined attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Text
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// Nested map
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Type tag of this value
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::String(_) => ValueType::String,
            Self::List(_) => ValueType::List,
            Self::Object(_) => ValueType::Object,
        }
    }

    /// Boolean content, if this is a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is an integer
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// String content, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// List content, if this is a list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{key}\" => {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_tags() {
        assert_eq!(Value::from(true).value_type(), ValueType::Bool);
        assert_eq!(Value::from(3).value_type(), ValueType::Int);
        assert_eq!(Value::from("x").value_type(), ValueType::String);
        assert_eq!(Value::from(vec!["a", "b"]).value_type(), ValueType::List);
        assert_eq!(Value::Object(IndexMap::new()).value_type(), ValueType::Object);
    }

    #[test]
    fn accessors_only_match_own_type() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("true").as_bool(), None);
        assert_eq!(Value::from(42).as_int(), Some(42));
        assert_eq!(Value::from("SYNC").as_str(), Some("SYNC"));
    }

    #[test]
    fn json_untagged_decoding() {
        let value: Value = serde_json::from_str(r#"{"a": [1, true, "x"]}"#).unwrap();
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Int(1), Value::Bool(true), Value::from("x")])
        );
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Value::from("NONE").to_string(), "\"NONE\"");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
    }
}
