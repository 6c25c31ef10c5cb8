//! Bound variable values
//!
//! Values form a closed set of variants. Dotted-path lookups step through
//! [`Variable::Record`] fields; every other variant has no attributes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A value bound to a variable name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Variable {
    /// Result of any failed resolution; distinct from `Null`
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Variable>),
    Record(HashMap<String, Variable>),
}

impl Variable {
    /// Check if this is the resolution-failure sentinel
    pub fn is_undefined(&self) -> bool {
        matches!(self, Variable::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variable::Null)
    }

    /// Attribute step used by dotted-path resolution
    ///
    /// Only records expose fields; any other variant yields `None`.
    pub fn attr(&self, name: &str) -> Option<&Variable> {
        match self {
            Variable::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Build a record from `(field, value)` pairs
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Variable)>,
    {
        Variable::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Variable::Undefined => "undefined",
            Variable::Null => "null",
            Variable::Bool(_) => "bool",
            Variable::Int(_) => "int",
            Variable::Float(_) => "float",
            Variable::String(_) => "string",
            Variable::List(_) => "list",
            Variable::Record(_) => "record",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Undefined => write!(f, "undefined"),
            Variable::Null => write!(f, "null"),
            Variable::Bool(b) => write!(f, "{}", b),
            Variable::Int(i) => write!(f, "{}", i),
            Variable::Float(x) => write!(f, "{}", x),
            Variable::String(s) => write!(f, "{:?}", s),
            Variable::List(items) => {
                let strs: Vec<_> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", strs.join(", "))
            }
            Variable::Record(fields) => {
                let mut keys: Vec<_> = fields.keys().collect();
                keys.sort();
                let pairs: Vec<_> = keys
                    .into_iter()
                    .map(|k| format!("{} = {}", k, fields[k]))
                    .collect();
                write!(f, "({})", pairs.join(", "))
            }
        }
    }
}

impl From<bool> for Variable {
    fn from(b: bool) -> Self {
        Variable::Bool(b)
    }
}

impl From<i64> for Variable {
    fn from(i: i64) -> Self {
        Variable::Int(i)
    }
}

impl From<f64> for Variable {
    fn from(x: f64) -> Self {
        Variable::Float(x)
    }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self {
        Variable::String(s.to_string())
    }
}

impl From<String> for Variable {
    fn from(s: String) -> Self {
        Variable::String(s)
    }
}

/// Plain JSON maps onto values directly; objects become records
impl From<serde_json::Value> for Variable {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Variable::Null,
            Json::Bool(b) => Variable::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Variable::Int(i),
                None => Variable::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Variable::String(s),
            Json::Array(items) => Variable::List(items.into_iter().map(Variable::from).collect()),
            Json::Object(map) => {
                Variable::Record(map.into_iter().map(|(k, v)| (k, Variable::from(v))).collect())
            }
        }
    }
}
