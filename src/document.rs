//! Document value model
//!
//! A `Document` is the in-memory shape of both raw input documents and their
//! sanitized mirrors. Raw documents usually come from JSON and only use the
//! JSON-compatible variants; sanitized documents may additionally hold
//! canonical values such as date-times and IP addresses.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Key/value map used for object documents.
pub type Map = BTreeMap<String, Document>;

/// A nested document made of scalars, ordered sequences and key/value maps.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Absence of value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Date-time with offset (sanitized `datetime` values)
    DateTime(DateTime<FixedOffset>),
    /// IPv4 or IPv6 address (sanitized address values)
    IpAddr(IpAddr),
    /// Ordered sequence
    Array(Vec<Document>),
    /// Map keyed by strings
    Object(Map),
}

impl Document {
    /// Returns the kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Integer(_) => "integer",
            Document::Float(_) => "float",
            Document::String(_) => "string",
            Document::DateTime(_) => "datetime",
            Document::IpAddr(_) => "ipaddr",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Document::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Document::Integer(i) => Some(*i as f64),
            Document::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Document>> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns whether the value is an integer or a float.
    pub fn is_number(&self) -> bool {
        matches!(self, Document::Integer(_) | Document::Float(_))
    }

    /// Converts back to a JSON value.
    ///
    /// Date-times are rendered as RFC 3339 strings and addresses as their
    /// textual form. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Integer(i) => Value::from(*i),
            Document::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::String(s) => Value::String(s.clone()),
            Document::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Document::IpAddr(addr) => Value::String(addr.to_string()),
            Document::Array(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Document::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Compares two values numerically.
///
/// Integers are compared exactly, mixed integer/float pairs as floats and
/// date-times chronologically. Returns `None` for non-comparable pairs.
pub fn compare_numbers(a: &Document, b: &Document) -> Option<Ordering> {
    match (a, b) {
        (Document::Integer(x), Document::Integer(y)) => Some(x.cmp(y)),
        (Document::DateTime(x), Document::DateTime(y)) => Some(x.cmp(y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Document::Integer(i),
                None => Document::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Document::String(s),
            Value::Array(items) => Document::Array(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Document {
    fn from(value: &Value) -> Self {
        Document::from(value.clone())
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<i32> for Document {
    fn from(i: i32) -> Self {
        Document::Integer(i64::from(i))
    }
}

impl From<i64> for Document {
    fn from(i: i64) -> Self {
        Document::Integer(i)
    }
}

impl From<f64> for Document {
    fn from(f: f64) -> Self {
        Document::Float(f)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Document {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Document::DateTime(dt)
    }
}

impl From<IpAddr> for Document {
    fn from(addr: IpAddr) -> Self {
        Document::IpAddr(addr)
    }
}

impl<T: Into<Document>> From<Vec<T>> for Document {
    fn from(items: Vec<T>) -> Self {
        Document::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Document {
    fn from(map: Map) -> Self {
        Document::Object(map)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from)
    }
}
