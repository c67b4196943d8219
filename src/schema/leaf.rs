//! Leaf schemas
//!
//! Scalar schemas the composite engine treats as opaque units. Each kind
//! accepts its canonical value as well as the textual form commonly found in
//! query strings and form data, so `"42"` sanitizes to `42` for an integer
//! schema. Canonical input is always accepted unchanged, which makes
//! sanitization a fixpoint.

use std::sync::OnceLock;

use regex::Regex;

use super::constraints;
use super::errors::{ValidationError, ValidationResult};
use super::formats;
use super::options::{Options, REQUIRED};
use super::validator::SchemaNode;
use crate::document::Document;

/// Supported scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Anything, passed through unchanged
    Any,
    /// `null`
    Null,
    /// Boolean
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Integer or float
    Numeric,
    /// String, optionally with a `format` option
    String,
    /// RFC 3339 date-time
    Datetime,
    /// IPv4 or IPv6 address
    IpAddr,
    /// IPv4 address
    Ipv4Addr,
    /// IPv6 address
    Ipv6Addr,
    /// URI
    Uri,
    /// E-mail address
    Email,
    /// Host name
    Hostname,
    /// Phone number
    PhoneNumber,
    /// Regular expression source
    Regexp,
}

impl LeafKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            LeafKind::Any => "any",
            LeafKind::Null => "null",
            LeafKind::Boolean => "boolean",
            LeafKind::Integer => "integer",
            LeafKind::Float => "float",
            LeafKind::Numeric => "numeric",
            LeafKind::String => "string",
            LeafKind::Datetime => "datetime",
            LeafKind::IpAddr => "ipaddr",
            LeafKind::Ipv4Addr => "ipv4_addr",
            LeafKind::Ipv6Addr => "ipv6_addr",
            LeafKind::Uri => "uri",
            LeafKind::Email => "email",
            LeafKind::Hostname => "hostname",
            LeafKind::PhoneNumber => "phone_number",
            LeafKind::Regexp => "regexp",
        }
    }

    /// Registry name of the format this kind is bound to, if any
    pub fn format_name(&self) -> Option<&'static str> {
        match self {
            LeafKind::Datetime => Some("datetime"),
            LeafKind::IpAddr => Some("ip"),
            LeafKind::Ipv4Addr => Some("ipv4"),
            LeafKind::Ipv6Addr => Some("ipv6"),
            LeafKind::Uri => Some("uri"),
            LeafKind::Email => Some("email"),
            LeafKind::Hostname => Some("hostname"),
            LeafKind::PhoneNumber => Some("phone"),
            LeafKind::Regexp => Some("regexp"),
            _ => None,
        }
    }
}

fn integer_regex() -> Option<&'static Regex> {
    static INTEGER: OnceLock<Option<Regex>> = OnceLock::new();
    INTEGER
        .get_or_init(|| Regex::new(r"^[-+]?[0-9]+$").ok())
        .as_ref()
}

/// Schema for a single scalar value.
#[derive(Debug, Clone)]
pub struct LeafSchema {
    kind: LeafKind,
    options: Options,
    sanitized: Option<Document>,
}

impl LeafSchema {
    /// Create a leaf schema; `options` are merged over the kind defaults.
    pub fn new(kind: LeafKind, options: Options) -> Self {
        Self {
            kind,
            options: options.merged_over(&Self::defaults()),
            sanitized: None,
        }
    }

    pub fn defaults() -> Options {
        Options::new().with(REQUIRED, true)
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Mutable access to the options, for further configuration.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn reset(&mut self) {
        self.sanitized = None;
    }

    fn mismatch(&self, doc: &Document) -> ValidationError {
        ValidationError::type_mismatch(self.kind.type_name(), doc)
    }

    fn parse_integer(&self, text: &str) -> Option<i64> {
        integer_regex()
            .filter(|re| re.is_match(text))
            .and_then(|_| text.trim_start_matches('+').parse().ok())
    }

    fn sanitize_integer(&self, doc: &Document) -> ValidationResult<Document> {
        match doc {
            Document::Integer(_) => Ok(doc.clone()),
            Document::String(text) => self
                .parse_integer(text)
                .map(Document::Integer)
                .ok_or_else(|| ValidationError::format("integer", format!("'{}' is not an integer", text))),
            _ => Err(self.mismatch(doc)),
        }
    }

    fn sanitize_float(&self, doc: &Document) -> ValidationResult<Document> {
        match doc {
            Document::Float(_) => Ok(doc.clone()),
            Document::Integer(i) => Ok(Document::Float(*i as f64)),
            Document::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Document::Float)
                .ok_or_else(|| ValidationError::format("float", format!("'{}' is not a number", text))),
            _ => Err(self.mismatch(doc)),
        }
    }

    fn sanitize_numeric(&self, doc: &Document) -> ValidationResult<Document> {
        match doc {
            Document::Integer(_) | Document::Float(_) => Ok(doc.clone()),
            Document::String(text) => match self.parse_integer(text) {
                Some(i) => Ok(Document::Integer(i)),
                None => self.sanitize_float(doc),
            },
            _ => Err(self.mismatch(doc)),
        }
    }

    fn sanitize_boolean(&self, doc: &Document) -> ValidationResult<Document> {
        match doc {
            Document::Bool(_) => Ok(doc.clone()),
            Document::String(text) if text == "true" => Ok(Document::Bool(true)),
            Document::String(text) if text == "false" => Ok(Document::Bool(false)),
            Document::String(text) => Err(ValidationError::format(
                "boolean",
                format!("'{}' is not a boolean", text),
            )),
            _ => Err(self.mismatch(doc)),
        }
    }

    fn sanitize_null(&self, doc: &Document) -> ValidationResult<Document> {
        match doc {
            Document::Null => Ok(Document::Null),
            Document::String(text) if text == "null" => Ok(Document::Null),
            _ => Err(self.mismatch(doc)),
        }
    }

    fn sanitize_string(&self, doc: &Document) -> ValidationResult<Document> {
        let text = match doc {
            Document::String(text) => text.clone(),
            Document::Integer(_) | Document::Float(_) | Document::Bool(_) => doc.to_json().to_string(),
            Document::DateTime(_) | Document::IpAddr(_) if self.formatted_value_matches(doc) => {
                return Ok(doc.clone())
            }
            _ => return Err(self.mismatch(doc)),
        };
        match self.options.format() {
            Some(format) => formats::validate_format(format, &text),
            None => Ok(Document::String(text)),
        }
    }

    /// Whether an already canonical value belongs to the declared `format`.
    fn formatted_value_matches(&self, doc: &Document) -> bool {
        match (self.options.format(), doc) {
            (Some("datetime"), Document::DateTime(_)) => true,
            (Some("ip"), Document::IpAddr(_)) => true,
            (Some("ipv4"), Document::IpAddr(addr)) => addr.is_ipv4(),
            (Some("ipv6"), Document::IpAddr(addr)) => addr.is_ipv6(),
            _ => false,
        }
    }

    fn sanitize_formatted(&self, format: &str, doc: &Document) -> ValidationResult<Document> {
        match (self.kind, doc) {
            (_, Document::String(text)) => formats::validate_format(format, text),
            (LeafKind::Datetime, Document::DateTime(_)) => Ok(doc.clone()),
            (LeafKind::IpAddr, Document::IpAddr(_)) => Ok(doc.clone()),
            (LeafKind::Ipv4Addr, Document::IpAddr(addr)) if addr.is_ipv4() => Ok(doc.clone()),
            (LeafKind::Ipv6Addr, Document::IpAddr(addr)) if addr.is_ipv6() => Ok(doc.clone()),
            _ => Err(self.mismatch(doc)),
        }
    }
}

impl SchemaNode for LeafSchema {
    fn options(&self) -> &Options {
        &self.options
    }

    fn default_options(&self) -> Options {
        Self::defaults()
    }

    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document> {
        if doc.is_null() && self.options.allow_nil() {
            return Ok(Document::Null);
        }
        match self.kind {
            LeafKind::Any => Ok(doc.clone()),
            LeafKind::Null => self.sanitize_null(doc),
            LeafKind::Boolean => self.sanitize_boolean(doc),
            LeafKind::Integer => self.sanitize_integer(doc),
            LeafKind::Float => self.sanitize_float(doc),
            LeafKind::Numeric => self.sanitize_numeric(doc),
            LeafKind::String => self.sanitize_string(doc),
            kind => match kind.format_name() {
                Some(format) => self.sanitize_formatted(format, doc),
                None => Err(self.mismatch(doc)),
            },
        }
    }

    fn validate_constraints(&self, value: &Document) -> ValidationResult<()> {
        if value.is_null() && self.options.allow_nil() {
            return Ok(());
        }
        constraints::validate_constraints(&self.options, value)
    }

    fn sanitized_slot(&self) -> &Option<Document> {
        &self.sanitized
    }

    fn sanitized_slot_mut(&mut self) -> &mut Option<Document> {
        &mut self.sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn leaf(kind: LeafKind) -> LeafSchema {
        LeafSchema::new(kind, Options::new())
    }

    #[test]
    fn test_integer_sanitizes_strings() {
        let mut s = leaf(LeafKind::Integer);
        assert_eq!(s.validate(&"42".into()).unwrap(), &Document::Integer(42));
        assert_eq!(s.validate(&"-7".into()).unwrap(), &Document::Integer(-7));
        assert_eq!(s.validate(&Document::Integer(3)).unwrap(), &Document::Integer(3));
        assert!(!s.is_valid(&"4.2".into()));
        assert!(!s.is_valid(&Document::Float(4.2)));
        assert!(!s.is_valid(&Document::from(json!({ "test": 42 }))));
    }

    #[test]
    fn test_integer_constraints_see_sanitized_value() {
        let mut s = LeafSchema::new(LeafKind::Integer, Options::new().with("greater_than", 0));
        assert!(s.is_valid(&"1".into()));
        assert!(!s.is_valid(&"0".into()));
    }

    #[test]
    fn test_boolean_schema_validate_format() {
        let cases = [
            (json!("42"), None),
            (json!({ "test": 42 }), None),
            (json!("true"), Some(true)),
            (json!("false"), Some(false)),
            (json!(true), Some(true)),
            (json!(false), Some(false)),
            (json!("nil"), None),
        ];
        for (input, expected) in cases {
            let mut s = leaf(LeafKind::Boolean);
            let doc = Document::from(input);
            assert!(s.sanitized_doc().is_none());
            match expected {
                Some(b) => {
                    assert_eq!(s.validate_format(&doc).unwrap(), Document::Bool(b));
                    assert!(s.is_valid(&doc));
                    assert_eq!(s.sanitized_doc(), Some(&Document::Bool(b)));
                }
                None => {
                    assert!(s.validate_format(&doc).is_err());
                    assert!(!s.is_valid(&doc));
                    assert!(s.sanitized_doc().is_none());
                }
            }
        }
    }

    #[test]
    fn test_boolean_equal_to() {
        let mut s_true = LeafSchema::new(LeafKind::Boolean, Options::new().with("equal_to", true));
        assert!(s_true.is_valid(&"true".into()));
        assert!(!s_true.is_valid(&"false".into()));
    }

    #[test]
    fn test_null_schema_validate_format() {
        let cases = [
            (json!("42"), false),
            (json!({ "test": 42 }), false),
            (json!("true"), false),
            (json!("nil"), false),
            (json!(null), true),
            (json!("null"), true),
        ];
        for (input, valid) in cases {
            let mut s = leaf(LeafKind::Null);
            assert_eq!(s.is_valid(&Document::from(input)), valid);
            if valid {
                assert_eq!(s.sanitized_doc(), Some(&Document::Null));
            }
        }
    }

    #[test]
    fn test_float_and_numeric() {
        let mut f = leaf(LeafKind::Float);
        assert_eq!(f.validate(&Document::Integer(2)).unwrap(), &Document::Float(2.0));
        assert_eq!(f.validate(&"2.5".into()).unwrap(), &Document::Float(2.5));
        assert!(!f.is_valid(&"abc".into()));

        let mut n = leaf(LeafKind::Numeric);
        assert_eq!(n.validate(&"2".into()).unwrap(), &Document::Integer(2));
        assert_eq!(n.validate(&"2.5".into()).unwrap(), &Document::Float(2.5));
    }

    #[test]
    fn test_datetime_creates_datetime_value() {
        let mut s = leaf(LeafKind::Datetime);
        assert!(s.sanitized_doc().is_none());
        assert!(s.is_valid(&"2013-12-01T00:00:00+00:00".into()));
        let expected = DateTime::parse_from_rfc3339("2013-12-01T00:00:00+00:00").unwrap();
        assert_eq!(s.sanitized_doc(), Some(&Document::DateTime(expected)));

        let again = s.sanitized_doc().cloned().unwrap();
        assert!(s.is_valid(&again));
    }

    #[test]
    fn test_string_with_format_option() {
        let mut s = LeafSchema::new(LeafKind::String, Options::new().with("format", "ipv4"));
        assert_eq!(
            s.validate(&"10.0.0.1".into()).unwrap(),
            &Document::IpAddr("10.0.0.1".parse().unwrap())
        );
        assert!(!s.is_valid(&"localhost".into()));
    }

    #[test]
    fn test_string_format_only_keeps_matching_canonical_values() {
        let at = Document::DateTime(DateTime::parse_from_rfc3339("2013-12-01T00:00:00+00:00").unwrap());
        let v4 = Document::IpAddr("10.0.0.1".parse().unwrap());
        let v6 = Document::IpAddr("::1".parse().unwrap());

        let mut email = LeafSchema::new(LeafKind::String, Options::new().with("format", "email"));
        assert!(!email.is_valid(&at));
        assert!(!email.is_valid(&v4));

        let mut datetime = LeafSchema::new(LeafKind::String, Options::new().with("format", "datetime"));
        assert!(datetime.is_valid(&at));
        assert!(!datetime.is_valid(&v4));

        let mut ipv4 = LeafSchema::new(LeafKind::String, Options::new().with("format", "ipv4"));
        assert!(ipv4.is_valid(&v4));
        assert!(!ipv4.is_valid(&v6));

        let mut ip = LeafSchema::new(LeafKind::String, Options::new().with("format", "ip"));
        assert!(ip.is_valid(&v4));
        assert!(ip.is_valid(&v6));
    }

    #[test]
    fn test_string_renders_scalars() {
        let mut s = leaf(LeafKind::String);
        assert_eq!(s.validate(&Document::Integer(42)).unwrap(), &Document::from("42"));
        assert!(!s.is_valid(&Document::Array(vec![])));
    }

    #[test]
    fn test_allow_nil() {
        let mut s = LeafSchema::new(
            LeafKind::Integer,
            Options::new().with("allow_nil", true).with("greater_than", 0),
        );
        assert!(s.is_valid(&Document::Null));
        assert_eq!(s.sanitized_doc(), Some(&Document::Null));
        assert!(!leaf(LeafKind::Integer).is_valid(&Document::Null));
    }

    #[test]
    fn test_failed_validation_clears_previous_result() {
        let mut s = leaf(LeafKind::Integer);
        assert!(s.is_valid(&"1".into()));
        assert!(s.sanitized_doc().is_some());
        assert!(!s.is_valid(&"x".into()));
        assert!(s.sanitized_doc().is_none());
    }
}
