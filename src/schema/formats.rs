//! Format validator registry
//!
//! String schemas delegate the parsing of formatted strings (`email`,
//! `datetime`, `ipv4`, ...) to a named format validator that returns the
//! canonical value. Like constraints, formats are kept in a process-wide
//! table populated with the built-ins on first use.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::DateTime;
use regex::Regex;

use super::errors::{ValidationError, ValidationResult};
use crate::document::Document;

/// Parses a raw string into its canonical value.
pub trait FormatValidator: Send + Sync {
    fn validate(&self, raw: &str) -> ValidationResult<Document>;
}

type Table = HashMap<String, Arc<dyn FormatValidator>>;

const EMAIL: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const URI: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]*$";
const HOSTNAME: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*$";
const PHONE: &str = r"^\+?[0-9][0-9 ().\-]{3,}[0-9]$";

fn registry() -> &'static RwLock<Table> {
    static REGISTRY: OnceLock<RwLock<Table>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(builtin_formats()))
}

/// Registers a format validator, replacing any previous one.
pub fn register_format(name: impl Into<String>, validator: impl FormatValidator + 'static) {
    let name = name.into();
    let mut table = registry().write().unwrap_or_else(PoisonError::into_inner);
    if table.insert(name.clone(), Arc::new(validator)).is_some() {
        tracing::warn!(format = %name, "replaced registered format validator");
    }
}

/// Looks up a format validator by name.
pub fn lookup_format(name: &str) -> Option<Arc<dyn FormatValidator>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Validates `raw` with the named format.
pub fn validate_format(name: &str, raw: &str) -> ValidationResult<Document> {
    let validator =
        lookup_format(name).ok_or_else(|| ValidationError::format(name, "unknown format"))?;
    validator.validate(raw)
}

fn builtin_formats() -> Table {
    let mut table: Table = HashMap::new();
    for (name, pattern) in [
        ("email", EMAIL),
        ("uri", URI),
        ("hostname", HOSTNAME),
        ("phone", PHONE),
    ] {
        match PatternFormat::new(name, pattern) {
            Ok(format) => {
                table.insert(name.to_string(), Arc::new(format));
            }
            Err(e) => tracing::error!(format = name, error = %e, "built-in format pattern does not compile"),
        }
    }
    table.insert("regexp".into(), Arc::new(RegexpFormat));
    table.insert("datetime".into(), Arc::new(DatetimeFormat));
    table.insert("ip".into(), Arc::new(IpFormat::Any));
    table.insert("ipv4".into(), Arc::new(IpFormat::V4));
    table.insert("ipv6".into(), Arc::new(IpFormat::V6));
    table
}

/// Format checked by a regular expression; the canonical value is the string.
pub struct PatternFormat {
    name: String,
    regex: Regex,
}

impl PatternFormat {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }
}

impl FormatValidator for PatternFormat {
    fn validate(&self, raw: &str) -> ValidationResult<Document> {
        if self.regex.is_match(raw) {
            Ok(Document::String(raw.to_string()))
        } else {
            Err(ValidationError::format(
                &self.name,
                format!("'{}' is not a valid {}", raw, self.name),
            ))
        }
    }
}

struct RegexpFormat;

impl FormatValidator for RegexpFormat {
    fn validate(&self, raw: &str) -> ValidationResult<Document> {
        Regex::new(raw)
            .map(|_| Document::String(raw.to_string()))
            .map_err(|e| ValidationError::format("regexp", e.to_string()))
    }
}

struct DatetimeFormat;

impl FormatValidator for DatetimeFormat {
    fn validate(&self, raw: &str) -> ValidationResult<Document> {
        DateTime::parse_from_rfc3339(raw)
            .map(Document::DateTime)
            .map_err(|e| ValidationError::format("datetime", format!("'{}': {}", raw, e)))
    }
}

enum IpFormat {
    Any,
    V4,
    V6,
}

impl FormatValidator for IpFormat {
    fn validate(&self, raw: &str) -> ValidationResult<Document> {
        let (name, parsed) = match self {
            IpFormat::Any => ("ip", raw.parse::<IpAddr>().ok()),
            IpFormat::V4 => ("ipv4", raw.parse::<std::net::Ipv4Addr>().ok().map(IpAddr::V4)),
            IpFormat::V6 => ("ipv6", raw.parse::<std::net::Ipv6Addr>().ok().map(IpAddr::V6)),
        };
        parsed
            .map(Document::IpAddr)
            .ok_or_else(|| ValidationError::format(name, format!("'{}' is not an {} address", raw, name)))
    }
}
