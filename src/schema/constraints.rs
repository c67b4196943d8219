//! Constraint validator registry
//!
//! Constraints run after the format phase, on the sanitized value, so they
//! always see canonical types. Each option whose name has a registered
//! validator is checked; other options (`required`, `default`, `doc`, ...)
//! are meta-options and are skipped here.
//!
//! The registry is process-wide, populated with the built-ins on first use
//! and extensible with `register`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use regex::Regex;
use serde_json::{Map as JsonMap, Value};

use super::errors::{ValidationError, ValidationResult};
use super::options::Options;
use crate::document::{compare_numbers, Document};

/// Stateless check of a sanitized value against an option argument.
pub trait ConstraintValidator: Send + Sync {
    /// Fails with a `ConstraintViolation` when `value` does not satisfy `arg`.
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()>;

    /// JSON Schema draft-3 keywords describing this constraint.
    fn dump_org3(&self, _arg: &Document) -> JsonMap<String, Value> {
        JsonMap::new()
    }
}

type Table = HashMap<String, Arc<dyn ConstraintValidator>>;

fn registry() -> &'static RwLock<Table> {
    static REGISTRY: OnceLock<RwLock<Table>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(builtin_validators()))
}

/// Registers a validator under an option name, replacing any previous one.
pub fn register(name: impl Into<String>, validator: impl ConstraintValidator + 'static) {
    let name = name.into();
    let mut table = registry().write().unwrap_or_else(PoisonError::into_inner);
    if table.insert(name.clone(), Arc::new(validator)).is_some() {
        tracing::warn!(constraint = %name, "replaced registered constraint validator");
    }
}

/// Looks up the validator registered for an option name.
pub fn lookup(name: &str) -> Option<Arc<dyn ConstraintValidator>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Runs every registered constraint named in `options` against `value`.
pub fn validate_constraints(options: &Options, value: &Document) -> ValidationResult<()> {
    for (name, arg) in options {
        if let Some(validator) = lookup(name) {
            validator.validate(value, arg)?;
        }
    }
    Ok(())
}

fn builtin_validators() -> Table {
    let mut table: Table = HashMap::new();
    let bounds = [
        NumericBound::new("greater_than", "greater than", Ordering::is_gt, "minimum", true),
        NumericBound::new("greater_than_or_equal_to", "greater than or equal to", Ordering::is_ge, "minimum", false),
        NumericBound::new("less_than", "less than", Ordering::is_lt, "maximum", true),
        NumericBound::new("less_than_or_equal_to", "less than or equal to", Ordering::is_le, "maximum", false),
    ];
    for bound in bounds {
        table.insert(bound.name.to_string(), Arc::new(bound));
    }
    table.insert("equal_to".into(), Arc::new(EqualTo));
    table.insert("divisible_by".into(), Arc::new(DivisibleBy("divisible_by")));
    table.insert("multiple_of".into(), Arc::new(DivisibleBy("multiple_of")));
    table.insert("in".into(), Arc::new(In));
    table.insert("min_length".into(), Arc::new(LengthBound::min()));
    table.insert("max_length".into(), Arc::new(LengthBound::max()));
    table.insert("match".into(), Arc::new(Match));
    table.insert("min_size".into(), Arc::new(SizeBound::min()));
    table.insert("max_size".into(), Arc::new(SizeBound::max()));
    table.insert("uniq".into(), Arc::new(Uniq));
    table
}

/// Value equality where integers and floats compare numerically.
fn values_equal(a: &Document, b: &Document) -> bool {
    if a.is_number() && b.is_number() {
        compare_numbers(a, b) == Some(Ordering::Equal)
    } else {
        a == b
    }
}

fn single(key: &str, value: Value) -> JsonMap<String, Value> {
    let mut map = JsonMap::new();
    map.insert(key.to_string(), value);
    map
}

fn usize_arg(name: &str, arg: &Document) -> ValidationResult<usize> {
    arg.as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ValidationError::constraint(name, format!("invalid argument {}", arg)))
}

struct NumericBound {
    name: &'static str,
    relation: &'static str,
    accepts: fn(Ordering) -> bool,
    keyword: &'static str,
    exclusive: bool,
}

impl NumericBound {
    fn new(
        name: &'static str,
        relation: &'static str,
        accepts: fn(Ordering) -> bool,
        keyword: &'static str,
        exclusive: bool,
    ) -> Self {
        Self {
            name,
            relation,
            accepts,
            keyword,
            exclusive,
        }
    }
}

impl ConstraintValidator for NumericBound {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        match compare_numbers(value, arg) {
            Some(ordering) if (self.accepts)(ordering) => Ok(()),
            Some(_) => Err(ValidationError::constraint(
                self.name,
                format!("{} is not {} {}", value, self.relation, arg),
            )),
            None => Err(ValidationError::constraint(
                self.name,
                format!("cannot compare {} with {}", value.type_name(), arg.type_name()),
            )),
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        let mut map = single(self.keyword, arg.to_json());
        if self.exclusive {
            let flag = if self.keyword == "minimum" {
                "exclusiveMinimum"
            } else {
                "exclusiveMaximum"
            };
            map.insert(flag.to_string(), Value::Bool(true));
        }
        map
    }
}

struct EqualTo;

impl ConstraintValidator for EqualTo {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        if values_equal(value, arg) {
            Ok(())
        } else {
            Err(ValidationError::constraint(
                "equal_to",
                format!("{} is not equal to {}", value, arg),
            ))
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single("enum", Value::Array(vec![arg.to_json()]))
    }
}

struct DivisibleBy(&'static str);

impl ConstraintValidator for DivisibleBy {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        let divisible = match (value, arg) {
            (_, Document::Integer(0)) => None,
            // i64::MIN % -1 overflows; the wrapped remainder is the exact 0.
            (Document::Integer(v), Document::Integer(d)) => Some(v.wrapping_rem(*d) == 0),
            _ => match (value.as_f64(), arg.as_f64()) {
                (Some(v), Some(d)) if d != 0.0 => Some((v / d).fract() == 0.0),
                _ => None,
            },
        };
        match divisible {
            Some(true) => Ok(()),
            Some(false) => Err(ValidationError::constraint(
                self.0,
                format!("{} is not divisible by {}", value, arg),
            )),
            None => Err(ValidationError::constraint(
                self.0,
                format!("cannot divide {} by {}", value, arg),
            )),
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single("divisibleBy", arg.to_json())
    }
}

struct In;

impl ConstraintValidator for In {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        let allowed = arg
            .as_array()
            .ok_or_else(|| ValidationError::constraint("in", "argument must be an array"))?;
        if allowed.iter().any(|candidate| values_equal(value, candidate)) {
            Ok(())
        } else {
            Err(ValidationError::constraint(
                "in",
                format!("{} is not one of {}", value, arg),
            ))
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single("enum", arg.to_json())
    }
}

struct LengthBound {
    name: &'static str,
    keyword: &'static str,
    minimum: bool,
}

impl LengthBound {
    fn min() -> Self {
        Self {
            name: "min_length",
            keyword: "minLength",
            minimum: true,
        }
    }

    fn max() -> Self {
        Self {
            name: "max_length",
            keyword: "maxLength",
            minimum: false,
        }
    }
}

impl ConstraintValidator for LengthBound {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        let text = value.as_str().ok_or_else(|| {
            ValidationError::constraint(self.name, format!("{} has no length", value.type_name()))
        })?;
        let bound = usize_arg(self.name, arg)?;
        let length = text.chars().count();
        let ok = if self.minimum { length >= bound } else { length <= bound };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::constraint(
                self.name,
                format!("length {} is out of bound {}", length, bound),
            ))
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single(self.keyword, arg.to_json())
    }
}

struct Match;

impl ConstraintValidator for Match {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        let text = value.as_str().ok_or_else(|| {
            ValidationError::constraint("match", format!("cannot match {}", value.type_name()))
        })?;
        let pattern = arg
            .as_str()
            .ok_or_else(|| ValidationError::constraint("match", "argument must be a pattern"))?;
        let regex = Regex::new(pattern).map_err(|e| {
            ValidationError::constraint("match", format!("invalid pattern '{}': {}", pattern, e))
        })?;
        if regex.is_match(text) {
            Ok(())
        } else {
            Err(ValidationError::constraint(
                "match",
                format!("{} does not match /{}/", value, pattern),
            ))
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single("pattern", arg.to_json())
    }
}

struct SizeBound {
    name: &'static str,
    keyword: &'static str,
    minimum: bool,
}

impl SizeBound {
    fn min() -> Self {
        Self {
            name: "min_size",
            keyword: "minItems",
            minimum: true,
        }
    }

    fn max() -> Self {
        Self {
            name: "max_size",
            keyword: "maxItems",
            minimum: false,
        }
    }
}

impl ConstraintValidator for SizeBound {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        let items = value.as_array().ok_or_else(|| {
            ValidationError::constraint(self.name, format!("{} has no size", value.type_name()))
        })?;
        let bound = usize_arg(self.name, arg)?;
        let ok = if self.minimum {
            items.len() >= bound
        } else {
            items.len() <= bound
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::constraint(
                self.name,
                format!("size {} is out of bound {}", items.len(), bound),
            ))
        }
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single(self.keyword, arg.to_json())
    }
}

struct Uniq;

impl ConstraintValidator for Uniq {
    fn validate(&self, value: &Document, arg: &Document) -> ValidationResult<()> {
        if arg.as_bool() != Some(true) {
            return Ok(());
        }
        let items = value.as_array().ok_or_else(|| {
            ValidationError::constraint("uniq", format!("{} is not a sequence", value.type_name()))
        })?;
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|seen| values_equal(seen, item)) {
                return Err(ValidationError::constraint(
                    "uniq",
                    format!("duplicated item {} at index {}", item, i),
                ));
            }
        }
        Ok(())
    }

    fn dump_org3(&self, arg: &Document) -> JsonMap<String, Value> {
        single("uniqueItems", arg.to_json())
    }
}
