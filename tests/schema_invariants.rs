//! Schema Invariant Tests
//!
//! Tests for validation invariants:
//! - Validation is deterministic
//! - Sanitization is a fixpoint
//! - Non in-place validation never mutates the input
//! - The sanitized slot is set iff the last validation succeeded
//! - Homogeneous arrays accept iff every element does
//! - Positional arrays never reject positions past their schemas

use docschema::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn doc(value: Value) -> Document {
    Document::from(value)
}

/// A schema mixing every object resolution path and both array modes.
fn order_schema() -> ObjectSchema {
    ObjectSchema::define(Options::new(), |s| {
        s.integer("id", Options::new().with("required", false))?;
        s.string("label", Options::new().with("default", "none"))?;
        s.array("lines", Options::new().with("required", false), |s| {
            s.object(Options::new(), |s| {
                s.numeric("qty", Options::new().with("greater_than_or_equal_to", 0))?;
                s.pattern("^x_", Schema::boolean(Options::new()))?;
                Ok(())
            })?;
            Ok(())
        })?;
        s.array("pair", Options::new().with("required", false), |s| {
            s.items(|s| {
                s.integer(Options::new())?;
                Ok(())
            })?;
            s.extra_items(|s| {
                s.string(Options::new())?;
                Ok(())
            })
        })?;
        s.pattern("^n_", Schema::numeric(Options::new()))?;
        s.extra(|s| {
            s.float("weight", Options::new())?;
            Ok(())
        })
    })
    .unwrap()
}

// =============================================================================
// Validation Determinism Tests
// =============================================================================

/// Same document validates the same way every time.
#[test]
fn test_validation_is_deterministic() {
    let mut s = order_schema();
    let d = doc(json!({ "id": "7", "lines": [{ "qty": "2", "x_gift": "true" }], "n_a": "1" }));
    let first = s.validate(&d).unwrap().clone();
    for _ in 0..100 {
        assert_eq!(s.validate(&d).unwrap(), &first);
    }
}

/// Invalid document fails consistently.
#[test]
fn test_invalid_document_fails_consistently() {
    let mut s = order_schema();
    let d = doc(json!({ "lines": [{ "qty": -1 }] }));
    for _ in 0..100 {
        let err = s.validate(&d).unwrap_err();
        assert_eq!(err.path_string(), "root.lines[0].qty");
    }
}

// =============================================================================
// Sanitized Slot Tests
// =============================================================================

/// The slot only holds the result of the last successful validation.
#[test]
fn test_slot_tracks_last_validation() {
    let mut s = order_schema();
    assert!(s.sanitized_doc().is_none());

    assert!(s.is_valid(&doc(json!({ "id": 1 }))));
    assert_eq!(s.sanitized_doc(), Some(&doc(json!({ "id": 1, "label": "none" }))));

    assert!(!s.is_valid(&doc(json!({ "id": "one" }))));
    assert!(s.sanitized_doc().is_none());

    assert!(s.is_valid(&doc(json!({ "id": 2 }))));
    assert_eq!(s.sanitized_doc(), Some(&doc(json!({ "id": 2, "label": "none" }))));
}

/// A non-canonical default is sanitized, so revalidation changes nothing.
#[test]
fn test_sanitized_default_is_a_fixpoint() {
    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.integer("n", Options::new().with("default", "42"))?;
        s.property("at", Schema::datetime(Options::new().with("default", "2013-01-02T03:04:05Z")))?;
        Ok(())
    })
    .unwrap();
    let first = s.validate(&doc(json!({}))).unwrap().clone();
    assert_eq!(first.as_object().unwrap()["n"], Document::Integer(42));
    assert_eq!(first.as_object().unwrap()["at"].type_name(), "datetime");

    let second = s.validate(&first).unwrap();
    assert_eq!(second, &first);
}

/// A default the property schema rejects fails at that key.
#[test]
fn test_invalid_default_is_reported_at_its_key() {
    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.integer("n", Options::new().with("default", "not a number"))?;
        Ok(())
    })
    .unwrap();
    let err = s.validate(&doc(json!({}))).unwrap_err();
    assert_eq!(err.path_string(), "root.n");
    assert!(s.sanitized_doc().is_none());
}

/// Divisibility by -1 holds at the integer bounds.
#[test]
fn test_divisible_by_minus_one_at_integer_bounds() {
    let mut s = Schema::integer(Options::new().with("divisible_by", -1));
    assert!(s.is_valid(&doc(json!("-9223372036854775808"))));
    assert!(s.is_valid(&doc(json!(i64::MIN))));
}

// =============================================================================
// Error Path Tests
// =============================================================================

#[test]
fn test_error_display_includes_path() {
    let mut s = order_schema();
    let err = s.validate(&doc(json!({ "pair": ["x"] }))).unwrap_err();
    assert_eq!(err.path_string(), "root.pair[0]");
    assert!(err.to_string().starts_with("root.pair[0]: "));
}

#[test]
fn test_umbrella_error_wraps_both_families() {
    let definition: docschema::Error = DefinitionError::EmptyDefinition.into();
    assert!(matches!(definition, docschema::Error::Definition(_)));

    let mut s = order_schema();
    let validation: docschema::Error = s.validate(&doc(json!(1))).unwrap_err().into();
    assert!(matches!(validation, docschema::Error::Validation(_)));
}

// =============================================================================
// Property Tests
// =============================================================================

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9_ ]{0,12}".prop_map(Value::String),
        "n_[a-z]{1,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(
        4,  // depth
        64, // desired size
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map(
                    prop_oneof!["[a-z]{1,6}", "n_[a-z]{1,3}", Just("id".to_string()), Just("lines".to_string())],
                    inner,
                    0..8
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

fn integer_like() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        any::<i32>().prop_map(|n| json!(n.to_string())),
        "[a-z]{1,3}".prop_map(Value::String),
    ]
}

proptest! {
    /// The input document is never modified, whether validation passes or fails.
    #[test]
    fn validation_never_mutates_input(value in json_value()) {
        let mut s = order_schema();
        let d = doc(value);
        let before = d.clone();
        let _ = s.validate(&d);
        prop_assert_eq!(d, before);
    }

    /// Validating a sanitized document yields the same sanitized document.
    #[test]
    fn sanitization_is_a_fixpoint(value in json_value()) {
        let mut s = order_schema();
        if let Ok(sanitized) = s.validate(&doc(value)) {
            let sanitized = sanitized.clone();
            let again = s.validate(&sanitized);
            prop_assert!(again.is_ok(), "revalidation failed: {:?}", again.err());
            prop_assert_eq!(s.sanitized_doc(), Some(&sanitized));
        }
    }

    /// Homogeneous arrays accept iff every element is accepted on its own.
    #[test]
    fn homogeneous_array_accepts_iff_every_element_does(
        values in prop::collection::vec(integer_like(), 0..10)
    ) {
        let mut array = ArraySchema::define(Options::new(), |s| {
            s.integer(Options::new().with("greater_than", 0))?;
            Ok(())
        })
        .unwrap();
        let mut item = Schema::integer(Options::new().with("greater_than", 0));

        let expected = values.iter().all(|v| item.is_valid(&doc(v.clone())));
        let result = array.validate(&doc(Value::Array(values.clone())));
        prop_assert_eq!(result.is_ok(), expected);
        if let Ok(Document::Array(sanitized)) = result {
            prop_assert_eq!(sanitized.len(), values.len());
        }
    }

    /// Positional arrays reject short documents and ignore trailing positions.
    #[test]
    fn positional_array_size_rules(n in 0usize..4, m in 0usize..4, len in 0usize..10) {
        let mut s = ArraySchema::define(Options::new(), |s| {
            s.items(|s| {
                for _ in 0..n {
                    s.integer(Options::new())?;
                }
                Ok(())
            })?;
            s.extra_items(|s| {
                for _ in 0..m {
                    s.integer(Options::new())?;
                }
                Ok(())
            })
        })
        .unwrap();
        let values: Vec<Value> = (0..len)
            .map(|i| if i < n + m { json!(i.to_string()) } else { json!("trailing") })
            .collect();
        let result = s.validate(&doc(Value::Array(values)));
        if len < n {
            prop_assert!(result.is_err());
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
