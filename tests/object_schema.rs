//! Object Matching Engine Tests
//!
//! - Named, pattern and extra property resolution
//! - Strict mode
//! - Defaults and required properties
//! - Composite properties

use docschema::prelude::*;
use docschema::schema::ValidationErrorKind;
use regex::Regex;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn doc(value: Value) -> Document {
    Document::from(value)
}

/// Named "i" integer plus an extra "o" integer.
fn named_and_extra(strict: bool) -> ObjectSchema {
    ObjectSchema::define(Options::new().with("strict", strict), |s| {
        s.integer("i", Options::new())?;
        s.extra(|s| {
            s.integer("o", Options::new())?;
            Ok(())
        })
    })
    .unwrap()
}

// =============================================================================
// Property Resolution Tests
// =============================================================================

#[test]
fn test_unknown_key_passes_through_when_not_strict() {
    let mut s = named_and_extra(false);
    let sanitized = s.validate(&doc(json!({ "i": "5", "z": "x" }))).unwrap();
    assert_eq!(sanitized, &doc(json!({ "i": 5, "z": "x" })));
}

#[test]
fn test_unknown_key_rejected_when_strict() {
    let mut s = named_and_extra(true);
    let err = s.validate(&doc(json!({ "i": "5", "z": "x" }))).unwrap_err();
    assert_eq!(err.kind(), &ValidationErrorKind::UnknownKey("z".into()));
    assert!(s.sanitized_doc().is_none());
}

#[test]
fn test_extra_properties_are_optional_and_validated() {
    let mut s = named_and_extra(true);
    assert!(s.is_valid(&doc(json!({ "i": 1 }))));
    assert_eq!(
        s.validate(&doc(json!({ "i": 1, "o": "2" }))).unwrap(),
        &doc(json!({ "i": 1, "o": 2 }))
    );
    let err = s.validate(&doc(json!({ "i": 1, "o": "two" }))).unwrap_err();
    assert_eq!(err.path_string(), "root.o");
}

#[test]
fn test_pattern_properties() {
    let mut s = ObjectSchema::define(Options::new().with("strict", true), |s| {
        s.integer("i", Options::new())?;
        s.pattern("s.*t", Schema::string(Options::new()))?;
        s.property(Regex::new("^n_").unwrap(), Schema::numeric(Options::new()))?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        s.validate(&doc(json!({ "i": 1, "sat": 3, "n_x": "1.5" }))).unwrap(),
        &doc(json!({ "i": 1, "sat": "3", "n_x": 1.5 }))
    );
    assert!(s.is_valid(&doc(json!({ "i": 1 }))), "pattern properties are optional");
    assert!(!s.is_valid(&doc(json!({ "i": 1, "other": 1 }))));
}

#[test]
fn test_not_an_object() {
    let mut s = named_and_extra(false);
    for value in [json!([1]), json!(1), json!("i"), json!(null)] {
        let err = s.validate(&doc(value)).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::TypeMismatch { .. }));
    }
}

// =============================================================================
// Required And Default Tests
// =============================================================================

#[test]
fn test_missing_required_property() {
    let mut s = named_and_extra(false);
    let err = s.validate(&doc(json!({ "o": 1 }))).unwrap_err();
    assert_eq!(err.kind(), &ValidationErrorKind::MissingKey("i".into()));
    assert_eq!(err.code(), "SCHEMA_MISSING_KEY");
}

#[test]
fn test_default_and_optional_properties() {
    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.integer("required_i", Options::new())?;
        s.integer("default_i", Options::new().with("default", 42))?;
        s.integer("non_required_i", Options::new().with("required", false))?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        s.validate(&doc(json!({ "required_i": "1" }))).unwrap(),
        &doc(json!({ "required_i": 1, "default_i": 42 }))
    );
    assert_eq!(
        s.validate(&doc(json!({ "required_i": 1, "default_i": "7", "non_required_i": "8" })))
            .unwrap(),
        &doc(json!({ "required_i": 1, "default_i": 7, "non_required_i": 8 }))
    );
}

#[test]
fn test_nested_in_place_validation() {
    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.object("position", Options::new(), |s| {
            s.float("lat", Options::new())?;
            s.float("lng", Options::new())?;
            Ok(())
        })?;
        s.property("at", Schema::datetime(Options::new()))?;
        Ok(())
    })
    .unwrap();
    let mut d = doc(json!({
        "position": { "lat": "1.5", "lng": 2 },
        "at": "2013-01-02T03:04:05Z",
        "note": "kept"
    }));
    s.validate_in_place(&mut d).unwrap();

    let map = d.as_object().unwrap();
    assert_eq!(map["position"], doc(json!({ "lat": 1.5, "lng": 2.0 })));
    assert_eq!(map["at"].type_name(), "datetime");
    assert_eq!(map["note"], Document::from("kept"));
}

// =============================================================================
// Composite Property Tests
// =============================================================================

fn shapes() -> CompositeRegistry {
    let mut registry = CompositeRegistry::new();
    registry
        .define("point", |s| {
            s.object(Options::new(), |s| {
                s.float("x", Options::new())?;
                s.float("y", Options::new())?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    let point = registry.instantiate("point", Options::new()).unwrap();
    registry
        .define("circle", |s| {
            s.object(Options::new(), |s| {
                s.property("center", point)?;
                s.float("radius", Options::new().with("greater_than", 0.0))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    registry
}

#[test]
fn test_composite_property() {
    let registry = shapes();
    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.property("area", registry.instantiate("circle", Options::new())?)?;
        s.property("origin", registry.instantiate("point", Options::new().with("required", false))?)?;
        Ok(())
    })
    .unwrap();

    let sanitized = s
        .validate(&doc(json!({ "area": { "center": { "x": "1", "y": 2 }, "radius": "3.5" } })))
        .unwrap();
    assert_eq!(
        sanitized,
        &doc(json!({ "area": { "center": { "x": 1.0, "y": 2.0 }, "radius": 3.5 } }))
    );

    let err = s
        .validate(&doc(json!({ "area": { "center": { "x": 1, "y": 2 }, "radius": 0 } })))
        .unwrap_err();
    assert_eq!(err.path_string(), "root.area.radius");
}

#[test]
fn test_composite_instances_are_independent() {
    let registry = shapes();
    let mut s = ArraySchema::define(Options::new(), |s| {
        s.items(|s| {
            s.item(registry.instantiate("point", Options::new())?)?;
            s.item(registry.instantiate("point", Options::new())?)?;
            Ok(())
        })
    })
    .unwrap();
    assert!(s.is_valid(&doc(json!([{ "x": 1, "y": 1 }, { "x": 2, "y": 2 }]))));

    let first = s.items()[0].sanitized_doc().unwrap();
    let second = s.items()[1].sanitized_doc().unwrap();
    assert_ne!(first, second);
}

/// Packs four float channels into a named map.
fn rgba(value: Document) -> ValidationResult<Document> {
    let channels = value
        .as_array()
        .ok_or_else(|| ValidationError::type_mismatch("array", &value))?;
    let map = ["r", "g", "b", "a"]
        .iter()
        .zip(channels)
        .map(|(name, channel)| (name.to_string(), channel.clone()))
        .collect();
    Ok(Document::Object(map))
}

#[test]
fn test_doc_updated_with_sanitized_value_with_custom_type() {
    let mut registry = CompositeRegistry::new();
    let channels = ArraySchema::define(Options::new(), |s| {
        s.items(|s| {
            for _ in 0..4 {
                s.float(Options::new().with("greater_than_or_equal_to", 0.0))?;
            }
            Ok(())
        })
    })
    .unwrap();
    registry.register_with_sanitizer("rgba", channels, rgba).unwrap();

    let mut s = ObjectSchema::define(Options::new(), |s| {
        s.property("color", registry.instantiate("rgba", Options::new())?)?;
        Ok(())
    })
    .unwrap();
    let mut d = doc(json!({ "color": ["0.0", "0.5", "1.0", "0.2"] }));
    s.validate_in_place(&mut d).unwrap();
    assert_eq!(
        d,
        doc(json!({ "color": { "r": 0.0, "g": 0.5, "b": 1.0, "a": 0.2 } }))
    );
}
