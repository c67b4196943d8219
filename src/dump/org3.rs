//! JSON Schema draft 3 ("org3") dumper

use serde_json::{Map, Value};

use crate::schema::constraints;
use crate::schema::options::{ALLOW_NIL, DEFAULT, DOC, FORMAT, REQUIRED, STRICT};
use crate::schema::{ArraySchema, LeafKind, LeafSchema, ObjectSchema, Options, Schema, SchemaNode};

/// Options consumed by the dumper's structure rather than by constraints
const STRUCTURAL_OPTIONS: [&str; 5] = [REQUIRED, DOC, ALLOW_NIL, STRICT, FORMAT];

/// Renders a schema tree as a JSON Schema draft 3 document.
///
/// Nodes documented with `doc: false` are left out; such a root dumps to
/// `None`.
pub struct Org3Dumper<'a> {
    schema: &'a Schema,
}

impl<'a> Org3Dumper<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn dump(&self) -> Option<Value> {
        dump_schema(self.schema).map(Value::Object)
    }
}

fn dump_schema(schema: &Schema) -> Option<Map<String, Value>> {
    if schema.options().is_nodoc() {
        return None;
    }
    let mut out = match schema {
        Schema::Leaf(leaf) => dump_leaf(leaf),
        Schema::Array(array) => dump_array(array),
        Schema::Object(object) => dump_object(object),
        Schema::Composite(composite) => dump_schema(composite.inner())?,
    };
    if let Some(doc) = schema.documentation() {
        if let Some(title) = doc.title {
            out.insert("title".into(), Value::String(title));
        }
        if let Some(description) = doc.description {
            out.insert("description".into(), Value::String(description));
        }
    }
    dump_options(&mut out, &schema.non_default_options());
    Some(out)
}

fn dump_options(out: &mut Map<String, Value>, options: &Options) {
    for (name, arg) in options {
        if STRUCTURAL_OPTIONS.contains(&name.as_str()) {
            continue;
        }
        if name == DEFAULT {
            out.insert("default".into(), arg.to_json());
            continue;
        }
        match constraints::lookup(name) {
            Some(validator) => out.extend(validator.dump_org3(arg)),
            None => tracing::warn!(option = %name, "option has no org3 representation"),
        }
    }
}

fn typed(type_name: &str) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), Value::String(type_name.to_string()));
    out
}

/// Draft 3 name of a registered format, `None` when it has none
fn org3_format(format: &str) -> Option<&str> {
    let name = match format {
        "email" => "email",
        "uri" => "uri",
        "regexp" => "regex",
        "datetime" => "date-time",
        "ipv4" => "ip-address",
        "ipv6" => "ipv6",
        "phone" => "phone",
        "hostname" => "host-name",
        "ip" => {
            tracing::warn!(format, "IP addresses of either version cannot be expressed in org3");
            return None;
        }
        other => other,
    };
    Some(name)
}

fn dump_leaf(leaf: &LeafSchema) -> Map<String, Value> {
    let type_name = match leaf.kind() {
        LeafKind::Any => "any",
        LeafKind::Null => "null",
        LeafKind::Boolean => "boolean",
        LeafKind::Integer => "integer",
        LeafKind::Float | LeafKind::Numeric => "number",
        _ => "string",
    };
    let mut out = typed(type_name);
    let kind_format: Option<&str> = leaf.kind().format_name();
    let format = kind_format.or_else(|| leaf.options().format());
    if let Some(format) = format.and_then(org3_format) {
        out.insert("format".into(), Value::String(format.to_string()));
    }
    out
}

fn dump_array(array: &ArraySchema) -> Map<String, Value> {
    let mut out = typed("array");
    if let Some(item) = array.item().and_then(dump_schema) {
        out.insert("items".into(), Value::Object(item));
    }
    let items = dump_list(array.items());
    if !items.is_empty() {
        out.insert("items".into(), Value::Array(items));
    }
    let extra_items = dump_list(array.extra_items());
    if !extra_items.is_empty() {
        out.insert("additionalItems".into(), Value::Array(extra_items));
    }
    out
}

fn dump_list(schemas: &[Schema]) -> Vec<Value> {
    schemas
        .iter()
        .filter_map(dump_schema)
        .map(Value::Object)
        .collect()
}

fn dump_object(object: &ObjectSchema) -> Map<String, Value> {
    let mut out = typed("object");
    let mut properties = Map::new();
    let mut pattern_properties = Map::new();
    let mut additional = Map::new();

    for (name, schema) in object.properties() {
        let Some(mut dumped) = dump_schema(schema) else {
            continue;
        };
        let options = schema.options();
        if options.required() && options.default_value().is_none() {
            dumped.insert("required".into(), Value::Bool(true));
            properties.insert(name.to_string(), Value::Object(dumped));
        } else {
            additional.insert(name.to_string(), Value::Object(dumped));
        }
    }
    for (regex, schema) in object.pattern_properties() {
        if let Some(mut dumped) = dump_schema(schema) {
            dumped.insert("required".into(), Value::Bool(true));
            pattern_properties.insert(regex.as_str().to_string(), Value::Object(dumped));
        }
    }
    if let Some(extra) = object.extra() {
        for (name, schema) in extra.properties() {
            if let Some(dumped) = dump_schema(schema) {
                additional.insert(name.to_string(), Value::Object(dumped));
            }
        }
        for (regex, schema) in extra.pattern_properties() {
            if let Some(dumped) = dump_schema(schema) {
                pattern_properties.insert(regex.as_str().to_string(), Value::Object(dumped));
            }
        }
    }

    if !properties.is_empty() {
        out.insert("properties".into(), Value::Object(properties));
    }
    if !pattern_properties.is_empty() {
        out.insert("patternProperties".into(), Value::Object(pattern_properties));
    }
    if !additional.is_empty() {
        out.insert("additionalProperties".into(), Value::Object(additional));
    } else if object.is_strict() {
        out.insert("additionalProperties".into(), Value::Bool(false));
    }
    out
}
