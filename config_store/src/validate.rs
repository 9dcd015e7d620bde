use schemas::{FieldKind, FieldSpec, TypeDescriptor, is_missing};
use serde_json::{Map, Value};

use crate::{
    compose::SchemaView,
    error::{ConfigError, Result},
};

/// Joins a parent path and a key with a dot.
pub(crate) fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Describes a value's shape for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string '{s}'"),
        Value::Array(_) => "a list".into(),
        Value::Object(_) => "a mapping".into(),
    }
}

/// Checks every field of a composed tree, coercing values in place.
///
/// # Errors
/// `MissingRequiredValue` for the first field still holding the missing
/// marker, `TypeMismatch` for the first value of the wrong shape.
pub(crate) fn validate(tree: &mut Map<String, Value>, view: &SchemaView<'_>) -> Result<()> {
    validate_fields(tree, view.root(), "", view)
}

fn validate_fields(
    target: &mut Map<String, Value>,
    schema: &TypeDescriptor,
    prefix: &str,
    view: &SchemaView<'_>,
) -> Result<()> {
    for field in schema.fields() {
        let path = join(prefix, field.name);
        let value = target
            .entry(field.name)
            .or_insert_with(|| field.default_value());

        if is_missing(value) {
            return Err(ConfigError::MissingRequiredValue { path });
        }

        if field.kind == FieldKind::Node {
            let node_schema = view
                .node(&path)
                .ok_or_else(|| ConfigError::MissingRequiredValue { path: path.clone() })?;
            match value {
                Value::Object(node) => validate_fields(node, node_schema, &path, view)?,
                other => return Err(mismatch(field, other, path)),
            }
            continue;
        }

        *value = coerce(field, value, path)?;
    }

    Ok(())
}

fn coerce(field: &FieldSpec, value: &Value, path: String) -> Result<Value> {
    if value.is_null() {
        return if field.optional {
            Ok(Value::Null)
        } else {
            Err(mismatch(field, value, path))
        };
    }

    let coerced = match (&field.kind, value) {
        (FieldKind::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
        (FieldKind::Float, Value::Number(n)) => n.as_f64().map(Value::from),
        (FieldKind::Bool, Value::Bool(_)) => Some(value.clone()),
        (FieldKind::Str | FieldKind::Path, Value::String(_)) => Some(value.clone()),
        (FieldKind::Str | FieldKind::Path, Value::Number(n)) => Some(n.to_string().into()),
        (FieldKind::Str | FieldKind::Path, Value::Bool(b)) => Some(b.to_string().into()),
        (FieldKind::Enum(names), Value::String(s)) => names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(s))
            .map(|name| Value::from(*name)),
        _ => None,
    };

    coerced.ok_or_else(|| mismatch(field, value, path))
}

fn mismatch(field: &FieldSpec, value: &Value, path: String) -> ConfigError {
    ConfigError::TypeMismatch {
        path,
        expected: field.kind.describe(),
        found: describe(value),
    }
}
