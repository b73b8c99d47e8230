//! Resolution of raw configuration values against a [`Schema`].
//!
//! [`resolve`] walks a schema in declaration order, fills in defaults,
//! enforces types, cardinality bounds and exclusive groups, and runs the
//! declared validators. Errors are accumulated instead of short-circuiting,
//! so a single call reports every problem in the configuration tree at once.
//! Resolution is total: it never panics and never aborts early.

use std::fmt::{Display, Write};

use serde_json::{Map, Value};
use snafu::Snafu;

use crate::schema::{Field, FieldKind, Presence, Schema};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The dotted location of a field within a configuration tree.
///
/// List and block elements contribute their index as a segment, so the
/// secret source of the second volume is addressed as `volumes.1.secret`.
/// The empty root path displays as `<root>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// The empty path, addressing the root of the configuration.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Display) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// A single problem discovered while resolving raw input against a schema.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{path}: required field is not set"))]
    RequiredFieldMissing { path: FieldPath },

    #[snafu(display("{path}: expected {expected}, got {actual}"))]
    TypeMismatch {
        path: FieldPath,
        expected: String,
        actual: String,
    },

    #[snafu(display("{path}: {count} elements given, at most {max_items} allowed"))]
    TooManyItems {
        path: FieldPath,
        count: usize,
        max_items: usize,
    },

    #[snafu(display(
        "{path}: at most one {group} may be set, but [{set}] are all present",
        set = fields.join(", ")
    ))]
    MutuallyExclusive {
        path: FieldPath,
        group: String,
        fields: Vec<String>,
    },

    #[snafu(display("{path}: {reason}"))]
    ConstraintViolation { path: FieldPath, reason: String },
}

/// The outcome of resolving raw input against a schema.
///
/// Both parts are always produced: a normalized value covering everything
/// that resolved cleanly, and the complete list of errors found in one pass.
/// Callers decide whether a non-empty error list is fatal.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// The normalized configuration. Fields that failed to resolve are
    /// absent; unset optional fields without a default are absent as well.
    pub value: Value,

    /// Every error discovered during resolution, in field declaration order.
    pub errors: Vec<Error>,
}

impl Resolved {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves `raw` against `schema`, producing a normalized value and every
/// error found.
///
/// Keys present in `raw` that the schema does not declare are dropped from
/// the normalized output. Fields declared [`Presence::Computed`] are never
/// read from `raw`, even if supplied; their values belong to the remote
/// system.
pub fn resolve(schema: &Schema, raw: &Value) -> Resolved {
    let path = FieldPath::root();
    let mut errors = Vec::new();
    let value = match raw {
        Value::Object(entries) => Value::Object(resolve_object(schema, entries, &path, &mut errors)),
        other => {
            errors.push(Error::TypeMismatch {
                path,
                expected: "object".to_string(),
                actual: json_type_name(other).to_string(),
            });
            Value::Object(Map::new())
        }
    };
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "configuration failed to resolve cleanly");
    }
    Resolved { value, errors }
}

fn resolve_object(
    schema: &Schema,
    entries: &Map<String, Value>,
    path: &FieldPath,
    errors: &mut Vec<Error>,
) -> Map<String, Value> {
    let mut resolved = Map::new();

    for (name, field) in schema.fields() {
        let field_path = path.join(name);

        // Computed fields are owned by the remote system, user input for
        // them is ignored.
        let supplied = if field.presence.is_computed_only() {
            if entries.contains_key(name) {
                tracing::trace!(
                    field = %field_path,
                    presence = %field.presence,
                    "ignoring user-supplied value for system-populated field"
                );
            }
            None
        } else {
            entries.get(name)
        };

        let value = match supplied {
            Some(raw) => resolve_field(field, raw, &field_path, errors),
            None => match field.presence {
                Presence::Required => {
                    errors.push(Error::RequiredFieldMissing { path: field_path });
                    continue;
                }
                // Computed fields stay unset until the remote system fills
                // them in; defaults apply to user-settable fields only.
                Presence::Computed => None,
                Presence::Optional | Presence::OptionalComputed => field.default.clone(),
            },
        };

        if let Some(value) = value {
            if let Some(validator) = field.validator {
                if let Err(error) = validator(&value, &field_path) {
                    errors.push(error);
                }
            }
            resolved.insert(name.to_string(), value);
        }
    }

    for group in schema.exclusive_groups() {
        let present = group
            .members
            .iter()
            .filter(|member| resolved.contains_key(member.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if present.len() > 1 {
            errors.push(Error::MutuallyExclusive {
                path: path.clone(),
                group: group.name.clone(),
                fields: present,
            });
        }
    }

    resolved
}

/// Resolves one supplied field value, enforcing the cardinality bound before
/// descending into the value itself.
fn resolve_field(
    field: &Field,
    raw: &Value,
    path: &FieldPath,
    errors: &mut Vec<Error>,
) -> Option<Value> {
    if let Value::Array(items) = raw {
        if matches!(field.kind, FieldKind::List(_) | FieldKind::Block(_))
            && field.max_items > 0
            && items.len() > field.max_items
        {
            errors.push(Error::TooManyItems {
                path: path.clone(),
                count: items.len(),
                max_items: field.max_items,
            });
        }
    }
    resolve_value(&field.kind, raw, path, errors)
}

fn resolve_value(
    kind: &FieldKind,
    raw: &Value,
    path: &FieldPath,
    errors: &mut Vec<Error>,
) -> Option<Value> {
    match (kind, raw) {
        (FieldKind::Int, value) => match value.as_i64() {
            Some(n) => Some(Value::from(n)),
            None => {
                errors.push(type_mismatch(kind, raw, path));
                None
            }
        },
        (FieldKind::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
        (FieldKind::String, Value::String(s)) => Some(Value::String(s.clone())),
        (FieldKind::Map, Value::Object(entries)) => {
            let mut map = Map::new();
            for (key, value) in entries {
                match value {
                    Value::String(s) => {
                        map.insert(key.clone(), Value::String(s.clone()));
                    }
                    other => errors.push(Error::TypeMismatch {
                        path: path.join(key),
                        expected: "string".to_string(),
                        actual: json_type_name(other).to_string(),
                    }),
                }
            }
            Some(Value::Object(map))
        }
        (FieldKind::List(element), Value::Array(items)) => {
            let mut list = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if let Some(value) = resolve_value(element, item, &path.join(index), errors) {
                    list.push(value);
                }
            }
            Some(Value::Array(list))
        }
        (FieldKind::Block(child), Value::Array(items)) => {
            let mut blocks = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let element_path = path.join(index);
                match item {
                    Value::Object(entries) => {
                        blocks.push(Value::Object(resolve_object(
                            child,
                            entries,
                            &element_path,
                            errors,
                        )));
                    }
                    other => errors.push(Error::TypeMismatch {
                        path: element_path,
                        expected: "object".to_string(),
                        actual: json_type_name(other).to_string(),
                    }),
                }
            }
            Some(Value::Array(blocks))
        }
        (kind, other) => {
            errors.push(type_mismatch(kind, other, path));
            None
        }
    }
}

fn type_mismatch(kind: &FieldKind, actual: &Value, path: &FieldPath) -> Error {
    Error::TypeMismatch {
        path: path.clone(),
        expected: kind.to_string(),
        actual: json_type_name(actual).to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation;

    fn listener_schema() -> Schema {
        Schema::new()
            .field("name", Field::required(FieldKind::String))
            .field(
                "port",
                Field::optional(FieldKind::Int).with_default(8080),
            )
            .field("tags", Field::optional(FieldKind::Map))
            .field("node_ip", Field::computed(FieldKind::String))
    }

    #[test]
    fn fills_defaults_for_absent_optional_fields() {
        let resolved = resolve(&listener_schema(), &json!({ "name": "http" }));

        assert!(resolved.is_ok());
        assert_eq!(resolved.value, json!({ "name": "http", "port": 8080 }));
    }

    #[test]
    fn missing_required_field_is_reported_once_and_resolution_continues() {
        let resolved = resolve(&listener_schema(), &json!({ "port": 9000 }));

        assert_eq!(
            resolved.errors,
            vec![Error::RequiredFieldMissing {
                path: FieldPath::root().join("name"),
            }]
        );
        // The rest of the fields still resolved.
        assert_eq!(resolved.value, json!({ "port": 9000 }));
    }

    #[test]
    fn computed_fields_ignore_user_input() {
        let resolved = resolve(
            &listener_schema(),
            &json!({ "name": "http", "node_ip": "10.0.0.1" }),
        );

        assert!(resolved.is_ok());
        assert_eq!(resolved.value.get("node_ip"), None);
    }

    #[test]
    fn computed_fields_with_defaults_stay_unset() {
        // A default on a system-populated field must never leak into the
        // normalized output.
        let schema = Schema::new().field(
            "node_ip",
            Field::computed(FieldKind::String).with_default("0.0.0.0"),
        );
        let resolved = resolve(&schema, &json!({}));

        assert!(resolved.is_ok());
        assert_eq!(resolved.value.get("node_ip"), None);
    }

    #[test]
    fn undeclared_keys_are_dropped() {
        let resolved = resolve(
            &listener_schema(),
            &json!({ "name": "http", "nam": "typo" }),
        );

        assert!(resolved.is_ok());
        assert_eq!(resolved.value.get("nam"), None);
    }

    #[test]
    fn type_mismatches_accumulate_across_fields() {
        let resolved = resolve(
            &listener_schema(),
            &json!({ "name": 42, "port": "9000" }),
        );

        assert_eq!(
            resolved.errors,
            vec![
                Error::TypeMismatch {
                    path: FieldPath::root().join("name"),
                    expected: "string".to_string(),
                    actual: "number".to_string(),
                },
                Error::TypeMismatch {
                    path: FieldPath::root().join("port"),
                    expected: "integer".to_string(),
                    actual: "string".to_string(),
                },
            ]
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let schema = listener_schema();
        let raw = json!({ "port": -1, "tags": { "a": 1 } });

        assert_eq!(resolve(&schema, &raw), resolve(&schema, &raw));
    }

    #[test]
    fn nested_block_errors_carry_dotted_paths() {
        let schema = Schema::new().field(
            "listeners",
            Field::optional(FieldKind::Block(listener_schema())),
        );
        let resolved = resolve(
            &schema,
            &json!({ "listeners": [{ "name": "http" }, { "port": 1 }] }),
        );

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].to_string(),
            "listeners.1.name: required field is not set"
        );
    }

    #[test]
    fn max_items_violation_reports_count_and_bound() {
        let schema = Schema::new().field(
            "context",
            Field::optional(FieldKind::Block(listener_schema())).with_max_items(1),
        );
        let resolved = resolve(
            &schema,
            &json!({ "context": [{ "name": "a" }, { "name": "b" }] }),
        );

        assert_eq!(
            resolved.errors,
            vec![Error::TooManyItems {
                path: FieldPath::root().join("context"),
                count: 2,
                max_items: 1,
            }]
        );
    }

    #[test]
    fn scalar_list_elements_are_type_checked_individually() {
        let schema = Schema::new().field(
            "groups",
            Field::optional(FieldKind::List(Box::new(FieldKind::Int))),
        );
        let resolved = resolve(&schema, &json!({ "groups": [1, "two", 3] }));

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].to_string(),
            "groups.1: expected integer, got string"
        );
        // Valid elements survive.
        assert_eq!(resolved.value, json!({ "groups": [1, 3] }));
    }

    #[test]
    fn exclusive_group_rejects_two_present_members() {
        let schema = Schema::new()
            .field("file", Field::optional(FieldKind::String))
            .field("inline", Field::optional(FieldKind::String))
            .exclusive_group("content source", ["file", "inline"]);
        let resolved = resolve(&schema, &json!({ "file": "a", "inline": "b" }));

        assert_eq!(
            resolved.errors,
            vec![Error::MutuallyExclusive {
                path: FieldPath::root(),
                group: "content source".to_string(),
                fields: vec!["file".to_string(), "inline".to_string()],
            }]
        );
    }

    #[test]
    fn exclusive_group_allows_a_single_member() {
        let schema = Schema::new()
            .field("file", Field::optional(FieldKind::String))
            .field("inline", Field::optional(FieldKind::String))
            .exclusive_group("content source", ["file", "inline"]);
        let resolved = resolve(&schema, &json!({ "inline": "b" }));

        assert!(resolved.is_ok());
    }

    #[test]
    fn validators_run_on_resolved_values() {
        let schema = Schema::new().field(
            "replicas",
            Field::optional(FieldKind::Int).with_validator(validation::positive),
        );

        let resolved = resolve(&schema, &json!({ "replicas": 0 }));
        assert_eq!(
            resolved.errors,
            vec![Error::ConstraintViolation {
                path: FieldPath::root().join("replicas"),
                reason: "must be a positive integer, got 0".to_string(),
            }]
        );

        let resolved = resolve(&schema, &json!({ "replicas": 5 }));
        assert!(resolved.is_ok());
        assert_eq!(resolved.value, json!({ "replicas": 5 }));
    }

    #[test]
    fn non_object_input_is_a_type_mismatch_at_the_root() {
        let resolved = resolve(&listener_schema(), &json!([1, 2]));

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].to_string(),
            "<root>: expected object, got array"
        );
    }
}
