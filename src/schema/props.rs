//! Declarative JSON-shape schemas for component and trait properties.
//!
//! Registry entries declare the shape of the properties they accept; the
//! resolver validates an instance's (expression-evaluated) properties against
//! that shape before running any behavior. Validation collects *all*
//! violations with JSON-path locations rather than stopping at the first;
//! the editor surfaces the full list inline.
//!
//! Objects are open: keys not named in the schema are allowed and passed
//! through untouched.

use std::fmt;

use serde_json::Value;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A JSON value shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Accepts any value.
    Any,
    /// Accepts `true` / `false`.
    Bool,
    /// Accepts any JSON number.
    Number,
    /// Accepts a string.
    String,
    /// Accepts an array whose elements all match the inner schema.
    Array(Box<Schema>),
    /// Accepts an object with the given fields. Unknown keys are allowed.
    Object(Vec<Field>),
}

/// One named field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key name.
    pub name: String,
    /// Shape of the value under that key.
    pub schema: Schema,
    /// Whether the key must be present.
    pub required: bool,
}

impl Field {
    /// A field that must be present.
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
        }
    }

    /// A field that may be absent.
    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
        }
    }
}

/// A single schema violation, located by JSON path.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Path to the offending value, e.g. `$.container.id`.
    pub path: String,
    /// What the schema expected there.
    pub expected: String,
    /// What was found instead.
    pub found: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

/// Render a violation list as a single `; `-joined line for error messages.
pub fn violations_summary(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(SchemaViolation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Schema {
    /// Shorthand for building an object schema.
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Schema::Object(fields.into_iter().collect())
    }

    /// Shorthand for building an array schema.
    pub fn array(inner: Schema) -> Self {
        Schema::Array(Box::new(inner))
    }

    /// Validate a value, collecting every violation.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<SchemaViolation>> {
        let mut out = Vec::new();
        self.check("$", value, &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(out)
        }
    }

    fn check(&self, path: &str, value: &Value, out: &mut Vec<SchemaViolation>) {
        match self {
            Schema::Any => {}
            Schema::Bool => {
                if !value.is_boolean() {
                    out.push(violation(path, "boolean", value));
                }
            }
            Schema::Number => {
                if !value.is_number() {
                    out.push(violation(path, "number", value));
                }
            }
            Schema::String => {
                if !value.is_string() {
                    out.push(violation(path, "string", value));
                }
            }
            Schema::Array(inner) => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        inner.check(&format!("{path}[{i}]"), item, out);
                    }
                }
                None => out.push(violation(path, "array", value)),
            },
            Schema::Object(fields) => match value.as_object() {
                Some(map) => {
                    for field in fields {
                        let field_path = format!("{path}.{}", field.name);
                        match map.get(&field.name) {
                            Some(v) => field.schema.check(&field_path, v, out),
                            None if field.required => out.push(SchemaViolation {
                                path: field_path,
                                expected: "a value".into(),
                                found: "nothing".into(),
                            }),
                            None => {}
                        }
                    }
                }
                None => out.push(violation(path, "object", value)),
            },
        }
    }
}

fn violation(path: &str, expected: &str, found: &Value) -> SchemaViolation {
    SchemaViolation {
        path: path.to_owned(),
        expected: expected.to_owned(),
        found: kind_name(found).to_owned(),
    }
}

/// The JSON kind of a value, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot_schema() -> Schema {
        Schema::object([Field::required(
            "container",
            Schema::object([
                Field::required("id", Schema::String),
                Field::required("slot", Schema::String),
            ]),
        )])
    }

    // ── Scalars ──────────────────────────────────────────────────────

    #[test]
    fn any_accepts_everything() {
        for v in [json!(null), json!(1), json!("x"), json!([1]), json!({})] {
            assert!(Schema::Any.validate(&v).is_ok());
        }
    }

    #[test]
    fn string_accepts_string() {
        assert!(Schema::String.validate(&json!("hi")).is_ok());
    }

    #[test]
    fn string_rejects_number() {
        let err = Schema::String.validate(&json!(3)).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "$");
        assert_eq!(err[0].expected, "string");
        assert_eq!(err[0].found, "number");
    }

    #[test]
    fn bool_and_number() {
        assert!(Schema::Bool.validate(&json!(true)).is_ok());
        assert!(Schema::Bool.validate(&json!(0)).is_err());
        assert!(Schema::Number.validate(&json!(1.5)).is_ok());
        assert!(Schema::Number.validate(&json!("1.5")).is_err());
    }

    // ── Arrays ───────────────────────────────────────────────────────

    #[test]
    fn array_checks_each_element() {
        let schema = Schema::array(Schema::String);
        assert!(schema.validate(&json!(["a", "b"])).is_ok());
        let err = schema.validate(&json!(["a", 1, true])).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err[0].path, "$[1]");
        assert_eq!(err[1].path, "$[2]");
    }

    #[test]
    fn array_rejects_non_array() {
        assert!(Schema::array(Schema::Any).validate(&json!({})).is_err());
    }

    // ── Objects ──────────────────────────────────────────────────────

    #[test]
    fn object_missing_required_field() {
        let schema = Schema::object([Field::required("value", Schema::String)]);
        let err = schema.validate(&json!({})).unwrap_err();
        assert_eq!(err[0].path, "$.value");
        assert_eq!(err[0].found, "nothing");
    }

    #[test]
    fn object_optional_field_absent_ok() {
        let schema = Schema::object([Field::optional("value", Schema::String)]);
        assert!(schema.validate(&json!({})).is_ok());
    }

    #[test]
    fn object_optional_field_wrong_type() {
        let schema = Schema::object([Field::optional("value", Schema::String)]);
        assert!(schema.validate(&json!({ "value": 1 })).is_err());
    }

    #[test]
    fn object_unknown_keys_allowed() {
        let schema = Schema::object([Field::required("value", Schema::String)]);
        assert!(schema
            .validate(&json!({ "value": "x", "extra": 42 }))
            .is_ok());
    }

    #[test]
    fn nested_paths_in_violations() {
        let err = slot_schema()
            .validate(&json!({ "container": { "id": 1, "slot": "s" } }))
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "$.container.id");
    }

    #[test]
    fn collects_all_violations() {
        let err = slot_schema().validate(&json!({ "container": {} })).unwrap_err();
        // Both id and slot missing, both reported in one pass.
        assert_eq!(err.len(), 2);
    }

    // ── Summary formatting ───────────────────────────────────────────

    #[test]
    fn summary_joins_violations() {
        let err = slot_schema().validate(&json!({ "container": {} })).unwrap_err();
        let summary = violations_summary(&err);
        assert!(summary.contains("$.container.id"));
        assert!(summary.contains("; "));
    }
}
