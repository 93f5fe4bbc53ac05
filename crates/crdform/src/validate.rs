//! Plan-time validation of a configuration tree against a [`Schema`].
//!
//! The walk never stops early: every problem in the configuration is
//! reported in one pass, in attribute declaration order.

use serde_json::Map;
use serde_json::Value;

use crate::diag::AttributePath;
use crate::diag::Diagnostic;
use crate::diag::Diagnostics;
use crate::schema::AttrType;
use crate::schema::Attribute;
use crate::schema::FieldContext;
use crate::schema::Presence;
use crate::schema::Schema;

pub fn validate(schema: &Schema, config: &Value) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let root = AttributePath::root();
    match config {
        Value::Object(object) => validate_object(&schema.attributes, object, &root, &mut diagnostics),
        Value::Null => validate_object(&schema.attributes, &Map::new(), &root, &mut diagnostics),
        other => diagnostics.push(Diagnostic::error(
            "Invalid configuration",
            format!("The configuration must be an object, got: {}", json_kind(other)),
        )),
    }
    diagnostics
}

fn validate_object(
    attributes: &[Attribute],
    object: &Map<String, Value>,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) {
    for key in object.keys() {
        if !attributes.iter().any(|a| a.name == key) {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named {key:?} is not expected here."),
                )
                .at(path.name(key.as_str())),
            );
        }
    }

    for attribute in attributes {
        let attr_path = path.name(attribute.name);
        let value = object.get(attribute.name).unwrap_or(&Value::Null);

        if value.is_null() {
            if attribute.presence.is_required() {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument {attr_path} is required, but no definition was found."),
                    )
                    .at(attr_path.clone()),
                );
            }
        } else if attribute.presence == Presence::Computed {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Configuration for Read-Only Attribute",
                    format!(
                        "Cannot set value for this attribute as the provider has marked it as read-only. Remove the configuration line setting the value.\n\nRefer to the provider documentation or contact the provider developers for additional information about configurable and read-only attributes that are supported.\n\nAttribute: {attr_path}"
                    ),
                )
                .at(attr_path.clone()),
            );
            continue;
        } else {
            validate_value(&attribute.ty, value, &attr_path, diagnostics);
        }

        let ctx = FieldContext {
            path: &attr_path,
            name: attribute.name,
            value,
            siblings: object,
        };
        diagnostics.extend(attribute.validators.iter().filter_map(|v| v.check(&ctx)));
    }
}

fn validate_value(
    ty: &AttrType,
    value: &Value,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) {
    match (ty, value) {
        (_, Value::Null) | (AttrType::Dynamic, _) => {}
        (AttrType::String, Value::String(_)) | (AttrType::Bool, Value::Bool(_)) => {}
        (AttrType::Float64, Value::Number(_)) => {}
        (AttrType::Int64, Value::Number(n)) if n.is_i64() => {}
        (AttrType::List(elem), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_value(elem, item, &path.index(i), diagnostics);
            }
        }
        (AttrType::Map(elem), Value::Object(entries)) => {
            for (key, item) in entries {
                validate_value(elem, item, &path.key(key.as_str()), diagnostics);
            }
        }
        (AttrType::Object(attributes), Value::Object(object)) => {
            validate_object(attributes, object, path, diagnostics);
        }
        (expected, actual) => diagnostics.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute {path}: {expected} required, got {}.",
                    json_kind(actual)
                ),
            )
            .at(path.clone()),
        ),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::schema::Validator;

    fn schema() -> Schema {
        Schema {
            description: "test".to_string(),
            attributes: vec![
                Attribute::string("id", "").computed().local(),
                Attribute::object(
                    "metadata",
                    "metadata",
                    vec![
                        Attribute::string("name", "name").required(),
                        Attribute::string_map("labels", "labels"),
                    ],
                )
                .required(),
                Attribute::object(
                    "spec",
                    "spec",
                    vec![
                        Attribute::int64("max_clusters", "maxClusters")
                            .validate(Validator::Int64AtLeast { min: 1 }),
                        Attribute::string("scheduling_mode", "schedulingMode").validate(
                            Validator::OneOf {
                                values: &["Duplicate", "Divide"],
                            },
                        ),
                        Attribute::object_list(
                            "rules",
                            "rules",
                            vec![Attribute::string("operator", "operator").required()],
                        ),
                    ],
                ),
            ],
        }
    }

    fn paths(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| d.path.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    #[test]
    fn accepts_valid_configuration() {
        let config = json!({
            "metadata": {"name": "example", "labels": {"team": "payments"}},
            "spec": {"max_clusters": 3, "scheduling_mode": "Duplicate", "rules": [{"operator": "add"}]}
        });
        assert!(validate(&schema(), &config).is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let config = json!({
            "id": "ns/name",
            "metadata": {"labels": {"team": 1}},
            "spec": {
                "max_clusters": 0,
                "scheduling_mode": "Whatever",
                "rules": [{}],
                "extra": true
            }
        });

        let diagnostics = validate(&schema(), &config);

        assert_eq!(
            paths(&diagnostics),
            vec![
                "id",
                "metadata.name",
                r#"metadata.labels["team"]"#,
                "spec.extra",
                "spec.max_clusters",
                "spec.scheduling_mode",
                "spec.rules[0].operator",
            ]
        );
        assert!(diagnostics.has_error());
    }

    #[test]
    fn rejects_fractional_integers() {
        let config = json!({"metadata": {"name": "x"}, "spec": {"max_clusters": 1.5}});
        let diagnostics = validate(&schema(), &config);
        assert_eq!(paths(&diagnostics), vec!["spec.max_clusters"]);
        assert_eq!(diagnostics.iter().next().map(|d| d.summary.as_str()), Some("Incorrect attribute value type"));
    }

    #[test]
    fn rejects_non_object_configuration() {
        let diagnostics = validate(&schema(), &json!(["not", "an", "object"]));
        assert_eq!(diagnostics.len(), 1);
    }
}
