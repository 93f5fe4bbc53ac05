//! Schema-driven conversion between configuration/state trees (snake_case
//! attribute names) and Kubernetes objects (camelCase field names).

use error_stack::Report;
use serde_json::Map;
use serde_json::Value;

use crate::diag::AttributePath;
use crate::error::AdapterError;
use crate::error::AdapterResult;
use crate::schema::AttrType;
use crate::schema::Attribute;
use crate::schema::Presence;
use crate::validate::json_kind;

/// Build the wire object for `state`.
///
/// Unset attributes, computed-only attributes and adapter-local settings are
/// left out. Map keys are copied verbatim.
pub fn to_wire(attributes: &[Attribute], state: &Map<String, Value>) -> AdapterResult<Map<String, Value>> {
    object_to_wire(attributes, state, &AttributePath::root())
}

/// Build a state tree from a wire object.
///
/// Every declared attribute is present in the result, null when the object
/// does not carry it. Fields the schema does not declare are dropped.
pub fn from_wire(attributes: &[Attribute], object: &Map<String, Value>) -> AdapterResult<Map<String, Value>> {
    object_from_wire(attributes, object, &AttributePath::root())
}

/// Bring a validated configuration into state shape: every declared
/// attribute present, nulls where nothing was configured.
pub fn normalize(attributes: &[Attribute], config: &Map<String, Value>) -> Map<String, Value> {
    attributes
        .iter()
        .map(|attribute| {
            let value = config
                .get(attribute.name)
                .map_or(Value::Null, |v| normalize_value(&attribute.ty, v));
            (attribute.name.to_string(), value)
        })
        .collect()
}

fn normalize_value(ty: &AttrType, value: &Value) -> Value {
    match (ty, value) {
        (AttrType::Object(attributes), Value::Object(object)) => {
            Value::Object(normalize(attributes, object))
        }
        (AttrType::List(elem), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| normalize_value(elem, item)).collect())
        }
        (AttrType::Map(elem), Value::Object(entries)) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), normalize_value(elem, v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn object_to_wire(
    attributes: &[Attribute],
    state: &Map<String, Value>,
    path: &AttributePath,
) -> AdapterResult<Map<String, Value>> {
    let mut wire = Map::new();
    for attribute in attributes {
        if attribute.local || attribute.presence == Presence::Computed {
            continue;
        }
        let Some(value) = state.get(attribute.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let path = path.name(attribute.name);
        wire.insert(
            attribute.wire_name.to_string(),
            value_to_wire(&attribute.ty, value, &path)?,
        );
    }
    Ok(wire)
}

fn value_to_wire(ty: &AttrType, value: &Value, path: &AttributePath) -> AdapterResult<Value> {
    match (ty, value) {
        (AttrType::Object(attributes), Value::Object(object)) => {
            object_to_wire(attributes, object, path).map(Value::Object)
        }
        (AttrType::List(elem), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| value_to_wire(elem, item, &path.index(i)))
            .collect::<AdapterResult<Vec<_>>>()
            .map(Value::Array),
        (AttrType::Map(elem), Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), value_to_wire(elem, v, &path.key(k.as_str()))?)))
            .collect::<AdapterResult<Map<_, _>>>()
            .map(Value::Object),
        (ty, value) if scalar_matches(ty, value) => Ok(value.clone()),
        (ty, value) => Err(mismatch(
            AdapterError::Marshal {
                what: path.to_string(),
            },
            ty,
            value,
        )),
    }
}

fn object_from_wire(
    attributes: &[Attribute],
    object: &Map<String, Value>,
    path: &AttributePath,
) -> AdapterResult<Map<String, Value>> {
    let mut state = Map::new();
    for attribute in attributes {
        let value = match object.get(attribute.wire_name) {
            Some(value) if !attribute.local && !value.is_null() => {
                value_from_wire(&attribute.ty, value, &path.name(attribute.name))?
            }
            _ => Value::Null,
        };
        state.insert(attribute.name.to_string(), value);
    }
    Ok(state)
}

fn value_from_wire(ty: &AttrType, value: &Value, path: &AttributePath) -> AdapterResult<Value> {
    match (ty, value) {
        (AttrType::Object(attributes), Value::Object(object)) => {
            object_from_wire(attributes, object, path).map(Value::Object)
        }
        (AttrType::List(elem), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| value_from_wire(elem, item, &path.index(i)))
            .collect::<AdapterResult<Vec<_>>>()
            .map(Value::Array),
        (AttrType::Map(elem), Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), value_from_wire(elem, v, &path.key(k.as_str()))?)))
            .collect::<AdapterResult<Map<_, _>>>()
            .map(Value::Object),
        (ty, value) if scalar_matches(ty, value) => Ok(value.clone()),
        (ty, value) => Err(mismatch(
            AdapterError::Unmarshal {
                what: path.to_string(),
            },
            ty,
            value,
        )),
    }
}

fn scalar_matches(ty: &AttrType, value: &Value) -> bool {
    match (ty, value) {
        (_, Value::Null) | (AttrType::Dynamic, _) => true,
        (AttrType::String, Value::String(_)) | (AttrType::Bool, Value::Bool(_)) => true,
        (AttrType::Float64, Value::Number(_)) => true,
        (AttrType::Int64, Value::Number(n)) => n.is_i64(),
        _ => false,
    }
}

fn mismatch(context: AdapterError, expected: &AttrType, actual: &Value) -> Report<AdapterError> {
    Report::new(context).attach_printable(format!(
        "expected {expected}, got {}",
        json_kind(actual)
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("id", "").computed().local(),
            Attribute::string("field_manager", "").local(),
            Attribute::object(
                "metadata",
                "metadata",
                vec![
                    Attribute::string("name", "name").required(),
                    Attribute::string_map("labels", "labels"),
                ],
            ),
            Attribute::object(
                "spec",
                "spec",
                vec![
                    Attribute::int64("max_clusters", "maxClusters"),
                    Attribute::object_list(
                        "override_rules",
                        "overrideRules",
                        vec![
                            Attribute::string("operator", "operator"),
                            Attribute::string_map("value", "value"),
                            Attribute::dynamic("raw_value", "rawValue"),
                        ],
                    ),
                ],
            ),
        ]
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn to_wire_renames_and_drops_unset() {
        let state = as_map(json!({
            "id": "ns/example",
            "field_manager": "me",
            "metadata": {"name": "example", "labels": {"app.kubernetes.io/name": "web"}},
            "spec": {
                "max_clusters": 3,
                "override_rules": [{"operator": "overwrite", "value": {"team": "payments"}, "raw_value": null}]
            }
        }));

        let wire = to_wire(&attributes(), &state).unwrap();

        assert_eq!(
            Value::Object(wire),
            json!({
                "metadata": {"name": "example", "labels": {"app.kubernetes.io/name": "web"}},
                "spec": {
                    "maxClusters": 3,
                    "overrideRules": [{"operator": "overwrite", "value": {"team": "payments"}}]
                }
            })
        );
    }

    #[test]
    fn from_wire_fills_every_attribute_and_drops_unknown_fields() {
        let object = as_map(json!({
            "apiVersion": "policy.karmada.io/v1alpha1",
            "metadata": {"name": "example", "uid": "1234", "resourceVersion": "7"},
            "spec": {"overrideRules": [{"operator": "delete", "rawValue": {"a": [1, 2]}}]},
            "status": {"observedGeneration": 1}
        }));

        let state = from_wire(&attributes(), &object).unwrap();

        assert_eq!(
            Value::Object(state),
            json!({
                "id": null,
                "field_manager": null,
                "metadata": {"name": "example", "labels": null},
                "spec": {
                    "max_clusters": null,
                    "override_rules": [{"operator": "delete", "value": null, "raw_value": {"a": [1, 2]}}]
                }
            })
        );
    }

    #[test]
    fn from_wire_reports_type_mismatch_path() {
        let object = as_map(json!({"spec": {"maxClusters": "three"}}));

        let report = from_wire(&attributes(), &object).unwrap_err();

        assert_eq!(
            report.current_context().to_string(),
            "failed to unmarshal spec.max_clusters"
        );
    }

    #[test]
    fn normalize_matches_wire_round_trip() {
        let config = as_map(json!({
            "metadata": {"name": "example"},
            "spec": {"override_rules": [{"operator": "overwrite", "value": {"team": "payments"}}]}
        }));

        let normalized = normalize(&attributes(), &config);
        let round_tripped = from_wire(&attributes(), &to_wire(&attributes(), &normalized).unwrap()).unwrap();

        assert_eq!(normalized, round_tripped);
    }
}
