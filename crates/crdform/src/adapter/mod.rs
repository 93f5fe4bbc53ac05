//! Generic adapters, instantiated per [`ResourceKind`].
//!
//! All three variants share the same root attributes; they differ in which
//! attributes are computed and in whether the cluster is contacted at all.

mod data_source;
mod manifest;
mod resource;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

pub use data_source::DataSourceAdapter;
pub use manifest::ManifestAdapter;
pub use resource::ResourceAdapter;

use crate::convert;
use crate::diag::Diagnostics;
use crate::kind::ResourceKind;
use crate::kind::Scope;
use crate::schema::Attribute;
use crate::schema::Schema;
use crate::schema::Validator;
use crate::validate::validate;

/// Attribute values of one object, keyed by snake_case attribute name.
pub type State = Map<String, Value>;

/// `Err` means the operation stopped and no state may be written.
pub type OperationResult = Result<State, Diagnostics>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Local rendering to YAML.
    Manifest,
    /// Live object managed through server-side apply.
    Resource,
    /// Live object read by identity.
    DataSource,
}

/// Root schema of `kind` for the given adapter variant.
pub fn schema_for(kind: &ResourceKind, variant: Variant) -> Schema {
    let mut attributes = Vec::new();

    match variant {
        Variant::Manifest => attributes.push(
            Attribute::string("yaml", "")
                .computed()
                .local()
                .describe("The generated manifest in YAML format."),
        ),
        Variant::Resource | Variant::DataSource => attributes.push(
            Attribute::string("id", "")
                .computed()
                .local()
                .describe("Identity of the object: namespace/name, or name for cluster-scoped kinds."),
        ),
    }

    if variant == Variant::Resource {
        attributes.push(
            Attribute::string("field_manager", "")
                .local()
                .describe("The field manager to use when applying this resource. Falls back to the provider default.")
                .validate(Validator::LengthAtLeast { min: 1 }),
        );
        attributes.push(
            Attribute::bool("force_conflicts", "")
                .local()
                .describe("Forcibly override any field manager conflicts when applying this resource. Falls back to the provider default."),
        );
    }

    let type_meta = |attribute: Attribute| match variant {
        Variant::DataSource => attribute.computed(),
        Variant::Manifest | Variant::Resource => attribute.optional_computed(),
    };
    attributes.push(
        type_meta(Attribute::string("api_version", "apiVersion"))
            .describe("The API group and version of the object. Always set to the kind's constant."),
    );
    attributes.push(
        type_meta(Attribute::string("kind", "kind"))
            .describe("Type of the object. Always set to the kind's constant."),
    );
    attributes.push(metadata_attribute(kind.scope, variant));

    attributes.extend(kind.body.iter().cloned().map(|attribute| match variant {
        Variant::DataSource => attribute.into_computed(),
        Variant::Manifest | Variant::Resource => attribute,
    }));

    let description = match variant {
        Variant::Manifest => format!("Creates a YAML manifest of a {}. {}", kind.kind, kind.description),
        Variant::Resource => format!("Manages a {} via server-side apply. {}", kind.kind, kind.description),
        Variant::DataSource => format!("Reads an existing {}. {}", kind.kind, kind.description),
    };

    Schema {
        description: description.trim_end().to_string(),
        attributes,
    }
}

fn metadata_attribute(scope: Scope, variant: Variant) -> Attribute {
    let mut attributes = vec![Attribute::string("name", "name")
        .required()
        .replace_on_change()
        .describe("Unique name of the object within its namespace, or cluster-wide for cluster-scoped kinds.")
        .validate(Validator::LengthBetween { min: 1, max: 253 })];

    if scope == Scope::Namespaced {
        attributes.push(
            Attribute::string("namespace", "namespace")
                .required()
                .replace_on_change()
                .describe("Namespace the object lives in.")
                .validate(Validator::LengthBetween { min: 1, max: 63 }),
        );
    }

    let labels = Attribute::string_map("labels", "labels")
        .describe("Map of string keys and values that can be used to organize and categorize objects.");
    let annotations = Attribute::string_map("annotations", "annotations")
        .describe("Unstructured key value map stored with the object that may be used to store arbitrary metadata.");
    match variant {
        Variant::DataSource => {
            attributes.push(labels.computed());
            attributes.push(annotations.computed());
        }
        Variant::Manifest | Variant::Resource => {
            attributes.push(labels);
            attributes.push(annotations);
        }
    }

    Attribute::object("metadata", "metadata", attributes)
        .required()
        .describe("Data that helps uniquely identify the object.")
}

/// Validate `config` and bring it into state shape with the kind's constant
/// `api_version` and `kind`, whatever the configuration said.
pub(crate) fn prepare(kind: &ResourceKind, schema: &Schema, config: &Value) -> OperationResult {
    let diagnostics = validate(schema, config);
    if diagnostics.has_error() {
        return Err(diagnostics);
    }

    let empty = Map::new();
    let config = config.as_object().unwrap_or(&empty);
    let mut state = convert::normalize(&schema.attributes, config);
    force_type_meta(kind, &mut state);
    Ok(state)
}

pub(crate) fn force_type_meta(kind: &ResourceKind, state: &mut State) {
    state.insert("api_version".to_string(), Value::String(kind.api_version()));
    state.insert("kind".to_string(), Value::String(kind.kind.to_string()));
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::schema::Presence;

    fn kind(scope: Scope) -> ResourceKind {
        ResourceKind {
            group: "example.com",
            version: "v1",
            kind: "Widget",
            plural: "widgets",
            scope,
            description: "",
            body: vec![Attribute::object(
                "spec",
                "spec",
                vec![Attribute::string("size", "size").required()],
            )],
        }
    }

    fn names(schema: &Schema) -> Vec<&'static str> {
        schema.attributes.iter().map(|a| a.name).collect()
    }

    #[test]
    fn variants_share_root_attributes() {
        let kind = kind(Scope::Namespaced);
        assert_eq!(
            names(&schema_for(&kind, Variant::Manifest)),
            vec!["yaml", "api_version", "kind", "metadata", "spec"]
        );
        assert_eq!(
            names(&schema_for(&kind, Variant::Resource)),
            vec!["id", "field_manager", "force_conflicts", "api_version", "kind", "metadata", "spec"]
        );
        assert_eq!(
            names(&schema_for(&kind, Variant::DataSource)),
            vec!["id", "api_version", "kind", "metadata", "spec"]
        );
    }

    #[test]
    fn cluster_scoped_metadata_has_no_namespace() {
        let schema = schema_for(&kind(Scope::Cluster), Variant::Resource);
        let metadata = schema.attribute("metadata").unwrap();
        let nested: Vec<_> = metadata
            .ty
            .object_attributes()
            .unwrap()
            .iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(nested, vec!["name", "labels", "annotations"]);
    }

    #[test]
    fn data_source_spec_is_read_only() {
        let schema = schema_for(&kind(Scope::Namespaced), Variant::DataSource);
        assert_eq!(schema.attribute("spec").unwrap().presence, Presence::Computed);
    }

    #[test]
    fn prepare_overwrites_type_meta() {
        let kind = kind(Scope::Namespaced);
        let schema = schema_for(&kind, Variant::Manifest);
        let config = json!({
            "api_version": "evil.example.com/v9",
            "kind": "Other",
            "metadata": {"name": "w", "namespace": "default"},
            "spec": {"size": "large"}
        });

        let state = prepare(&kind, &schema, &config).unwrap();

        assert_eq!(state["api_version"], json!("example.com/v1"));
        assert_eq!(state["kind"], json!("Widget"));
        assert_eq!(state["yaml"], Value::Null);
    }

    #[test]
    fn prepare_stops_on_validation_errors() {
        let kind = kind(Scope::Namespaced);
        let schema = schema_for(&kind, Variant::Manifest);

        let diagnostics = prepare(&kind, &schema, &json!({"metadata": {"name": "w"}, "spec": {}})).unwrap_err();

        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.path.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(paths, vec!["metadata.namespace", "spec.size"]);
    }
}
