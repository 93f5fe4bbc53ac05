use std::sync::Arc;

use error_stack::ResultExt;
use serde_json::Value;
use tracing::debug;

use super::prepare;
use super::schema_for;
use super::OperationResult;
use super::Variant;
use crate::convert::to_wire;
use crate::error::AdapterError;
use crate::kind::ResourceKind;
use crate::schema::Schema;

/// Render-only adapter: turns a configuration into YAML without contacting
/// the cluster.
#[derive(Debug, Clone)]
pub struct ManifestAdapter {
    kind: Arc<ResourceKind>,
    schema: Schema,
}

impl ManifestAdapter {
    pub fn new(kind: Arc<ResourceKind>) -> Self {
        let schema = schema_for(&kind, Variant::Manifest);
        Self { kind, schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn type_name(&self) -> String {
        self.kind.manifest_type_name()
    }

    /// Render `config` and return it as state with the `yaml` attribute set.
    ///
    /// Object keys are emitted in sorted order, so equal configurations give
    /// byte-identical YAML.
    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub fn read(&self, config: &Value) -> OperationResult {
        let mut state = prepare(&self.kind, &self.schema, config)?;

        let object = to_wire(&self.schema.attributes, &state)?;
        let yaml = serde_yaml::to_string(&object).change_context(AdapterError::Marshal {
            what: "manifest as YAML".to_string(),
        })?;
        debug!(bytes = yaml.len(), "rendered manifest");

        state.insert("yaml".to_string(), Value::String(yaml));
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::kind::Scope;
    use crate::schema::Attribute;

    fn adapter() -> ManifestAdapter {
        ManifestAdapter::new(Arc::new(ResourceKind {
            group: "example.com",
            version: "v1",
            kind: "Widget",
            plural: "widgets",
            scope: Scope::Cluster,
            description: "",
            body: vec![Attribute::object(
                "spec",
                "spec",
                vec![
                    Attribute::string("size_class", "sizeClass"),
                    Attribute::string_list("zones", "zones"),
                ],
            )],
        }))
    }

    #[test]
    fn renders_camel_case_yaml() {
        let state = adapter()
            .read(&json!({
                "metadata": {"name": "w", "labels": {"tier": "gold"}},
                "spec": {"size_class": "large", "zones": ["a", "b"]}
            }))
            .unwrap();

        assert_eq!(
            state["yaml"],
            json!("apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  labels:\n    tier: gold\n  name: w\nspec:\n  sizeClass: large\n  zones:\n  - a\n  - b\n")
        );
    }

    #[test]
    fn invalid_configuration_renders_nothing() {
        let diagnostics = adapter()
            .read(&json!({"metadata": {}, "spec": {"size_class": 3}}))
            .unwrap_err();

        assert_eq!(diagnostics.len(), 2);
    }
}
