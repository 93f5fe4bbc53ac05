use std::sync::Arc;

use error_stack::Report;
use serde_json::Value;
use tracing::debug;

use super::prepare;
use super::schema_for;
use super::OperationResult;
use super::Variant;
use crate::cluster::ClusterApi;
use crate::convert;
use crate::error::AdapterError;
use crate::identity::Identity;
use crate::kind::ResourceKind;
use crate::schema::Schema;

/// Read-only adapter: looks an existing object up by name and namespace.
#[derive(Clone)]
pub struct DataSourceAdapter {
    kind: Arc<ResourceKind>,
    schema: Schema,
    cluster: Arc<dyn ClusterApi>,
}

impl DataSourceAdapter {
    pub fn new(kind: Arc<ResourceKind>, cluster: Arc<dyn ClusterApi>) -> Self {
        let schema = schema_for(&kind, Variant::DataSource);
        Self {
            kind,
            schema,
            cluster,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub async fn read(&self, config: &Value) -> OperationResult {
        let query = prepare(&self.kind, &self.schema, config)?;
        let identity = Identity::from_metadata(self.kind.scope, &query)?;

        let object = self
            .cluster
            .get(&self.kind.api_resource(), &identity)
            .await?;
        let object = object.as_object().ok_or_else(|| {
            Report::new(AdapterError::Unmarshal {
                what: format!("response for {identity}"),
            })
        })?;
        debug!(%identity, "read");

        let mut state = convert::from_wire(&self.schema.attributes, object)?;
        state.insert("id".to_string(), Value::String(identity.to_string()));
        super::force_type_meta(&self.kind, &mut state);
        Ok(state)
    }
}

impl std::fmt::Debug for DataSourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceAdapter")
            .field("kind", &self.kind.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::adapter::ResourceAdapter;
    use crate::cluster::ApplyOptions;
    use crate::cluster::MemoryCluster;
    use crate::kind::Scope;
    use crate::schema::Attribute;

    fn kind() -> Arc<ResourceKind> {
        Arc::new(ResourceKind {
            group: "example.com",
            version: "v1",
            kind: "Widget",
            plural: "widgets",
            scope: Scope::Cluster,
            description: "",
            body: vec![Attribute::object(
                "spec",
                "spec",
                vec![Attribute::string("color", "color")],
            )],
        })
    }

    #[tokio::test]
    async fn reads_existing_object() {
        let cluster = Arc::new(MemoryCluster::new());
        ResourceAdapter::new(kind(), cluster.clone(), ApplyOptions::default())
            .create(&json!({
                "metadata": {"name": "w", "labels": {"team": "a"}},
                "spec": {"color": "red"}
            }))
            .await
            .unwrap();

        let state = DataSourceAdapter::new(kind(), cluster)
            .read(&json!({"metadata": {"name": "w"}}))
            .await
            .unwrap();

        assert_eq!(state["id"], json!("w"));
        assert_eq!(state["spec"], json!({"color": "red"}));
        assert_eq!(state["metadata"]["labels"], json!({"team": "a"}));
    }

    #[tokio::test]
    async fn missing_object_is_an_error() {
        let cluster = Arc::new(MemoryCluster::new());

        let diagnostics = DataSourceAdapter::new(kind(), cluster)
            .read(&json!({"metadata": {"name": "absent"}}))
            .await
            .unwrap_err();

        assert_eq!(
            diagnostics.first_error().map(|d| d.summary.as_str()),
            Some("Unable to GET resource")
        );
    }

    #[tokio::test]
    async fn configured_spec_is_rejected() {
        let cluster = Arc::new(MemoryCluster::new());

        let diagnostics = DataSourceAdapter::new(kind(), cluster.clone())
            .read(&json!({"metadata": {"name": "w"}, "spec": {"color": "red"}}))
            .await
            .unwrap_err();

        assert!(diagnostics.has_error());
        assert_eq!(cluster.request_count(), 0);
    }
}
