use std::sync::Arc;

use error_stack::Report;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use super::force_type_meta;
use super::prepare;
use super::schema_for;
use super::OperationResult;
use super::State;
use super::Variant;
use crate::cluster::ApplyOptions;
use crate::cluster::ClusterApi;
use crate::config::ResourceSettings;
use crate::convert;
use crate::diag::AttributePath;
use crate::diag::Diagnostic;
use crate::diag::Diagnostics;
use crate::error::AdapterError;
use crate::identity::Identity;
use crate::kind::ResourceKind;
use crate::schema::Attribute;
use crate::schema::AttrType;
use crate::schema::Schema;

/// Live adapter managing objects of one kind through server-side apply.
///
/// Holds the cluster handle and the provider's apply defaults, both fixed at
/// construction.
#[derive(Clone)]
pub struct ResourceAdapter {
    kind: Arc<ResourceKind>,
    schema: Schema,
    cluster: Arc<dyn ClusterApi>,
    defaults: ApplyOptions,
}

impl ResourceAdapter {
    pub fn new(kind: Arc<ResourceKind>, cluster: Arc<dyn ClusterApi>, defaults: ApplyOptions) -> Self {
        let schema = schema_for(&kind, Variant::Resource);
        Self {
            kind,
            schema,
            cluster,
            defaults,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub async fn create(&self, config: &Value) -> OperationResult {
        let state = prepare(&self.kind, &self.schema, config)?;
        let identity = Identity::from_metadata(self.kind.scope, &state)?;

        let state = self.apply(&identity, &state).await?;
        info!(%identity, "created");
        Ok(state)
    }

    /// Refresh state from the cluster. A missing object is an error, not a
    /// silent removal from state.
    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub async fn read(&self, prior: &State) -> OperationResult {
        let identity = Identity::from_metadata(self.kind.scope, prior)?;
        let object = self
            .cluster
            .get(&self.kind.api_resource(), &identity)
            .await?;
        self.state_from_object(&object, prior, &identity)
    }

    /// Apply `config` over an existing object. Name and namespace cannot
    /// change in place; such a change is refused so the caller can replace
    /// the object instead.
    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub async fn update(&self, prior: &State, config: &Value) -> OperationResult {
        let state = prepare(&self.kind, &self.schema, config)?;

        let replacements = self.plan_replacement(prior, &state);
        if !replacements.is_empty() {
            let mut diagnostics = Diagnostics::new();
            diagnostics.extend(replacements.into_iter().map(|path| {
                Diagnostic::error(
                    "Resource Replacement Required",
                    format!("Attribute {path} cannot be changed in place; the object has to be replaced."),
                )
                .at(path)
            }));
            return Err(diagnostics);
        }

        let identity = Identity::from_metadata(self.kind.scope, prior)?;
        let mut state = self.apply(&identity, &state).await?;
        if let Some(id) = prior.get("id").filter(|id| id.is_string()) {
            state.insert("id".to_string(), id.clone());
        }
        info!(%identity, "updated");
        Ok(state)
    }

    /// Delete the object. Dependents are left to the API server's garbage
    /// collector.
    #[tracing::instrument(skip_all, fields(kind = self.kind.kind))]
    pub async fn delete(&self, prior: &State) -> Result<(), Diagnostics> {
        let identity = Identity::from_metadata(self.kind.scope, prior)?;
        self.cluster
            .delete(&self.kind.api_resource(), &identity)
            .await?;
        info!(%identity, "deleted");
        Ok(())
    }

    /// Seed state from an import identifier; [`ResourceAdapter::read`] fills
    /// in the rest. Malformed identifiers are rejected without any remote
    /// call.
    pub fn import(&self, id: &str) -> OperationResult {
        let identity = Identity::parse(self.kind.scope, id)?;

        let mut state = convert::normalize(&self.schema.attributes, &Map::new());
        state.insert("id".to_string(), Value::String(identity.to_string()));
        state.insert("metadata".to_string(), identity.metadata());
        force_type_meta(&self.kind, &mut state);
        Ok(state)
    }

    /// Paths of replace-on-change attributes whose configured value differs
    /// from `prior`.
    pub fn plan_replacement(&self, prior: &State, planned: &State) -> Vec<AttributePath> {
        let mut paths = Vec::new();
        collect_replacements(
            &self.schema.attributes,
            prior,
            planned,
            &AttributePath::root(),
            &mut paths,
        );
        paths
    }

    async fn apply(&self, identity: &Identity, state: &State) -> OperationResult {
        let options = ResourceSettings::from_state(state).resolve(&self.defaults);
        let body = convert::to_wire(&self.schema.attributes, state)?;

        let object = self
            .cluster
            .apply(&self.kind.api_resource(), identity, &Value::Object(body), &options)
            .await?;
        self.state_from_object(&object, state, identity)
    }

    /// State for a server object, carrying over adapter-local settings from
    /// `carried`.
    fn state_from_object(&self, object: &Value, carried: &State, identity: &Identity) -> OperationResult {
        let object = object.as_object().ok_or_else(|| {
            Report::new(AdapterError::Unmarshal {
                what: format!("response for {identity}"),
            })
        })?;

        let mut state = convert::from_wire(&self.schema.attributes, object)?;
        for attribute in self.schema.attributes.iter().filter(|a| a.local) {
            if let Some(value) = carried.get(attribute.name) {
                state.insert(attribute.name.to_string(), value.clone());
            }
        }
        if !state.get("id").is_some_and(Value::is_string) {
            state.insert("id".to_string(), Value::String(identity.to_string()));
        }
        force_type_meta(&self.kind, &mut state);
        Ok(state)
    }
}

fn collect_replacements(
    attributes: &[Attribute],
    prior: &Map<String, Value>,
    planned: &Map<String, Value>,
    path: &AttributePath,
    paths: &mut Vec<AttributePath>,
) {
    for attribute in attributes {
        let before = prior.get(attribute.name).unwrap_or(&Value::Null);
        let after = planned.get(attribute.name).unwrap_or(&Value::Null);
        let attr_path = path.name(attribute.name);

        if attribute.replace_on_change && before != after {
            paths.push(attr_path);
            continue;
        }
        if let (AttrType::Object(nested), Value::Object(before), Value::Object(after)) =
            (&attribute.ty, before, after)
        {
            collect_replacements(nested, before, after, &attr_path, paths);
        }
    }
}

impl std::fmt::Debug for ResourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAdapter")
            .field("kind", &self.kind.kind)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
