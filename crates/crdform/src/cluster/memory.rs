use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use error_stack::Report;
use kube::discovery::ApiResource;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use super::ApiStatus;
use super::ApplyOptions;
use super::ClusterApi;
use crate::error::AdapterError;
use crate::error::AdapterResult;
use crate::error::ApiVerb;
use crate::identity::Identity;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    api_version: String,
    plural: String,
    namespace: Option<String>,
    name: String,
}

impl ObjectKey {
    fn new(resource: &ApiResource, identity: &Identity) -> Self {
        Self {
            api_version: resource.api_version.clone(),
            plural: resource.plural.clone(),
            namespace: identity.namespace.clone(),
            name: identity.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    object: Value,
    manager: String,
}

/// In-process [`ClusterApi`].
///
/// Apply replaces the stored object with the submitted one and fills in the
/// metadata an API server would own (`uid`, `resourceVersion`, `generation`)
/// plus an empty `status`. Field ownership is tracked per object rather than
/// per field: an apply from a different manager is a conflict unless forced.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    objects: Mutex<BTreeMap<ObjectKey, StoredObject>>,
    requests: AtomicUsize,
    next_uid: AtomicUsize,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls received so far, successful or not.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stored object, if any, as the server would return it.
    pub fn object(&self, resource: &ApiResource, identity: &Identity) -> Option<Value> {
        self.lock()
            .get(&ObjectKey::new(resource, identity))
            .map(|stored| stored.object.clone())
    }

    /// Field manager that last applied the object.
    pub fn manager(&self, resource: &ApiResource, identity: &Identity) -> Option<String> {
        self.lock()
            .get(&ObjectKey::new(resource, identity))
            .map(|stored| stored.manager.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ObjectKey, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn failure(verb: ApiVerb, identity: &Identity, status: ApiStatus) -> Report<AdapterError> {
        Report::new(status).change_context(AdapterError::Api {
            verb,
            target: identity.to_string(),
        })
    }

    fn check_type_meta(resource: &ApiResource, body: &Map<String, Value>) -> Result<(), ApiStatus> {
        let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default();
        if field("apiVersion") != resource.api_version || field("kind") != resource.kind {
            return Err(ApiStatus::invalid(format!(
                "apiVersion/kind {}/{} does not match {}/{}",
                field("apiVersion"),
                field("kind"),
                resource.api_version,
                resource.kind
            )));
        }
        Ok(())
    }
}

/// Everything in an object but `metadata` and the server-owned `status`; a
/// change here bumps `generation`.
fn desired_state(object: &Map<String, Value>) -> Vec<(&String, &Value)> {
    object
        .iter()
        .filter(|(key, _)| key.as_str() != "metadata" && key.as_str() != "status")
        .collect()
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn get(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<Value> {
        self.record_request();
        debug!(%identity, kind = %resource.kind, "memory GET");
        self.object(resource, identity).ok_or_else(|| {
            Self::failure(
                ApiVerb::Get,
                identity,
                ApiStatus::not_found(resource, &identity.name),
            )
        })
    }

    async fn apply(
        &self,
        resource: &ApiResource,
        identity: &Identity,
        body: &Value,
        options: &ApplyOptions,
    ) -> AdapterResult<Value> {
        self.record_request();
        debug!(%identity, kind = %resource.kind, field_manager = %options.field_manager, "memory PATCH");

        let fail = |status| Self::failure(ApiVerb::Patch, identity, status);
        let Some(body) = body.as_object() else {
            return Err(fail(ApiStatus::invalid("apply body must be an object")));
        };
        Self::check_type_meta(resource, body).map_err(fail)?;

        let key = ObjectKey::new(resource, identity);
        let mut objects = self.lock();
        let previous = objects.get(&key);

        if let Some(previous) = previous {
            if previous.manager != options.field_manager && !options.force_conflicts {
                return Err(fail(ApiStatus::conflict(&previous.manager, ".spec")));
            }
        }

        let previous_metadata = previous
            .and_then(|p| p.object.get("metadata"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let previous_generation = previous_metadata
            .get("generation")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let desired_changed = previous.map_or(true, |p| {
            p.object.as_object().map(desired_state) != Some(desired_state(body))
        });
        let resource_version = previous_metadata
            .get("resourceVersion")
            .and_then(Value::as_str)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let uid = previous_metadata
            .get("uid")
            .cloned()
            .unwrap_or_else(|| {
                let n = self.next_uid.fetch_add(1, Ordering::SeqCst) + 1;
                Value::String(format!("00000000-0000-0000-0000-{n:012}"))
            });

        let mut object = body.clone();
        let mut metadata = object
            .remove("metadata")
            .and_then(|m| match m {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .unwrap_or_default();
        metadata.insert("name".to_string(), Value::String(identity.name.clone()));
        if let Some(namespace) = &identity.namespace {
            metadata.insert("namespace".to_string(), Value::String(namespace.clone()));
        }
        metadata.insert("uid".to_string(), uid);
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(resource_version.to_string()),
        );
        let generation = if desired_changed {
            previous_generation + 1
        } else {
            previous_generation
        };
        metadata.insert("generation".to_string(), Value::from(generation));
        object.insert("metadata".to_string(), Value::Object(metadata));
        object.insert("status".to_string(), Value::Object(Map::new()));

        let object = Value::Object(object);
        objects.insert(
            key,
            StoredObject {
                object: object.clone(),
                manager: options.field_manager.clone(),
            },
        );
        Ok(object)
    }

    async fn delete(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<()> {
        self.record_request();
        debug!(%identity, kind = %resource.kind, "memory DELETE");
        match self.lock().remove(&ObjectKey::new(resource, identity)) {
            Some(_) => Ok(()),
            None => Err(Self::failure(
                ApiVerb::Delete,
                identity,
                ApiStatus::not_found(resource, &identity.name),
            )),
        }
    }
}
