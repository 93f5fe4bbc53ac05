//! Dynamic client seam.
//!
//! Adapters talk to the cluster only through [`ClusterApi`]: one call per
//! operation, JSON in and JSON out. [`KubeCluster`] is the real thing,
//! [`MemoryCluster`] an in-process stand-in for tests and dry runs.

mod kube_client;
mod memory;

use async_trait::async_trait;
use kube::discovery::ApiResource;
use serde_json::Value;
use thiserror::Error;

pub use kube_client::KubeCluster;
pub use memory::MemoryCluster;
use crate::error::AdapterResult;
use crate::identity::Identity;

/// Server-side apply settings for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Name under which field ownership is recorded.
    pub field_manager: String,
    /// Take over fields owned by other managers instead of failing.
    pub force_conflicts: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            field_manager: crate::DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
        }
    }
}

#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch one object.
    async fn get(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<Value>;

    /// Server-side apply `body` and return the object as stored.
    async fn apply(
        &self,
        resource: &ApiResource,
        identity: &Identity,
        body: &Value,
        options: &ApplyOptions,
    ) -> AdapterResult<Value>;

    /// Delete one object; dependents are left to the garbage collector.
    async fn delete(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<()>;
}

/// Status returned by an API server for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} ({code}): {message}")]
pub struct ApiStatus {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl ApiStatus {
    pub fn not_found(resource: &ApiResource, name: &str) -> Self {
        Self {
            code: 404,
            reason: "NotFound".to_string(),
            message: format!("{}.{} {name:?} not found", resource.plural, resource.group),
        }
    }

    pub fn conflict(manager: &str, field: &str) -> Self {
        Self {
            code: 409,
            reason: "Conflict".to_string(),
            message: format!("Apply failed with 1 conflict: conflict with {manager:?}: {field}"),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: 422,
            reason: "Invalid".to_string(),
            message: message.into(),
        }
    }
}
