use std::path::Path;

use async_trait::async_trait;
use error_stack::Report;
use error_stack::ResultExt;
use kube::api::Api;
use kube::api::DeleteParams;
use kube::api::DynamicObject;
use kube::api::Patch;
use kube::api::PatchParams;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::core::params::ValidationDirective;
use kube::discovery::ApiResource;
use kube::Client;
use kube::Config;
use serde_json::Value;
use tracing::debug;

use super::ApiStatus;
use super::ApplyOptions;
use super::ClusterApi;
use crate::error::AdapterError;
use crate::error::AdapterResult;
use crate::error::ApiVerb;
use crate::identity::Identity;

/// [`ClusterApi`] backed by the kube dynamic client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an explicit kubeconfig file, or from the default
    /// chain (in-cluster config, then `~/.kube/config`) when none is given.
    /// `context` selects a kubeconfig context other than the current one.
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> AdapterResult<Self> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..KubeConfigOptions::default()
        };

        let client = match (kubeconfig, context) {
            (Some(kubeconfig_path), _) => {
                let kubeconfig = Kubeconfig::read_from(kubeconfig_path).change_context(
                    AdapterError::ClientConfig {
                        message: format!(
                            "Failed to read kubeconfig file: {}",
                            kubeconfig_path.display()
                        ),
                    },
                )?;

                let config = Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .change_context(AdapterError::ClientConfig {
                        message: format!(
                            "Failed to create config from kubeconfig: {}",
                            kubeconfig_path.display()
                        ),
                    })?;

                Client::try_from(config).change_context(AdapterError::ClientConfig {
                    message: "Failed to create Kubernetes client from custom kubeconfig"
                        .to_string(),
                })?
            }
            (None, Some(context)) => {
                let config = Config::from_kubeconfig(&options).await.change_context(
                    AdapterError::ClientConfig {
                        message: format!("Failed to load kubeconfig context {context}"),
                    },
                )?;

                Client::try_from(config).change_context(AdapterError::ClientConfig {
                    message: "Failed to create Kubernetes client".to_string(),
                })?
            }
            (None, None) => Client::try_default()
                .await
                .change_context(AdapterError::ClientConfig {
                    message: "Failed to create Kubernetes client".to_string(),
                })?,
        };
        Ok(Self::new(client))
    }

    fn api(&self, resource: &ApiResource, identity: &Identity) -> Api<DynamicObject> {
        match &identity.namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, resource),
            None => Api::all_with(self.client.clone(), resource),
        }
    }
}

fn to_json(object: DynamicObject, identity: &Identity) -> AdapterResult<Value> {
    serde_json::to_value(object).change_context(AdapterError::Unmarshal {
        what: format!("response for {identity}"),
    })
}

/// Server-side apply parameters: the resolved field manager, the force flag,
/// and strict field validation so unknown fields are rejected by the server.
fn apply_params(options: &ApplyOptions) -> PatchParams {
    let mut params = PatchParams::apply(&options.field_manager);
    params.force = options.force_conflicts;
    params.field_validation = Some(ValidationDirective::Strict);
    params
}

/// Status responses from the API server become [`ApiStatus`] beneath the
/// `Api` context; transport and decoding errors are kept as they are.
fn api_failure(error: kube::Error, verb: ApiVerb, identity: &Identity) -> Report<AdapterError> {
    let context = api_error(verb, identity);
    match error {
        kube::Error::Api(response) => Report::new(ApiStatus {
            code: response.code,
            reason: response.reason,
            message: response.message,
        })
        .change_context(context),
        other => Report::new(other).change_context(context),
    }
}

fn api_error(verb: ApiVerb, identity: &Identity) -> AdapterError {
    AdapterError::Api {
        verb,
        target: identity.to_string(),
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<Value> {
        debug!(api_version = %resource.api_version, kind = %resource.kind, %identity, "GET");
        let object = self
            .api(resource, identity)
            .get(&identity.name)
            .await
            .map_err(|error| api_failure(error, ApiVerb::Get, identity))?;
        to_json(object, identity)
    }

    async fn apply(
        &self,
        resource: &ApiResource,
        identity: &Identity,
        body: &Value,
        options: &ApplyOptions,
    ) -> AdapterResult<Value> {
        debug!(
            api_version = %resource.api_version,
            kind = %resource.kind,
            %identity,
            field_manager = %options.field_manager,
            force = options.force_conflicts,
            "PATCH (server-side apply)"
        );
        let params = apply_params(options);

        let object = self
            .api(resource, identity)
            .patch(&identity.name, &params, &Patch::Apply(body))
            .await
            .map_err(|error| api_failure(error, ApiVerb::Patch, identity))?;
        to_json(object, identity)
    }

    async fn delete(&self, resource: &ApiResource, identity: &Identity) -> AdapterResult<()> {
        debug!(api_version = %resource.api_version, kind = %resource.kind, %identity, "DELETE");
        let outcome = self
            .api(resource, identity)
            .delete(&identity.name, &DeleteParams::default())
            .await
            .map_err(|error| api_failure(error, ApiVerb::Delete, identity))?;
        debug!(%identity, finished = outcome.is_right(), "delete accepted");
        Ok(())
    }
}

impl std::fmt::Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster").finish_non_exhaustive()
    }
}
