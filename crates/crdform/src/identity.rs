use std::fmt;

use error_stack::Report;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;

use crate::error::AdapterError;
use crate::error::AdapterResult;
use crate::kind::Scope;

const NAMESPACED_FORMAT: &str = "namespace/name";
const CLUSTER_FORMAT: &str = "name";

/// Address of one object: `namespace/name` for namespaced kinds, `name` for
/// cluster-scoped ones. Always derived from metadata, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub namespace: Option<String>,
    pub name: String,
}

impl Identity {
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Read the identity out of the `metadata` attribute of a configuration or
    /// state tree. The namespace is ignored for cluster-scoped kinds.
    pub fn from_metadata(scope: Scope, state: &Map<String, Value>) -> AdapterResult<Self> {
        let metadata = state.get("metadata").and_then(Value::as_object);
        let field = |name: &str| {
            metadata
                .and_then(|m| m.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let name = field("name").ok_or(AdapterError::MissingIdentity { field: "name" })?;
        match scope {
            Scope::Cluster => Ok(Self::cluster(name)),
            Scope::Namespaced => {
                let namespace = field("namespace")
                    .ok_or(AdapterError::MissingIdentity { field: "namespace" })?;
                Ok(Self::namespaced(namespace, name))
            }
        }
    }

    /// Parse an import identifier. Nothing is looked up remotely; a malformed
    /// identifier is rejected here.
    pub fn parse(scope: Scope, id: &str) -> AdapterResult<Self> {
        let invalid = |expected| {
            Report::new(AdapterError::InvalidImportId {
                id: id.to_string(),
                expected,
            })
        };

        match scope {
            Scope::Namespaced => {
                let mut parts = id.split('/');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(namespace), Some(name), None)
                        if !namespace.is_empty() && !name.is_empty() =>
                    {
                        Ok(Self::namespaced(namespace, name))
                    }
                    _ => Err(invalid(NAMESPACED_FORMAT)),
                }
            }
            Scope::Cluster if id.is_empty() || id.contains('/') => Err(invalid(CLUSTER_FORMAT)),
            Scope::Cluster => Ok(Self::cluster(id)),
        }
    }

    /// Minimal `metadata` value addressing this object.
    pub fn metadata(&self) -> Value {
        match &self.namespace {
            Some(namespace) => json!({"name": self.name, "namespace": namespace}),
            None => json!({"name": self.name}),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn parses_namespaced_ids() {
        let identity = Identity::parse(Scope::Namespaced, "karmada-system/nginx").unwrap();
        assert_eq!(identity, Identity::namespaced("karmada-system", "nginx"));
        assert_eq!(identity.to_string(), "karmada-system/nginx");
    }

    #[test]
    fn rejects_malformed_namespaced_ids() {
        for id in ["badformat", "/name", "ns/", "a/b/c", "", "/"] {
            let report = Identity::parse(Scope::Namespaced, id).unwrap_err();
            assert!(
                matches!(
                    report.current_context(),
                    AdapterError::InvalidImportId { expected: "namespace/name", .. }
                ),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn cluster_scoped_ids_are_plain_names() {
        assert_eq!(
            Identity::parse(Scope::Cluster, "global-policy").unwrap(),
            Identity::cluster("global-policy")
        );
        assert!(Identity::parse(Scope::Cluster, "ns/name").is_err());
        assert!(Identity::parse(Scope::Cluster, "").is_err());
    }

    #[test]
    fn identity_from_metadata() {
        let state = json!({"metadata": {"name": "web", "namespace": "apps", "labels": null}});
        let state = state.as_object().unwrap();

        assert_eq!(
            Identity::from_metadata(Scope::Namespaced, state).unwrap().to_string(),
            "apps/web"
        );
        assert_eq!(
            Identity::from_metadata(Scope::Cluster, state).unwrap().to_string(),
            "web"
        );

        let nameless = json!({"metadata": {"namespace": "apps"}});
        assert!(Identity::from_metadata(Scope::Namespaced, nameless.as_object().unwrap()).is_err());
    }
}
