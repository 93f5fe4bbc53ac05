//! Kind descriptors: everything the generic adapters need to know about one
//! CRD kind.

use kube::discovery::ApiResource;
use serde::Serialize;

use crate::schema::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// One CRD kind at one version.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    /// Lower-case plural used in REST paths, as declared by the CRD.
    pub plural: &'static str,
    pub scope: Scope,
    pub description: &'static str,
    /// Top-level attributes besides `api_version`, `kind` and `metadata`,
    /// usually just `spec`.
    pub body: Vec<Attribute>,
}

impl ResourceKind {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }

    /// Dynamic client handle description for this kind.
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
        }
    }

    /// Type name of the resource and data source, e.g.
    /// `k8s_policy_karmada_io_propagation_policy_v1alpha1`.
    pub fn type_name(&self) -> String {
        let group = self.group.replace(['.', '-'], "_");
        let kind = snake_case(self.kind);
        if group.is_empty() {
            format!("k8s_{kind}_{}", self.version)
        } else {
            format!("k8s_{group}_{kind}_{}", self.version)
        }
    }

    /// Type name of the render-only variant.
    pub fn manifest_type_name(&self) -> String {
        format!("{}_manifest", self.type_name())
    }
}

/// `ResourceInterpreterWebhookConfiguration` -> `resource_interpreter_webhook_configuration`,
/// keeping acronyms together (`HTTPRoute` -> `http_route`).
pub(crate) fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn kind(group: &'static str, kind: &'static str) -> ResourceKind {
        ResourceKind {
            group,
            version: "v1alpha1",
            kind,
            plural: "things",
            scope: Scope::Namespaced,
            description: "",
            body: Vec::new(),
        }
    }

    #[test]
    fn snake_case_keeps_acronyms() {
        assert_eq!(snake_case("PropagationPolicy"), "propagation_policy");
        assert_eq!(snake_case("HTTPRoute"), "http_route");
        assert_eq!(snake_case("ClusterIP"), "cluster_ip");
        assert_eq!(snake_case("V1Beta"), "v1_beta");
    }

    #[test]
    fn type_names_follow_group_kind_version() {
        let policy = kind("policy.karmada.io", "PropagationPolicy");
        assert_eq!(policy.type_name(), "k8s_policy_karmada_io_propagation_policy_v1alpha1");
        assert_eq!(
            policy.manifest_type_name(),
            "k8s_policy_karmada_io_propagation_policy_v1alpha1_manifest"
        );
        assert_eq!(kind("", "Widget").type_name(), "k8s_widget_v1alpha1");
    }

    #[test]
    fn api_resource_uses_declared_plural() {
        let resource = kind("policy.karmada.io", "PropagationPolicy").api_resource();
        assert_eq!(resource.api_version, "policy.karmada.io/v1alpha1");
        assert_eq!(resource.plural, "things");
    }
}
