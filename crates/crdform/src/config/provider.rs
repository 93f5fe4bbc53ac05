//! Provider-level settings and their per-resource overrides.

use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

use crate::cluster::ApplyOptions;
use crate::config::cli::ProviderArgs;
use crate::config::ConfigError;
use crate::slot::Slot;

/// Settings captured once when adapters are configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Explicit kubeconfig file; the default client chain is used otherwise.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one.
    pub context: Option<String>,
    /// Apply settings used when a resource does not override them.
    pub apply: ApplyOptions,
}

impl TryFrom<ProviderArgs> for ProviderConfig {
    type Error = ConfigError;

    fn try_from(args: ProviderArgs) -> Result<Self, Self::Error> {
        if args.field_manager.is_empty() {
            return Err(ConfigError::EmptyFieldManager);
        }
        Ok(Self {
            kubeconfig: args.kubeconfig,
            context: args.context,
            apply: ApplyOptions {
                field_manager: args.field_manager,
                force_conflicts: args.force_conflicts,
            },
        })
    }
}

/// Per-resource overrides of [`ProviderConfig::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSettings {
    pub field_manager: Slot<String>,
    pub force_conflicts: Slot<bool>,
}

impl ResourceSettings {
    /// Read the `field_manager` and `force_conflicts` attributes of a
    /// configuration or state tree.
    pub fn from_state(state: &Map<String, Value>) -> Self {
        Self {
            field_manager: Slot::from_json(state.get("field_manager")),
            force_conflicts: Slot::from_json(state.get("force_conflicts")),
        }
    }

    /// A resource-level value wins when it is set; unset and unknown values
    /// fall back to the provider default.
    pub fn resolve(&self, defaults: &ApplyOptions) -> ApplyOptions {
        ApplyOptions {
            field_manager: self
                .field_manager
                .clone()
                .or(defaults.field_manager.clone()),
            force_conflicts: self.force_conflicts.clone().or(defaults.force_conflicts),
        }
    }
}
