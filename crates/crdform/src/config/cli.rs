use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use utils::version;

use crate::DEFAULT_FIELD_MANAGER;

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the type names of every built-in kind
    Kinds,
    /// Print the attribute schema of a type as JSON
    Schema(SchemaArgs),
    /// Validate a configuration without contacting the cluster
    Validate(ConfigArgs),
    /// Render a manifest configuration to YAML
    Render(ConfigArgs),
    /// Create or update a resource with server-side apply
    Apply(ApplyArgs),
    /// Read an existing object through the data source
    Read(ConfigArgs),
    /// Import an existing object by identifier and print its state
    Import(IdArgs),
    /// Delete an object by identifier
    Delete(IdArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    #[arg(
        long,
        global = true,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(long, global = true, env = "KUBE_CONTEXT", help = "Kubeconfig context to use")]
    pub context: Option<String>,

    #[arg(
        long,
        global = true,
        env = "CRDFORM_FIELD_MANAGER",
        default_value = DEFAULT_FIELD_MANAGER,
        help = "Field manager recorded for server-side apply, unless a resource sets its own"
    )]
    pub field_manager: String,

    #[arg(
        long,
        global = true,
        env = "CRDFORM_FORCE_CONFLICTS",
        help = "Take over fields owned by other field managers, unless a resource decides otherwise",
        default_value_t = false,
        action = clap::ArgAction::Set
    )]
    pub force_conflicts: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Type name, e.g. k8s_policy_karmada_io_propagation_policy_v1alpha1
    pub type_name: String,

    #[arg(long, help = "Show the data source schema instead of the resource schema")]
    pub data_source: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Type name, e.g. k8s_policy_karmada_io_propagation_policy_v1alpha1_manifest
    pub type_name: String,

    #[arg(
        short = 'f',
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "Configuration document (YAML or JSON, snake_case attributes)"
    )]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[arg(
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "Prior state document; the resource is updated instead of created"
    )]
    pub state: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Type name, e.g. k8s_policy_karmada_io_cluster_override_policy_v1alpha1
    pub type_name: String,

    /// `namespace/name` for namespaced kinds, `name` for cluster-scoped kinds
    pub id: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn provider_flags_apply_to_subcommands() {
        let cli = Cli::try_parse_from([
            "crdform",
            "apply",
            "k8s_policy_karmada_io_propagation_policy_v1alpha1",
            "-f",
            "policy.yaml",
            "--field-manager",
            "ci",
            "--force-conflicts",
            "true",
        ])
        .unwrap();

        assert_eq!(cli.provider.field_manager, "ci");
        assert!(cli.provider.force_conflicts);
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.config.file, PathBuf::from("policy.yaml"));
                assert!(args.state.is_none());
            }
            _ => panic!("expected apply"),
        }
    }
}
