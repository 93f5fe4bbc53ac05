use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use crdform::adapter::schema_for;
use crdform::adapter::State;
use crdform::adapter::Variant;
use crdform::cluster::KubeCluster;
use crdform::config::load_document;
use crdform::config::ApplyArgs;
use crdform::config::Cli;
use crdform::config::Commands;
use crdform::config::ConfigArgs;
use crdform::config::IdArgs;
use crdform::config::ProviderConfig;
use crdform::config::SchemaArgs;
use crdform::validate::validate;
use crdform::Catalog;
use crdform::ClusterApi;
use crdform::DataSourceAdapter;
use crdform::Diagnostics;
use crdform::Identity;
use crdform::ManifestAdapter;
use crdform::ResourceAdapter;
use crdform::ResourceKind;
use serde_json::Value;
use utils::logging;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_global_hooks();

    let cli = Cli::parse();
    logging::init_with_level(if cli.verbose {
        logging::LevelFilter::DEBUG
    } else {
        logging::LevelFilter::INFO
    });
    tracing::debug!("crdform {}", &**version::VERSION);

    let provider = ProviderConfig::try_from(cli.provider)?;
    let catalog = Catalog::builtin();

    let outcome = match cli.command {
        Commands::Kinds => {
            for type_name in catalog.type_names() {
                println!("{type_name}");
            }
            Ok(())
        }
        Commands::Schema(args) => print_schema(&catalog, &args)?,
        Commands::Validate(args) => run_validate(&catalog, &args)?,
        Commands::Render(args) => run_render(&catalog, &args)?,
        Commands::Apply(args) => run_apply(&catalog, &provider, &args).await?,
        Commands::Read(args) => run_read(&catalog, &provider, &args).await?,
        Commands::Import(args) => run_import(&catalog, &provider, &args).await?,
        Commands::Delete(args) => run_delete(&catalog, &provider, &args).await?,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(diagnostics) => {
            eprintln!("{diagnostics}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Diagnostics are an expected outcome and reported on stderr; everything
/// else in the outer `Result` is a usage or environment error.
type Outcome = Result<(), Diagnostics>;

fn lookup(catalog: &Catalog, type_name: &str, expected: Variant) -> Result<Arc<ResourceKind>> {
    let Some((kind, variant)) = catalog.lookup(type_name) else {
        bail!("unknown type {type_name:?}; run `crdform kinds` for the list");
    };
    if variant != expected {
        match expected {
            Variant::Manifest => bail!("{type_name:?} is not a manifest type; use the `_manifest` variant"),
            Variant::Resource | Variant::DataSource => {
                bail!("{type_name:?} is a manifest type; drop the `_manifest` suffix")
            }
        }
    }
    Ok(kind)
}

async fn connect(provider: &ProviderConfig) -> Result<Arc<dyn ClusterApi>> {
    let cluster = KubeCluster::connect(provider.kubeconfig.as_deref(), provider.context.as_deref())
        .await
        .map_err(|report| anyhow::anyhow!("{report:?}"))?;
    Ok(Arc::new(cluster))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_schema(catalog: &Catalog, args: &SchemaArgs) -> Result<Outcome> {
    let Some((kind, mut variant)) = catalog.lookup(&args.type_name) else {
        bail!("unknown type {:?}; run `crdform kinds` for the list", args.type_name);
    };
    if args.data_source {
        if variant == Variant::Manifest {
            bail!("manifest types have no data source");
        }
        variant = Variant::DataSource;
    }
    print_json(&schema_for(&kind, variant))?;
    Ok(Ok(()))
}

fn run_validate(catalog: &Catalog, args: &ConfigArgs) -> Result<Outcome> {
    let (kind, variant) = catalog
        .lookup(&args.type_name)
        .with_context(|| format!("unknown type {:?}", args.type_name))?;
    let config = load_document(&args.file)?;

    let diagnostics = validate(&schema_for(&kind, variant), &config);
    if diagnostics.has_error() {
        return Ok(Err(diagnostics));
    }
    if !diagnostics.is_empty() {
        eprintln!("{diagnostics}");
    }
    Ok(Ok(()))
}

fn run_render(catalog: &Catalog, args: &ConfigArgs) -> Result<Outcome> {
    let kind = lookup(catalog, &args.type_name, Variant::Manifest)?;
    let config = load_document(&args.file)?;

    Ok(ManifestAdapter::new(kind).read(&config).map(|state| {
        if let Some(Value::String(yaml)) = state.get("yaml") {
            print!("{yaml}");
        }
    }))
}

async fn run_apply(catalog: &Catalog, provider: &ProviderConfig, args: &ApplyArgs) -> Result<Outcome> {
    let kind = lookup(catalog, &args.config.type_name, Variant::Resource)?;
    let config = load_document(&args.config.file)?;
    let prior = args.state.as_deref().map(load_state).transpose()?;

    let adapter = ResourceAdapter::new(kind, connect(provider).await?, provider.apply.clone());
    let result = match &prior {
        Some(prior) => adapter.update(prior, &config).await,
        None => adapter.create(&config).await,
    };
    match result {
        Ok(state) => print_json(&state).map(Ok),
        Err(diagnostics) => Ok(Err(diagnostics)),
    }
}

async fn run_read(catalog: &Catalog, provider: &ProviderConfig, args: &ConfigArgs) -> Result<Outcome> {
    let kind = lookup(catalog, &args.type_name, Variant::Resource)?;
    let config = load_document(&args.file)?;

    let adapter = DataSourceAdapter::new(kind, connect(provider).await?);
    match adapter.read(&config).await {
        Ok(state) => print_json(&state).map(Ok),
        Err(diagnostics) => Ok(Err(diagnostics)),
    }
}

async fn run_import(catalog: &Catalog, provider: &ProviderConfig, args: &IdArgs) -> Result<Outcome> {
    let kind = lookup(catalog, &args.type_name, Variant::Resource)?;
    if let Err(report) = Identity::parse(kind.scope, &args.id) {
        return Ok(Err(report.into()));
    }
    let adapter = ResourceAdapter::new(kind, connect(provider).await?, provider.apply.clone());

    let state = match adapter.import(&args.id) {
        Ok(seed) => adapter.read(&seed).await,
        Err(diagnostics) => Err(diagnostics),
    };
    match state {
        Ok(state) => print_json(&state).map(Ok),
        Err(diagnostics) => Ok(Err(diagnostics)),
    }
}

async fn run_delete(catalog: &Catalog, provider: &ProviderConfig, args: &IdArgs) -> Result<Outcome> {
    let kind = lookup(catalog, &args.type_name, Variant::Resource)?;
    if let Err(report) = Identity::parse(kind.scope, &args.id) {
        return Ok(Err(report.into()));
    }
    let adapter = ResourceAdapter::new(kind, connect(provider).await?, provider.apply.clone());

    Ok(match adapter.import(&args.id) {
        Ok(state) => adapter.delete(&state).await,
        Err(diagnostics) => Err(diagnostics),
    })
}

fn load_state(path: &Path) -> Result<State> {
    match load_document(path)? {
        Value::Object(state) => Ok(state),
        _ => bail!("state document {} must be an object", path.display()),
    }
}
