//! Generic adapters exposing Kubernetes custom resource kinds as manifests,
//! resources managed through server-side apply, and data sources.
//!
//! A kind is described once as a [`ResourceKind`]; [`ManifestAdapter`],
//! [`ResourceAdapter`] and [`DataSourceAdapter`] derive their schema and
//! behavior from that descriptor.

pub mod adapter;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod convert;
pub mod diag;
pub mod error;
pub mod identity;
pub mod kind;
pub mod schema;
pub mod slot;
pub mod validate;

pub use adapter::DataSourceAdapter;
pub use adapter::ManifestAdapter;
pub use adapter::ResourceAdapter;
pub use catalog::Catalog;
pub use cluster::ApplyOptions;
pub use cluster::ClusterApi;
pub use diag::Diagnostic;
pub use diag::Diagnostics;
pub use identity::Identity;
pub use kind::ResourceKind;
pub use kind::Scope;

/// Field manager recorded for server-side apply when neither the provider
/// nor the resource names one.
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";
