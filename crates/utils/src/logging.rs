//! provides logging helpers

use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

pub use tracing_subscriber::filter::LevelFilter;

/// initiate the global tracing subscriber
///
/// Events go to stderr so that rendered manifests and state documents on
/// stdout stay machine readable. `RUST_LOG` overrides the default `info` level.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Like [`init`], but lets the caller pick the default level.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter);

    registry().with(fmt_layer).init();
}
