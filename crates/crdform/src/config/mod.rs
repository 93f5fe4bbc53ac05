pub mod cli;
pub mod provider;

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

pub use cli::*;
pub use provider::*;

/// Errors raised while assembling configuration, before any adapter runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Field manager must not be empty")]
    EmptyFieldManager,
}

/// Load a configuration or state document. YAML and JSON are both accepted.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
