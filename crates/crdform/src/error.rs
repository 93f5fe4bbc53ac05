//! Error types for adapter operations.

use core::error::Error;

use derive_more::Display;
use error_stack::Report;

/// Result type for adapter internals.
pub type AdapterResult<T> = Result<T, Report<AdapterError>>;

/// Kubernetes REST verb of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApiVerb {
    #[display("GET")]
    Get,
    #[display("PATCH")]
    Patch,
    #[display("DELETE")]
    Delete,
}

/// Errors raised below the adapter boundary.
///
/// Remote failures are not classified any further than the verb: not-found,
/// conflicts and admission rejections all surface as [`AdapterError::Api`]
/// with the server's message in the report chain.
#[derive(Debug, Display)]
pub enum AdapterError {
    /// Local state could not be turned into a Kubernetes object
    #[display("failed to marshal {what}")]
    Marshal { what: String },

    /// A Kubernetes object did not fit the declared schema
    #[display("failed to unmarshal {what}")]
    Unmarshal { what: String },

    /// Remote call failed
    #[display("{verb} {target} failed")]
    Api { verb: ApiVerb, target: String },

    /// Import identifier does not match the kind's scope
    #[display("invalid import identifier {id:?}, expected {expected}")]
    InvalidImportId { id: String, expected: &'static str },

    /// Metadata does not identify an object
    #[display("missing {field} in metadata")]
    MissingIdentity { field: &'static str },

    /// Kubernetes client could not be built
    #[display("failed to configure Kubernetes client: {message}")]
    ClientConfig { message: String },
}

impl Error for AdapterError {}

impl AdapterError {
    /// One-line diagnostic summary.
    pub fn summary(&self) -> String {
        match self {
            Self::Marshal { .. } => "Unable to marshal resource".to_string(),
            Self::Unmarshal { .. } => "Unable to unmarshal resource".to_string(),
            Self::Api { verb, .. } => format!("Unable to {verb} resource"),
            Self::InvalidImportId { .. } => "Unexpected Import Identifier".to_string(),
            Self::MissingIdentity { .. } => "Incomplete resource identity".to_string(),
            Self::ClientConfig { .. } => "Unable to configure Kubernetes client".to_string(),
        }
    }

    /// Leading sentence of the diagnostic detail.
    pub fn explanation(&self) -> String {
        match self {
            Self::Marshal { .. } => {
                "The configuration could not be converted into a Kubernetes object.".to_string()
            }
            Self::Unmarshal { .. } => {
                "The object returned by the Kubernetes API does not match the schema of this kind."
                    .to_string()
            }
            Self::Api { verb, .. } => {
                format!("An unexpected error occurred during the {verb} call to the Kubernetes API.")
            }
            Self::InvalidImportId { expected, .. } => {
                format!("Expected import identifier with format: {expected}")
            }
            Self::MissingIdentity { .. } => {
                "The resource state does not contain a name to address the object with."
                    .to_string()
            }
            Self::ClientConfig { .. } => {
                "Check the kubeconfig path, the selected context and cluster reachability."
                    .to_string()
            }
        }
    }
}
