//! Subsystem catalog errors

use ispn_model::SchemaError;

/// Catalog lookup and construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubsystemError {
    /// No model version with that id
    #[error("unknown subsystem model version: {0}")]
    UnknownModel(String),

    /// No legacy release with that name
    #[error("unknown legacy release: {0}")]
    UnknownRelease(String),

    /// The catalog is inconsistent
    #[error("invalid subsystem catalog: {0}")]
    Schema(#[from] SchemaError),
}
