//! Transformation errors

use ispn_model::{ModelError, PathAddress, SchemaError, Value, VersionError};

use crate::rejection::Rejection;

/// Transformation failures
///
/// Schema drift and nondeterministic rewrites are programmer errors: they
/// are reported and never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The model references an undescribed resource or attribute
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Target version lookup failed
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A rewrite function failed
    #[error("rewrite of '{attribute}' at {address} failed: {message}")]
    Rewrite {
        /// Resource address
        address: PathAddress,
        /// Attribute name
        attribute: String,
        /// Failure message
        message: String,
    },

    /// A resource transformer failed
    #[error("resource transformer '{transformer}' failed at {address}: {message}")]
    Resource {
        /// Resource address
        address: PathAddress,
        /// Transformer description
        transformer: String,
        /// Failure message
        message: String,
    },

    /// A rewrite produced different results for the same input
    #[error("rewrite of '{attribute}' at {address} is not deterministic: {first} then {second}")]
    NonDeterministicRewrite {
        /// Resource address
        address: PathAddress,
        /// Attribute name
        attribute: String,
        /// First result
        first: Value,
        /// Second result
        second: Value,
    },

    /// A rejection occurred while rejections are fatal
    #[error("transformation aborted on rejection: {0}")]
    FatalRejection(Rejection),

    /// The transformed tree could not be assembled
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for transformation operations
pub type Result<T> = std::result::Result<T, TransformError>;
