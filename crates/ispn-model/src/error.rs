//! Error types for the model crate
//!
//! - [`VersionError`]: version registry collisions and lookups
//! - [`SchemaError`]: schema authoring and schema drift
//! - [`ModelError`]: tree structure and document decoding

use crate::path::{PathAddress, PathError};

/// Version registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Id or ordinal already registered
    #[error("version {id} (ordinal {ordinal}) collides with a registered version")]
    DuplicateVersion {
        /// Version id
        id: String,
        /// Version ordinal
        ordinal: u32,
    },

    /// No version with that id
    #[error("unknown model version: {0}")]
    UnknownVersion(String),
}

/// Schema errors
///
/// Duplicates are authoring mistakes caught while the registry is built.
/// Unknown attributes and resources surface schema drift during a
/// transformation and abort the transformation of that tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Resource type described twice
    #[error("resource type '{0}' is already described")]
    DuplicateResource(String),

    /// Attribute defined twice for one resource type
    #[error("attribute '{name}' is already defined for resource type '{resource_type}'")]
    DuplicateAttribute {
        /// Resource type
        resource_type: String,
        /// Attribute name
        name: String,
    },

    /// Attribute defined for a resource type that was never described
    #[error("resource type '{0}' is not described")]
    UnknownResourceType(String),

    /// A resource in a model has no description
    #[error("no resource description matches {0}")]
    UnknownResource(PathAddress),

    /// A resource in a model carries an attribute with no definition
    #[error("attribute '{name}' of {address} is not defined for resource type '{resource_type}'")]
    UnknownAttribute {
        /// Resource address
        address: PathAddress,
        /// Resource type
        resource_type: String,
        /// Attribute name
        name: String,
    },
}

/// Model tree errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Sibling with the same address already exists
    #[error("duplicate child resource: {0}")]
    DuplicateChild(PathAddress),

    /// Child address does not extend the parent address by one element
    #[error("{child} is not a direct child of {parent}")]
    NotAChild {
        /// Parent address
        parent: PathAddress,
        /// Offending child address
        child: PathAddress,
    },

    /// Invalid address text
    #[error("invalid address: {0}")]
    Path(#[from] PathError),

    /// Document decoding failed
    #[error("invalid model document: {0}")]
    Document(#[from] serde_json::Error),
}
