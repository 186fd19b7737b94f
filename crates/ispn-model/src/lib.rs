//! Infinispan management model
//!
//! Versioned configuration trees and the data-driven schema that describes
//! how they evolve between releases.
//!
//! # Core Concepts
//!
//! - [`ModelNode`]: a resource with its address, attributes and children
//! - [`PathAddress`]: hierarchical `(type, name)` address of a resource
//! - [`ModelVersion`] / [`VersionRegistry`]: totally ordered schema versions
//! - [`SchemaRegistry`]: resource and attribute definitions with migration rules
//! - [`Operation`]: configuration-mutating management operations
//! - [`ModelDocument`]: JSON form of a tree
//! - [`Fingerprint`]: SHA-256 digest of a tree
//!
//! # Example
//!
//! ```rust
//! use ispn_model::{ModelNode, PathAddress, PathElement, Value};
//!
//! let mut root = ModelNode::new("/subsystem=infinispan".parse().unwrap());
//! root.add_child_at(PathElement::new("cache-container", "maximal"))
//!     .unwrap()
//!     .set("statistics-enabled", true);
//!
//! let address: PathAddress = "/subsystem=infinispan/cache-container=maximal".parse().unwrap();
//! assert_eq!(root.find(&address).unwrap().get("statistics-enabled"), Some(&Value::Bool(true)));
//! ```

#![warn(unreachable_pub)]

mod document;
mod error;
mod fingerprint;
mod fixer;
mod node;
mod operation;
mod path;
mod schema;
mod value;
mod version;

pub use document::ModelDocument;
pub use error::{ModelError, SchemaError, VersionError};
pub use fingerprint::Fingerprint;
pub use fixer::ModelFixer;
pub use node::ModelNode;
pub use operation::Operation;
pub use path::{PathAddress, PathElement, PathError, WILDCARD};
pub use schema::{
    AttributeDefinition, AttributeDefinitionBuilder, AttributeMigration, BoundedTransformer,
    MigrationRule, Predicate, ResourceDescription, ResourceTransformer, RewriteFn, RuleError,
    SchemaRegistry,
};
pub use value::{Attributes, Value, ValueType};
pub use version::{ModelVersion, VersionRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
