//! Management operations
//!
//! The configuration-mutating operations a management client replays
//! against a model: adding and removing resources, writing and undefining
//! attributes.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::node::ModelNode;
use crate::path::PathAddress;
use crate::value::{Attributes, Value};

/// A configuration-mutating operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum Operation {
    /// Create a resource
    Add {
        /// Resource address
        address: PathAddress,
        /// Initial attributes
        #[serde(default)]
        attributes: Attributes,
    },

    /// Define an attribute of an existing resource
    WriteAttribute {
        /// Resource address
        address: PathAddress,
        /// Attribute name
        name: String,
        /// New value
        value: Value,
    },

    /// Undefine an attribute of an existing resource
    UndefineAttribute {
        /// Resource address
        address: PathAddress,
        /// Attribute name
        name: String,
    },

    /// Remove a resource and its subtree
    Remove {
        /// Resource address
        address: PathAddress,
    },
}

impl Operation {
    /// Add operation
    #[inline]
    #[must_use]
    pub fn add(address: PathAddress, attributes: Attributes) -> Self {
        Self::Add {
            address,
            attributes,
        }
    }

    /// Write-attribute operation
    #[inline]
    #[must_use]
    pub fn write_attribute(
        address: PathAddress,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::WriteAttribute {
            address,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Target resource address
    #[inline]
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        match self {
            Self::Add { address, .. }
            | Self::WriteAttribute { address, .. }
            | Self::UndefineAttribute { address, .. }
            | Self::Remove { address } => address,
        }
    }

    /// Operation name as used by management clients
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::WriteAttribute { .. } => "write-attribute",
            Self::UndefineAttribute { .. } => "undefine-attribute",
            Self::Remove { .. } => "remove",
        }
    }

    /// The operations that would recreate `tree`, parent before children
    #[must_use]
    pub fn describe(tree: &ModelNode) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(tree.resource_count());
        tree.walk(&mut |node| {
            ops.push(Operation::add(node.address().clone(), node.attributes().clone()));
        });
        ops
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteAttribute { address, name, value } => {
                write!(f, "{address}:write-attribute(name={name}, value={value})")
            }
            Self::UndefineAttribute { address, name } => {
                write!(f, "{address}:undefine-attribute(name={name})")
            }
            other => write!(f, "{}:{}", other.address(), other.name()),
        }
    }
}
