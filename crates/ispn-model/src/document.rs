//! Document form of a model tree
//!
//! [`ModelDocument`] is the serialized shape handed over by the external
//! model representation:
//!
//! ```json
//! {
//!   "type": "subsystem", "name": "infinispan",
//!   "attributes": {},
//!   "children": [
//!     { "type": "cache-container", "name": "maximal",
//!       "attributes": { "default-cache": "local" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::node::ModelNode;
use crate::path::{PathAddress, PathElement};
use crate::value::Attributes;

/// One resource of a serialized model tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Resource type (address key)
    #[serde(rename = "type")]
    pub kind: String,

    /// Resource name (address value)
    pub name: String,

    /// Defined attributes
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    /// Child resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ModelDocument>,
}

impl ModelDocument {
    /// Parse a document from JSON text
    ///
    /// # Errors
    /// Returns [`ModelError::Document`] if the text is not a valid document
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// Returns [`ModelError::Document`] if serialization fails
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the tree rooted at this document, placed under `parent`
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateChild`] if two sibling documents share
    /// type and name
    pub fn into_node(self, parent: &PathAddress) -> Result<ModelNode, ModelError> {
        let address = parent.append(PathElement::new(self.kind, self.name));
        let mut node = ModelNode::with_attributes(address, self.attributes);
        for child in self.children {
            let child = child.into_node(node.address())?;
            node.add_child(child)?;
        }
        Ok(node)
    }

    /// Document form of a tree
    ///
    /// Returns `None` for the model root, which has no type or name.
    #[must_use]
    pub fn from_node(node: &ModelNode) -> Option<Self> {
        let element = node.element()?;
        Some(Self {
            kind: element.key().to_string(),
            name: element.value().to_string(),
            attributes: node.attributes().clone(),
            children: node.children().iter().filter_map(Self::from_node).collect(),
        })
    }
}
