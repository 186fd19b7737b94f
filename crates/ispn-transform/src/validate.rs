//! Legacy model validation
//!
//! Checks a tree the way a controller running `version` would when booting
//! it: every resource known, every attribute defined and well typed.

use std::fmt::{self, Display, Formatter};

use ispn_model::{ModelNode, ModelVersion, PathAddress, ValueType};
use serde::{Deserialize, Serialize};

use crate::engine::TransformationEngine;

/// What is wrong with a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ViolationKind {
    /// No description matches the resource
    UnknownResource,
    /// The resource type does not exist at the version
    ResourceNotValid,
    /// No definition for the attribute
    UnknownAttribute {
        /// Attribute name
        name: String,
    },
    /// The attribute does not exist at the version
    AttributeNotValid {
        /// Attribute name
        name: String,
    },
    /// The value does not have the declared type
    TypeMismatch {
        /// Attribute name
        name: String,
        /// Declared type
        expected: ValueType,
        /// Type found
        actual: ValueType,
    },
}

/// A validation failure at one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Offending resource
    pub address: PathAddress,
    /// Failure
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::UnknownResource => write!(f, "{}: unknown resource", self.address),
            ViolationKind::ResourceNotValid => {
                write!(f, "{}: resource not valid at version", self.address)
            }
            ViolationKind::UnknownAttribute { name } => {
                write!(f, "{} [{name}]: unknown attribute", self.address)
            }
            ViolationKind::AttributeNotValid { name } => {
                write!(f, "{} [{name}]: attribute not valid at version", self.address)
            }
            ViolationKind::TypeMismatch {
                name,
                expected,
                actual,
            } => write!(f, "{} [{name}]: expected {expected}, found {actual}", self.address),
        }
    }
}

impl TransformationEngine {
    /// Validate `tree` against the schema as of `version`
    ///
    /// Resources failing validation are reported once; their subtree is not
    /// inspected further.
    #[must_use]
    pub fn validate_at(&self, tree: &ModelNode, version: &ModelVersion) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.validate_node(tree, version, &mut violations);
        if !violations.is_empty() {
            tracing::debug!("{} violation(s) at {version}", violations.len());
        }
        violations
    }

    fn validate_node(&self, node: &ModelNode, version: &ModelVersion, out: &mut Vec<Violation>) {
        let violation = |kind| Violation {
            address: node.address().clone(),
            kind,
        };
        let Some(description) = node.element().and_then(|e| self.schema().resolve(e)) else {
            out.push(violation(ViolationKind::UnknownResource));
            return;
        };
        if !description.is_valid_at(version) {
            out.push(violation(ViolationKind::ResourceNotValid));
            return;
        }

        for (name, value) in node.attributes() {
            let Some(definition) = self.schema().lookup(description.name(), name) else {
                out.push(violation(ViolationKind::UnknownAttribute { name: name.clone() }));
                continue;
            };
            if !definition.is_valid_at(version) {
                out.push(violation(ViolationKind::AttributeNotValid { name: name.clone() }));
            } else if value.value_type() != definition.value_type() {
                out.push(violation(ViolationKind::TypeMismatch {
                    name: name.clone(),
                    expected: definition.value_type(),
                    actual: value.value_type(),
                }));
            }
        }

        for child in node.children() {
            self.validate_node(child, version, out);
        }
    }
}
