//! Harness errors and differences

use std::fmt::{self, Display, Formatter};

use ispn_model::{PathAddress, PathElement, Value};
use ispn_transform::{Rejection, TransformError};

/// What differs at one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Root addresses differ
    AddressMismatch {
        /// Address found
        actual: PathAddress,
    },
    /// Attribute defined on both sides with different values
    AttributeMismatch {
        /// Attribute name
        name: String,
        /// Expected value
        expected: Value,
        /// Actual value
        actual: Value,
    },
    /// Attribute expected but undefined
    MissingAttribute {
        /// Attribute name
        name: String,
        /// Expected value
        expected: Value,
    },
    /// Attribute defined but not expected
    UnexpectedAttribute {
        /// Attribute name
        name: String,
        /// Actual value
        actual: Value,
    },
    /// Child expected but absent
    MissingChild(PathElement),
    /// Child present but not expected
    UnexpectedChild(PathElement),
    /// Same children in a different order
    ChildOrder {
        /// Expected order
        expected: Vec<PathElement>,
        /// Actual order
        actual: Vec<PathElement>,
    },
    /// Rejection expected but not recorded
    MissingRejection(Rejection),
    /// Rejection recorded but not expected
    UnexpectedRejection(Rejection),
    /// Operation expected to be rejected was not
    NotRejected {
        /// Operation, in management syntax
        operation: String,
    },
    /// The transformed model would not boot at the target version; the
    /// message carries the address
    Violation(String),
}

/// One difference, located by the full address of the resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Resource address
    pub address: PathAddress,
    /// What differs
    pub kind: DifferenceKind,
}

impl Difference {
    /// Create a difference
    #[inline]
    #[must_use]
    pub fn new(address: PathAddress, kind: DifferenceKind) -> Self {
        Self { address, kind }
    }
}

fn elements(list: &[PathElement]) -> String {
    list.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Difference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let address = &self.address;
        match &self.kind {
            DifferenceKind::AddressMismatch { actual } => {
                write!(f, "{address}: expected this root, found {actual}")
            }
            DifferenceKind::AttributeMismatch {
                name,
                expected,
                actual,
            } => write!(f, "{address} [{name}]: expected {expected}, actual {actual}"),
            DifferenceKind::MissingAttribute { name, expected } => {
                write!(f, "{address} [{name}]: expected {expected}, actual undefined")
            }
            DifferenceKind::UnexpectedAttribute { name, actual } => {
                write!(f, "{address} [{name}]: expected undefined, actual {actual}")
            }
            DifferenceKind::MissingChild(element) => write!(f, "{address}: missing child {element}"),
            DifferenceKind::UnexpectedChild(element) => {
                write!(f, "{address}: unexpected child {element}")
            }
            DifferenceKind::ChildOrder { expected, actual } => write!(
                f,
                "{address}: children ordered [{}], expected [{}]",
                elements(actual),
                elements(expected)
            ),
            DifferenceKind::MissingRejection(rejection) => {
                write!(f, "{address}: missing rejection {}", rejection.reason)
            }
            DifferenceKind::UnexpectedRejection(rejection) => match &rejection.attribute {
                Some(attribute) => write!(
                    f,
                    "{address} [{attribute}]: unexpected rejection {}",
                    rejection.reason
                ),
                None => write!(f, "{address}: unexpected rejection {}", rejection.reason),
            },
            DifferenceKind::NotRejected { operation } => {
                write!(f, "{address}: operation {operation} was not rejected")
            }
            DifferenceKind::Violation(message) => f.write_str(message),
        }
    }
}

fn render(differences: &[Difference]) -> String {
    differences
        .iter()
        .map(|d| format!("\n  - {d}"))
        .collect()
}

/// Harness assertion failed; carries every difference found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: {} difference(s){}", .differences.len(), render(.differences))]
pub struct HarnessAssertionFailure {
    /// What was being checked
    pub context: String,
    /// Every difference, in discovery order
    pub differences: Vec<Difference>,
}

/// Harness failures
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The engine failed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The engine ran but its output was not as expected
    #[error(transparent)]
    Assertion(#[from] HarnessAssertionFailure),
}

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
