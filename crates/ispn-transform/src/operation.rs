//! Operation transformation
//!
//! A management client talking to a legacy controller sends operations, not
//! whole trees. Each operation goes through the same resource and attribute
//! rules a tree node would.

use std::collections::BTreeSet;

use ispn_model::{MigrationRule, ModelNode, ModelVersion, Operation, PathAddress, SchemaError};

use crate::engine::{AttributeOutcome, ConvertedAttributes, TransformationEngine};
use crate::error::Result;
use crate::rejection::Rejection;

/// What a legacy controller receives for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Forwarded, possibly converted
    Accepted(Operation),

    /// Not forwarded; the legacy model has no counterpart
    Discarded,

    /// Refused
    Rejected(Vec<Rejection>),
}

impl OperationOutcome {
    /// Check if the operation is forwarded
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Check if the operation is refused
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Rejections, empty unless refused
    #[must_use]
    pub fn rejections(&self) -> &[Rejection] {
        match self {
            Self::Rejected(rejections) => rejections,
            _ => &[],
        }
    }
}

impl TransformationEngine {
    /// Transform one operation to `target`
    ///
    /// - every resource along the address must exist at `target`, otherwise
    ///   the operation is rejected as a resource
    /// - `add` converts its attributes like a tree node; any attribute
    ///   rejection refuses the whole operation. Resource transformers see
    ///   only the added resource, never its children, so values derived
    ///   from child resources (such as `batching`) appear only in tree
    ///   transformation
    /// - `write-attribute` is discarded when the attribute is dropped
    /// - `undefine-attribute` follows renames and discards
    ///
    /// # Errors
    /// Same conditions as [`TransformationEngine::transform`]
    pub fn transform_operation(
        &self,
        operation: &Operation,
        target: &ModelVersion,
    ) -> Result<OperationOutcome> {
        if !self.requires_transformation(target) {
            return Ok(OperationOutcome::Accepted(operation.clone()));
        }

        let address = operation.address();
        let description = self.describe(address)?;
        let mut rejections = BTreeSet::new();
        for depth in 1..=address.len() {
            let prefix = PathAddress::new(address.elements()[..depth].to_vec());
            if !self.describe(&prefix)?.is_valid_at(target) {
                self.reject(&mut rejections, Rejection::resource(address.clone()))?;
                return Ok(OperationOutcome::Rejected(rejections.into_iter().collect()));
            }
        }

        let outcome = match operation {
            Operation::Add {
                address,
                attributes,
            } => {
                let mut converted = ConvertedAttributes::with_capacity(attributes.len());
                for (source, value) in attributes {
                    match self.convert_attribute(description, address, source, value, target)? {
                        AttributeOutcome::Keep { name, value } => {
                            self.keep(&mut converted, address, source, name, value, &mut rejections)?;
                        }
                        AttributeOutcome::Dropped => {}
                        AttributeOutcome::Rejected(rejection) => {
                            self.reject(&mut rejections, rejection)?;
                        }
                    }
                }
                if rejections.is_empty() {
                    let mut converted = converted.into_attributes();
                    let original = ModelNode::with_attributes(address.clone(), attributes.clone());
                    self.apply_resource_transformers(description, &original, target, &mut converted)?;
                    OperationOutcome::Accepted(Operation::add(address.clone(), converted))
                } else {
                    OperationOutcome::Rejected(rejections.into_iter().collect())
                }
            }
            Operation::WriteAttribute {
                address,
                name,
                value,
            } => match self.convert_attribute(description, address, name, value, target)? {
                AttributeOutcome::Keep { name, value } => {
                    OperationOutcome::Accepted(Operation::WriteAttribute {
                        address: address.clone(),
                        name,
                        value,
                    })
                }
                AttributeOutcome::Dropped => OperationOutcome::Discarded,
                AttributeOutcome::Rejected(rejection) => {
                    self.reject(&mut rejections, rejection)?;
                    OperationOutcome::Rejected(rejections.into_iter().collect())
                }
            },
            Operation::UndefineAttribute { address, name } => {
                let definition = self.schema().lookup(description.name(), name).ok_or_else(|| {
                    SchemaError::UnknownAttribute {
                        address: address.clone(),
                        resource_type: description.name().to_string(),
                        name: name.clone(),
                    }
                })?;
                let mut out_name = None;
                let mut discarded = false;
                for rule in definition.migrations_for(target) {
                    match rule {
                        MigrationRule::Discard => discarded = true,
                        MigrationRule::Rename(new_name) => out_name = Some(new_name.clone()),
                        MigrationRule::Rewrite(_) | MigrationRule::RejectIf { .. } => {}
                    }
                }
                if discarded || (out_name.is_none() && !definition.is_valid_at(target)) {
                    OperationOutcome::Discarded
                } else {
                    OperationOutcome::Accepted(Operation::UndefineAttribute {
                        address: address.clone(),
                        name: out_name.unwrap_or_else(|| name.clone()),
                    })
                }
            }
            Operation::Remove { .. } => OperationOutcome::Accepted(operation.clone()),
        };

        tracing::debug!("{operation} at {target}: {outcome:?}");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{demo_engine, v};
    use ispn_model::{Attributes, Value};

    fn container() -> PathAddress {
        "/subsystem=demo/container=c".parse().unwrap()
    }

    #[test]
    fn current_target_accepts_unchanged() {
        let op = Operation::write_attribute(container(), "channel", "tcp");
        let outcome = demo_engine().transform_operation(&op, &v(3)).unwrap();
        assert_eq!(outcome, OperationOutcome::Accepted(op));
    }

    #[test]
    fn write_is_renamed() {
        let op = Operation::write_attribute(container(), "channel", "tcp");
        let outcome = demo_engine().transform_operation(&op, &v(2)).unwrap();
        assert_eq!(
            outcome,
            OperationOutcome::Accepted(Operation::write_attribute(container(), "stack", "tcp"))
        );
    }

    #[test]
    fn write_of_discarded_attribute_is_discarded() {
        let op = Operation::write_attribute(container(), "strategy", "SYNC");
        let outcome = demo_engine().transform_operation(&op, &v(2)).unwrap();
        assert_eq!(outcome, OperationOutcome::Discarded);
    }

    #[test]
    fn write_of_rejected_value_is_rejected() {
        let engine = demo_engine();
        let rejected = Operation::write_attribute(container(), "stats", false);
        let outcome = engine.transform_operation(&rejected, &v(1)).unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(outcome.rejections()[0].attribute.as_deref(), Some("stats"));

        let corrected = Operation::write_attribute(container(), "stats", true);
        let outcome = engine.transform_operation(&corrected, &v(1)).unwrap();
        assert_eq!(outcome, OperationOutcome::Discarded);
    }

    #[test]
    fn add_converts_attributes() {
        let mut attributes = Attributes::new();
        attributes.insert("channel".into(), Value::from("tcp"));
        attributes.insert("mode".into(), Value::from("BATCH"));
        let op = Operation::add(container(), attributes);

        let OperationOutcome::Accepted(Operation::Add { attributes, .. }) =
            demo_engine().transform_operation(&op, &v(2)).unwrap()
        else {
            panic!("expected accepted add");
        };
        assert_eq!(attributes.get("stack"), Some(&Value::from("tcp")));
        assert_eq!(attributes.get("mode"), Some(&Value::from("NONE")));
    }

    #[test]
    fn operations_on_newer_resources_are_rejected() {
        let backup = container().append(ispn_model::PathElement::new("backup", "x"));
        let engine = demo_engine();
        for op in [
            Operation::add(backup.clone(), Attributes::new()),
            Operation::write_attribute(backup.clone(), "site", "NYC"),
            Operation::Remove {
                address: backup.clone(),
            },
        ] {
            let outcome = engine.transform_operation(&op, &v(1)).unwrap();
            assert_eq!(outcome.rejections(), &[Rejection::resource(backup.clone())]);
        }
    }

    #[test]
    fn undefine_follows_rename() {
        let op = Operation::UndefineAttribute {
            address: container(),
            name: "channel".into(),
        };
        let outcome = demo_engine().transform_operation(&op, &v(2)).unwrap();
        assert_eq!(
            outcome,
            OperationOutcome::Accepted(Operation::UndefineAttribute {
                address: container(),
                name: "stack".into(),
            })
        );
    }

    #[test]
    fn undefine_of_newer_attribute_is_discarded() {
        let op = Operation::UndefineAttribute {
            address: container(),
            name: "stats".into(),
        };
        assert_eq!(
            demo_engine().transform_operation(&op, &v(1)).unwrap(),
            OperationOutcome::Discarded
        );
    }
}
