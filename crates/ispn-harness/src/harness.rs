//! Compatibility assertions

use std::collections::BTreeSet;

use ispn_model::{Attributes, ModelFixer, ModelNode, ModelVersion, Operation, Value};
use ispn_transform::{OperationOutcome, Rejection, TransformationEngine, TransformationResult};

use crate::diff::{diff_rejections, diff_trees, CompareOptions};
use crate::error::{Difference, DifferenceKind, HarnessAssertionFailure, Result};
use crate::reject::{AttributeCorrection, ExpectedCorrection, FailedOperationConfig};

/// Drives a [`TransformationEngine`] and checks what a legacy controller
/// would receive
#[derive(Debug, Clone)]
pub struct CompatibilityHarness {
    engine: TransformationEngine,
    options: CompareOptions,
}

impl CompatibilityHarness {
    /// Create a harness around `engine` with order-sensitive comparison
    #[must_use]
    pub fn new(engine: TransformationEngine) -> Self {
        Self {
            engine,
            options: CompareOptions::default(),
        }
    }

    /// Replace the comparison settings
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Engine under test
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &TransformationEngine {
        &self.engine
    }

    /// Transform `tree` to `target` and compare against the expected tree and
    /// rejection set
    ///
    /// # Errors
    /// - [`crate::HarnessError::Transform`] when the engine fails
    /// - [`crate::HarnessError::Assertion`] listing every difference
    pub fn assert_transforms(
        &self,
        tree: &ModelNode,
        target: &ModelVersion,
        expected_tree: &ModelNode,
        expected_rejections: &BTreeSet<Rejection>,
    ) -> Result<TransformationResult> {
        let result = self.engine.transform(tree, target)?;
        let mut differences = diff_trees(expected_tree, result.transformed(), self.options);
        differences.extend(diff_rejections(expected_rejections, result.rejections()));
        fail_on(format!("transform to {target}"), differences)?;
        Ok(result)
    }

    /// Replay `operations` against `target` and check each outcome against
    /// `config`
    ///
    /// Operations with no expectation must not be refused. Operations on a
    /// [`ExpectedCorrection::RejectedResource`] address must be refused as a
    /// resource. Operations carrying values an attribute correction flags
    /// must be refused for those attributes and accepted once corrected; a
    /// value that needs no correction must be accepted as is.
    ///
    /// # Errors
    /// - [`crate::HarnessError::Transform`] when the engine fails
    /// - [`crate::HarnessError::Assertion`] listing every difference
    pub fn assert_rejects_operations(
        &self,
        operations: &[Operation],
        target: &ModelVersion,
        config: &FailedOperationConfig,
    ) -> Result<()> {
        let mut differences = Vec::new();
        for operation in operations {
            let outcome = self.engine.transform_operation(operation, target)?;
            match config.expectation_for(operation.address()) {
                None => unexpected(&outcome, &mut differences),
                Some(ExpectedCorrection::RejectedResource) => {
                    let expected = Rejection::resource(operation.address().clone());
                    expect_rejections(operation, &outcome, &[expected], &mut differences);
                }
                Some(ExpectedCorrection::Attributes(correction)) => {
                    match correct(operation, correction.as_ref()) {
                        None => unexpected(&outcome, &mut differences),
                        Some((corrected, attributes)) => {
                            let expected: Vec<Rejection> = outcome
                                .rejections()
                                .iter()
                                .filter(|r| r.attribute.as_ref().is_some_and(|a| attributes.contains(a)))
                                .cloned()
                                .collect();
                            if expected.len() < attributes.len() {
                                differences.push(Difference::new(
                                    operation.address().clone(),
                                    DifferenceKind::NotRejected {
                                        operation: operation.to_string(),
                                    },
                                ));
                            }
                            let retried = self.engine.transform_operation(&corrected, target)?;
                            tracing::debug!("corrected {corrected}: {retried:?}");
                            unexpected(&retried, &mut differences);
                        }
                    }
                }
            }
        }
        fail_on(
            format!("{} operation(s) at {target}", operations.len()),
            differences,
        )
    }

    /// Transform `tree` to `target`, pass it through `fixer`, and check that
    /// the legacy controller could boot the result
    ///
    /// The fixed tree must validate at `target` and transforming it again must
    /// change nothing. Returns the fixed tree.
    ///
    /// # Errors
    /// - [`crate::HarnessError::Transform`] when the engine fails
    /// - [`crate::HarnessError::Assertion`] listing every difference
    pub fn check_model_transformation(
        &self,
        tree: &ModelNode,
        target: &ModelVersion,
        fixer: Option<&dyn ModelFixer>,
    ) -> Result<ModelNode> {
        let (transformed, rejections) = self.engine.transform(tree, target)?.into_parts();
        if !rejections.is_empty() {
            tracing::info!("{} rejection(s) transforming to {target}", rejections.len());
        }
        let fixed = match fixer {
            Some(fixer) => fixer.fix(transformed, target),
            None => transformed,
        };

        let mut differences: Vec<Difference> = self
            .engine
            .validate_at(&fixed, target)
            .into_iter()
            .map(|violation| {
                let message = violation.to_string();
                Difference::new(violation.address, DifferenceKind::Violation(message))
            })
            .collect();

        let again = self.engine.transform(&fixed, target)?;
        differences.extend(diff_trees(&fixed, again.transformed(), self.options));
        differences.extend(diff_rejections(&BTreeSet::new(), again.rejections()));

        fail_on(format!("model at {target}"), differences)?;
        Ok(fixed)
    }
}

fn fail_on(context: String, differences: Vec<Difference>) -> Result<()> {
    if differences.is_empty() {
        return Ok(());
    }
    tracing::debug!("{context}: {} difference(s)", differences.len());
    Err(HarnessAssertionFailure {
        context,
        differences,
    }
    .into())
}

/// Every rejection of a refused operation is a difference
fn unexpected(outcome: &OperationOutcome, differences: &mut Vec<Difference>) {
    differences.extend(outcome.rejections().iter().map(|r| {
        Difference::new(r.address.clone(), DifferenceKind::UnexpectedRejection(r.clone()))
    }));
}

fn expect_rejections(
    operation: &Operation,
    outcome: &OperationOutcome,
    expected: &[Rejection],
    differences: &mut Vec<Difference>,
) {
    if !outcome.is_rejected() {
        differences.push(Difference::new(
            operation.address().clone(),
            DifferenceKind::NotRejected {
                operation: operation.to_string(),
            },
        ));
        return;
    }
    let expected: BTreeSet<Rejection> = expected.iter().cloned().collect();
    let actual: BTreeSet<Rejection> = outcome.rejections().iter().cloned().collect();
    differences.extend(diff_rejections(&expected, &actual));
}

/// Corrected operation and the attributes that needed correcting, or `None`
/// when nothing needs correcting
fn correct(operation: &Operation, correction: &dyn AttributeCorrection) -> Option<(Operation, Vec<String>)> {
    let needs = |name: &str, value: &Value| correction.covers(name) && correction.check_value(name, value);
    match operation {
        Operation::Add {
            address,
            attributes,
        } => {
            let flagged: Vec<String> = attributes
                .iter()
                .filter(|(name, value)| needs(name.as_str(), value))
                .map(|(name, _)| name.clone())
                .collect();
            if flagged.is_empty() {
                return None;
            }
            let corrected: Attributes = attributes
                .iter()
                .map(|(name, value)| {
                    let value = if needs(name.as_str(), value) {
                        correction.correct_value(name, value)
                    } else {
                        value.clone()
                    };
                    (name.clone(), value)
                })
                .collect();
            Some((Operation::add(address.clone(), corrected), flagged))
        }
        Operation::WriteAttribute {
            address,
            name,
            value,
        } if needs(name.as_str(), value) => Some((
            Operation::WriteAttribute {
                address: address.clone(),
                name: name.clone(),
                value: correction.correct_value(name, value),
            },
            vec![name.clone()],
        )),
        _ => None,
    }
}
