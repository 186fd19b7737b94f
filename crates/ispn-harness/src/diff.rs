//! Structural comparison of trees and rejection sets

use std::collections::BTreeSet;

use ispn_model::{ModelNode, PathElement};
use ispn_transform::Rejection;

use crate::error::{Difference, DifferenceKind};

/// Tree comparison settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Accept children in any order
    pub ignore_sibling_order: bool,
}

/// Every difference between `expected` and `actual`, attribute by attribute
/// and child by child
#[must_use]
pub fn diff_trees(expected: &ModelNode, actual: &ModelNode, options: CompareOptions) -> Vec<Difference> {
    let mut out = Vec::new();
    if expected.address() != actual.address() {
        out.push(Difference::new(
            expected.address().clone(),
            DifferenceKind::AddressMismatch {
                actual: actual.address().clone(),
            },
        ));
        return out;
    }
    diff_node(expected, actual, options, &mut out);
    out
}

fn diff_node(expected: &ModelNode, actual: &ModelNode, options: CompareOptions, out: &mut Vec<Difference>) {
    let address = expected.address();
    let mut push = |kind| out.push(Difference::new(address.clone(), kind));

    for (name, value) in expected.attributes() {
        match actual.get(name) {
            None => push(DifferenceKind::MissingAttribute {
                name: name.clone(),
                expected: value.clone(),
            }),
            Some(found) if found != value => push(DifferenceKind::AttributeMismatch {
                name: name.clone(),
                expected: value.clone(),
                actual: found.clone(),
            }),
            Some(_) => {}
        }
    }
    for (name, value) in actual.attributes() {
        if !expected.has_defined(name) {
            push(DifferenceKind::UnexpectedAttribute {
                name: name.clone(),
                actual: value.clone(),
            });
        }
    }

    let element_of = |node: &ModelNode| node.element().cloned();
    let expected_order: Vec<PathElement> = expected.children().iter().filter_map(element_of).collect();
    let actual_order: Vec<PathElement> = actual.children().iter().filter_map(element_of).collect();

    for element in &expected_order {
        if actual.child(element).is_none() {
            push(DifferenceKind::MissingChild(element.clone()));
        }
    }
    for element in &actual_order {
        if expected.child(element).is_none() {
            push(DifferenceKind::UnexpectedChild(element.clone()));
        }
    }

    if !options.ignore_sibling_order {
        let common = |order: &[PathElement], other: &ModelNode| -> Vec<PathElement> {
            order
                .iter()
                .filter(|e| other.child(e).is_some())
                .cloned()
                .collect()
        };
        let expected_common = common(&expected_order, actual);
        let actual_common = common(&actual_order, expected);
        if expected_common != actual_common {
            push(DifferenceKind::ChildOrder {
                expected: expected_common,
                actual: actual_common,
            });
        }
    }

    for child in expected.children() {
        if let Some(other) = child.element().and_then(|e| actual.child(e)) {
            diff_node(child, other, options, out);
        }
    }
}

/// Rejections missing from or unexpected in `actual`, compared as sets
#[must_use]
pub fn diff_rejections(expected: &BTreeSet<Rejection>, actual: &BTreeSet<Rejection>) -> Vec<Difference> {
    let missing = expected.difference(actual).map(|r| {
        Difference::new(r.address.clone(), DifferenceKind::MissingRejection(r.clone()))
    });
    let unexpected = actual.difference(expected).map(|r| {
        Difference::new(r.address.clone(), DifferenceKind::UnexpectedRejection(r.clone()))
    });
    missing.chain(unexpected).collect()
}
