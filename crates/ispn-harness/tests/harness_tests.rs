use std::collections::BTreeSet;

use ispn_harness::{
    ChangeToTrue, CompareOptions, CompatibilityHarness, DifferenceKind, ExpectedCorrection,
    FailedOperationConfig, HarnessError,
};
use ispn_model::{ModelNode, ModelVersion, Operation, PathElement};
use ispn_subsystem::{catalog, model_fixer, InfinispanModel, LegacyRelease};
use ispn_test_utils::{addr, maximal_tree, registries, reject_operations, reject_tree};
use ispn_transform::{Rejection, TransformOptions, TransformationEngine};
use pretty_assertions::assert_eq;

fn harness() -> CompatibilityHarness {
    let (versions, schema) = registries();
    let engine = TransformationEngine::new(versions, schema, InfinispanModel::CURRENT.version())
        .with_options(TransformOptions {
            verify_determinism: true,
            fatal_rejections: false,
        });
    CompatibilityHarness::new(engine)
}

const CONTAINER: &str = "/subsystem=infinispan/cache-container=*";

/// What each legacy release refuses in the rejection configuration
fn failed_operations(target: &ModelVersion) -> FailedOperationConfig {
    let mut config = FailedOperationConfig::new();
    if InfinispanModel::Version2_0_0.requires_transformation(target) {
        for cache in catalog::resource::CLUSTERED_CACHES {
            config = config
                .with(
                    addr(&format!("{CONTAINER}/{cache}=*/component=backups/backup=*")),
                    ExpectedCorrection::RejectedResource,
                )
                .with(
                    addr(&format!("{CONTAINER}/{cache}=*/component=backup-for")),
                    ExpectedCorrection::RejectedResource,
                );
        }
    }
    if InfinispanModel::Version1_5_0.requires_transformation(target) {
        let statistics = || ExpectedCorrection::attributes(ChangeToTrue::new(["statistics-enabled"]));
        config = config.with(addr(CONTAINER), statistics());
        for cache in catalog::resource::CACHES {
            config = config.with(addr(&format!("{CONTAINER}/{cache}=*")), statistics());
        }
    }
    config
}

fn assertion(err: HarnessError) -> ispn_harness::HarnessAssertionFailure {
    match err {
        HarnessError::Assertion(failure) => failure,
        HarnessError::Transform(err) => panic!("engine failed: {err}"),
    }
}

#[test]
fn maximal_configuration_boots_on_every_legacy_release() {
    let harness = harness();
    for release in LegacyRelease::ALL {
        let target = release.model().version();
        let fixer = model_fixer(release.model());
        let fixed = harness
            .check_model_transformation(&maximal_tree(), &target, fixer.as_deref())
            .unwrap_or_else(|e| panic!("{release}: {e}"));
        assert!(fixed.find(&addr("/subsystem=infinispan/cache-container=maximal")).is_some());
    }
}

#[test]
fn rejected_operations_match_every_legacy_release() {
    let harness = harness();
    let operations = reject_operations();
    for release in LegacyRelease::ALL {
        let target = release.model().version();
        harness
            .assert_rejects_operations(&operations, &target, &failed_operations(&target))
            .unwrap_or_else(|e| panic!("{release}: {e}"));
    }
}

#[test]
fn unexpected_rejections_are_all_reported() {
    let target = InfinispanModel::Version1_6_0.version();
    let err = harness()
        .assert_rejects_operations(&reject_operations(), &target, &FailedOperationConfig::new())
        .unwrap_err();
    let failure = assertion(err);
    assert_eq!(failure.differences.len(), 6);
    assert!(failure
        .differences
        .iter()
        .all(|d| matches!(d.kind, DifferenceKind::UnexpectedRejection(ref r) if r.is_resource())));
}

#[test]
fn accepted_operation_fails_a_rejection_expectation() {
    let target = InfinispanModel::Version2_0_0.version();
    let local = addr("/subsystem=infinispan/cache-container=maximal/local-cache=local");
    let config = FailedOperationConfig::new().with(local.clone(), ExpectedCorrection::RejectedResource);
    let operations = vec![Operation::write_attribute(local.clone(), "statistics-enabled", true)];

    let failure = assertion(
        harness()
            .assert_rejects_operations(&operations, &target, &config)
            .unwrap_err(),
    );
    assert_eq!(failure.differences.len(), 1);
    assert_eq!(failure.differences[0].address, local);
    assert!(matches!(failure.differences[0].kind, DifferenceKind::NotRejected { .. }));
}

#[test]
fn correction_of_a_value_needing_none_is_accepted() {
    let target = InfinispanModel::Version1_4_1.version();
    let container = addr("/subsystem=infinispan/cache-container=maximal");
    let config = failed_operations(&target);
    let operations = vec![
        Operation::write_attribute(container.clone(), "statistics-enabled", true),
        Operation::write_attribute(container, "statistics-enabled", false),
    ];
    harness()
        .assert_rejects_operations(&operations, &target, &config)
        .unwrap();
}

#[test]
fn backups_are_dropped_below_2_0_0() {
    let target = InfinispanModel::Version1_6_0.version();
    let mut expected = reject_tree();
    let mut rejections = BTreeSet::new();
    for cache in ["distributed-cache=dist", "replicated-cache=repl"] {
        let cache_address = addr(&format!("/subsystem=infinispan/cache-container=maximal/{cache}"));
        let node = expected.find_mut(&cache_address).unwrap();
        let backups = node.child_mut(&catalog::component_path("backups")).unwrap();
        for site in ["NYC", "LON"] {
            let site = PathElement::new("backup", site);
            let removed = backups.remove_child(&site).unwrap();
            rejections.insert(Rejection::resource(removed.address().clone()));
        }
        let removed = node
            .remove_child(&catalog::component_path("backup-for"))
            .unwrap();
        rejections.insert(Rejection::resource(removed.address().clone()));
    }

    let result = harness()
        .assert_transforms(&reject_tree(), &target, &expected, &rejections)
        .unwrap();
    assert_eq!(result.rejections().len(), 6);
}

#[test]
fn tree_mismatch_lists_every_difference() {
    let target = InfinispanModel::Version1_6_0.version();
    let failure = assertion(
        harness()
            .assert_transforms(&reject_tree(), &target, &reject_tree(), &BTreeSet::new())
            .unwrap_err(),
    );
    let missing_children = failure
        .differences
        .iter()
        .filter(|d| matches!(d.kind, DifferenceKind::MissingChild(_)))
        .count();
    let unexpected = failure
        .differences
        .iter()
        .filter(|d| matches!(d.kind, DifferenceKind::UnexpectedRejection(_)))
        .count();
    assert_eq!(missing_children, 6);
    assert_eq!(unexpected, 6);
    assert!(failure.to_string().starts_with("transform to 1.6.0: 12 difference(s)"));
}

fn reversed_caches(tree: &ModelNode) -> ModelNode {
    let mut tree = tree.clone();
    let container = tree
        .child_mut(&PathElement::new("cache-container", "maximal"))
        .unwrap();
    let (address, attributes, mut children) = container.clone().into_parts();
    children.reverse();
    *container = ModelNode::from_parts(address, attributes, children).unwrap();
    tree
}

#[test]
fn sibling_order_is_checked_unless_relaxed() {
    let target = InfinispanModel::Version2_0_0.version();
    let expected = reversed_caches(&reject_tree());

    let failure = assertion(
        harness()
            .assert_transforms(&reject_tree(), &target, &expected, &BTreeSet::new())
            .unwrap_err(),
    );
    assert_eq!(failure.differences.len(), 1);
    assert!(matches!(failure.differences[0].kind, DifferenceKind::ChildOrder { .. }));

    let relaxed = harness().with_options(CompareOptions {
        ignore_sibling_order: true,
    });
    relaxed
        .assert_transforms(&reject_tree(), &target, &expected, &BTreeSet::new())
        .unwrap();
}

#[derive(Debug)]
struct RestoreCapacityFactor;

impl ispn_model::ModelFixer for RestoreCapacityFactor {
    fn fix(&self, mut model: ModelNode, _version: &ModelVersion) -> ModelNode {
        let dist = addr("/subsystem=infinispan/cache-container=maximal/distributed-cache=dist");
        if let Some(cache) = model.find_mut(&dist) {
            cache.set("capacity-factor", 2);
        }
        model
    }
}

#[test]
fn fixer_output_must_boot_at_target() {
    let target = InfinispanModel::Version1_6_0.version();
    let failure = assertion(
        harness()
            .check_model_transformation(&maximal_tree(), &target, Some(&RestoreCapacityFactor))
            .unwrap_err(),
    );
    assert!(failure
        .differences
        .iter()
        .any(|d| matches!(d.kind, DifferenceKind::Violation(ref m) if m.contains("capacity-factor"))));
    assert!(failure
        .differences
        .iter()
        .any(|d| matches!(d.kind, DifferenceKind::MissingAttribute { ref name, .. } if name == "capacity-factor")));
}
