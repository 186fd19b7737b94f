use ispn_model::{Fingerprint, ModelDocument, ModelNode, Operation, PathAddress, PathElement};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn tree_with(names: &[String]) -> ModelNode {
    let mut root = ModelNode::new("/subsystem=infinispan".parse().unwrap());
    for (i, name) in names.iter().enumerate() {
        let container = root
            .add_child_at(PathElement::new("cache-container", name))
            .unwrap();
        container.set("statistics-enabled", i % 2 == 0);
        container
            .add_child_at(PathElement::new("local-cache", "local"))
            .unwrap();
    }
    root
}

proptest! {
    #[test]
    fn prop_address_text_round_trips(
        segments in proptest::collection::vec((segment(), segment()), 0..6)
    ) {
        let address = PathAddress::new(
            segments.iter().map(|(k, v)| PathElement::new(k, v)).collect(),
        );
        let parsed: PathAddress = address.to_string().parse().unwrap();
        prop_assert_eq!(parsed, address);
    }

    #[test]
    fn prop_document_form_preserves_fingerprint(
        names in proptest::collection::btree_set(segment(), 0..5)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let tree = tree_with(&names);
        let document = ModelDocument::from_node(&tree).unwrap();
        let json = document.to_json().unwrap();
        let rebuilt = ModelDocument::from_json(&json)
            .unwrap()
            .into_node(&PathAddress::root())
            .unwrap();
        prop_assert_eq!(Fingerprint::of(&rebuilt), Fingerprint::of(&tree));
        prop_assert_eq!(rebuilt, tree);
    }
}

#[test]
fn describe_covers_every_resource() {
    let names = vec!["a".to_string(), "b".to_string()];
    let tree = tree_with(&names);
    let ops = Operation::describe(&tree);
    assert_eq!(ops.len(), tree.resource_count());
    assert!(ops.iter().all(|op| op.name() == "add"));
    assert_eq!(ops[0].address(), tree.address());
}
