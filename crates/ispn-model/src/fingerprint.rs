//! Structural fingerprints
//!
//! Provides [`Fingerprint`], a SHA-256 digest of a canonical rendering of a
//! model tree. Two structurally equal trees always share a fingerprint, so
//! repeated runs can be compared without keeping both trees around.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::node::ModelNode;

/// A 32-byte tree digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest a tree
    #[must_use]
    pub fn of(tree: &ModelNode) -> Self {
        let mut hasher = Sha256::new();
        feed(&mut hasher, tree);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

fn feed(hasher: &mut Sha256, node: &ModelNode) {
    hasher.update(node.address().to_string().as_bytes());
    hasher.update([0]);
    for (name, value) in node.attributes() {
        hasher.update(name.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.to_string().as_bytes());
        hasher.update([0]);
    }
    hasher.update([1]);
    for child in node.children() {
        feed(hasher, child);
    }
    hasher.update([2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathElement;

    fn tree(stats: bool) -> ModelNode {
        let mut root = ModelNode::new("/subsystem=infinispan".parse().unwrap());
        root.add_child_at(PathElement::new("cache-container", "c"))
            .unwrap()
            .set("statistics-enabled", stats);
        root
    }

    #[test]
    fn equal_trees_share_fingerprint() {
        assert_eq!(Fingerprint::of(&tree(true)), Fingerprint::of(&tree(true)));
    }

    #[test]
    fn attribute_change_changes_fingerprint() {
        assert_ne!(Fingerprint::of(&tree(true)), Fingerprint::of(&tree(false)));
    }

    #[test]
    fn short_form_is_sixteen_hex_chars() {
        let fp = Fingerprint::of(&tree(true));
        assert_eq!(fp.short().len(), 16);
        assert!(fp.to_string().starts_with(&fp.short()));
    }
}
