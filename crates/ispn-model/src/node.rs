//! Model tree
//!
//! A [`ModelNode`] is one configuration resource: its address, its defined
//! attributes and its ordered children. Trees are values; transformations
//! build new trees and never touch their input.

use crate::error::ModelError;
use crate::path::{PathAddress, PathElement};
use crate::value::{Attributes, Value};

/// A configuration resource and its subtree
///
/// # Invariants
/// - every child's address is this node's address plus one element
/// - sibling addresses are unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNode {
    address: PathAddress,
    attributes: Attributes,
    children: Vec<ModelNode>,
}

impl ModelNode {
    /// Create an empty resource at `address`
    #[inline]
    #[must_use]
    pub fn new(address: PathAddress) -> Self {
        Self {
            address,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Create a resource with attributes and no children
    #[inline]
    #[must_use]
    pub fn with_attributes(address: PathAddress, attributes: Attributes) -> Self {
        Self {
            address,
            attributes,
            children: Vec::new(),
        }
    }

    /// Resource address
    #[inline]
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// Last address element, `None` for the model root
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&PathElement> {
        self.address.last()
    }

    /// Defined attributes, in definition order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Children, in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ModelNode] {
        &self.children
    }

    /// Get an attribute value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Check if an attribute is defined
    #[inline]
    #[must_use]
    pub fn has_defined(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Define (or redefine) an attribute
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder form of [`ModelNode::set`]
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Undefine an attribute, returning its previous value
    #[inline]
    pub fn undefine(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(name)
    }

    /// Direct child with the given element
    #[must_use]
    pub fn child(&self, element: &PathElement) -> Option<&ModelNode> {
        self.children
            .iter()
            .find(|c| c.element() == Some(element))
    }

    /// Mutable direct child with the given element
    #[must_use]
    pub fn child_mut(&mut self, element: &PathElement) -> Option<&mut ModelNode> {
        self.children
            .iter_mut()
            .find(|c| c.element() == Some(element))
    }

    /// Direct children whose element matches a (possibly wildcard) pattern
    pub fn children_matching<'a>(
        &'a self,
        pattern: &'a PathElement,
    ) -> impl Iterator<Item = &'a ModelNode> + 'a {
        self.children
            .iter()
            .filter(move |c| c.element().is_some_and(|e| pattern.matches(e)))
    }

    /// Append a child resource
    ///
    /// # Errors
    /// - [`ModelError::NotAChild`] if the child's address does not extend
    ///   this node's address by exactly one element
    /// - [`ModelError::DuplicateChild`] if a sibling already has that address
    pub fn add_child(&mut self, child: ModelNode) -> Result<(), ModelError> {
        if !self.address.is_parent_of(&child.address) {
            return Err(ModelError::NotAChild {
                parent: self.address.clone(),
                child: child.address,
            });
        }
        if self.children.iter().any(|c| c.address == child.address) {
            return Err(ModelError::DuplicateChild(child.address));
        }
        self.children.push(child);
        Ok(())
    }

    /// Create and append an empty child resource, returning it for population
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateChild`] if the child already exists
    pub fn add_child_at(&mut self, element: PathElement) -> Result<&mut ModelNode, ModelError> {
        let child = ModelNode::new(self.address.append(element));
        self.add_child(child)?;
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    /// Remove a direct child, returning it
    pub fn remove_child(&mut self, element: &PathElement) -> Option<ModelNode> {
        let index = self
            .children
            .iter()
            .position(|c| c.element() == Some(element))?;
        Some(self.children.remove(index))
    }

    /// Find a descendant (or self) by absolute address
    #[must_use]
    pub fn find(&self, address: &PathAddress) -> Option<&ModelNode> {
        if *address == self.address {
            return Some(self);
        }
        if address.len() <= self.address.len()
            || address.elements()[..self.address.len()] != *self.address.elements()
        {
            return None;
        }
        let next = &address.elements()[self.address.len()];
        self.child(next)?.find(address)
    }

    /// Mutable variant of [`ModelNode::find`]
    #[must_use]
    pub fn find_mut(&mut self, address: &PathAddress) -> Option<&mut ModelNode> {
        if *address == self.address {
            return Some(self);
        }
        if address.len() <= self.address.len()
            || address.elements()[..self.address.len()] != *self.address.elements()
        {
            return None;
        }
        let next = address.elements()[self.address.len()].clone();
        self.child_mut(&next)?.find_mut(address)
    }

    /// Visit this node and every descendant, parent before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ModelNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Total number of resources in this subtree
    #[must_use]
    pub fn resource_count(&self) -> usize {
        1 + self.children.iter().map(ModelNode::resource_count).sum::<usize>()
    }

    /// Split into parts
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (PathAddress, Attributes, Vec<ModelNode>) {
        (self.address, self.attributes, self.children)
    }

    /// Reassemble from parts produced by a transformation
    ///
    /// # Errors
    /// Same conditions as [`ModelNode::add_child`] for every child
    pub fn from_parts(
        address: PathAddress,
        attributes: Attributes,
        children: Vec<ModelNode>,
    ) -> Result<Self, ModelError> {
        let mut node = Self::with_attributes(address, attributes);
        for child in children {
            node.add_child(child)?;
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn container() -> ModelNode {
        let address: PathAddress = "/subsystem=infinispan/cache-container=maximal"
            .parse()
            .unwrap();
        ModelNode::new(address).with("default-cache", "local")
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let node = container().with("statistics-enabled", true).with("aliases", vec!["a"]);
        let names: Vec<_> = node.attributes().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["default-cache", "statistics-enabled", "aliases"]);
    }

    #[test]
    fn add_child_rejects_foreign_address() {
        let mut node = container();
        let stranger = ModelNode::new("/subsystem=jgroups/stack=udp".parse().unwrap());
        assert!(matches!(node.add_child(stranger), Err(ModelError::NotAChild { .. })));
    }

    #[test]
    fn add_child_rejects_duplicates() {
        let mut node = container();
        node.add_child_at(PathElement::new("local-cache", "local")).unwrap();
        let again = node.add_child_at(PathElement::new("local-cache", "local"));
        assert!(matches!(again, Err(ModelError::DuplicateChild(_))));
    }

    #[test]
    fn find_descends_by_address() {
        let mut node = container();
        node.add_child_at(PathElement::new("local-cache", "local"))
            .unwrap()
            .add_child_at(PathElement::new("component", "transaction"))
            .unwrap()
            .set("mode", "BATCH");

        let target = node
            .address()
            .append(PathElement::new("local-cache", "local"))
            .append(PathElement::new("component", "transaction"));
        assert_eq!(node.find(&target).unwrap().get("mode"), Some(&Value::from("BATCH")));
        assert!(node.find(&"/subsystem=other".parse().unwrap()).is_none());
        assert_eq!(node.resource_count(), 3);
    }

    #[test]
    fn walk_is_pre_order() {
        let mut node = container();
        node.add_child_at(PathElement::new("local-cache", "a")).unwrap();
        node.add_child_at(PathElement::new("local-cache", "b")).unwrap();

        let mut seen = Vec::new();
        node.walk(&mut |n| seen.push(n.element().unwrap().value().to_string()));
        assert_eq!(seen, vec!["maximal", "a", "b"]);
    }

    #[test]
    fn undefine_preserves_order_of_rest() {
        let mut node = container().with("jndi-name", "java:x").with("module", "m");
        assert_eq!(node.undefine("jndi-name"), Some(Value::from("java:x")));
        let names: Vec<_> = node.attributes().keys().cloned().collect();
        assert_eq!(names, vec!["default-cache".to_string(), "module".to_string()]);
    }
}
