//! Tree transformation
//!
//! [`TransformationEngine`] walks a model tree against a target version and
//! decides, attribute by attribute, whether each value passes through, is
//! renamed, rewritten, discarded or rejected.
//!
//! # Algorithm
//!
//! 1. A target that does not precede the current version is the identity.
//! 2. Nodes are visited depth first, parent before children.
//! 3. A resource type unknown at the target is rejected with its subtree.
//! 4. For every attribute, applicable rejection rules run first; a rejected
//!    attribute is dropped from the output. Conversions run otherwise, and an
//!    attribute with no applicable rule is dropped when its definition is not
//!    valid at the target. A rename onto a name that already holds a
//!    different value is rejected; an equal value is kept once.
//! 5. Resource transformers run last and see the original node.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ispn_model::{
    Attributes, MigrationRule, ModelNode, ModelVersion, PathAddress, ResourceDescription,
    RewriteFn, SchemaError, SchemaRegistry, Value, VersionRegistry,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::rejection::{Rejection, RejectionReport};

/// Engine policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Run every rewrite twice and fail if the results differ
    pub verify_determinism: bool,

    /// Abort on the first rejection instead of collecting it
    pub fatal_rejections: bool,
}

/// Outcome of transforming a tree
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult {
    transformed: ModelNode,
    rejections: BTreeSet<Rejection>,
    target: ModelVersion,
}

impl TransformationResult {
    /// Transformed tree
    #[inline]
    #[must_use]
    pub fn transformed(&self) -> &ModelNode {
        &self.transformed
    }

    /// Rejections, ordered by address
    #[inline]
    #[must_use]
    pub fn rejections(&self) -> &BTreeSet<Rejection> {
        &self.rejections
    }

    /// Target version
    #[inline]
    #[must_use]
    pub fn target(&self) -> &ModelVersion {
        &self.target
    }

    /// Check if nothing was rejected
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Serializable rejection summary
    #[must_use]
    pub fn report(&self) -> RejectionReport {
        RejectionReport::new(&self.target, &self.rejections)
    }

    /// Split into tree and rejections
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (ModelNode, BTreeSet<Rejection>) {
        (self.transformed, self.rejections)
    }
}

/// Decision taken for one attribute
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttributeOutcome {
    /// Emit under `name` with `value`
    Keep {
        name: String,
        value: Value,
    },
    /// Drop silently
    Dropped,
    /// Drop and record
    Rejected(Rejection),
}

/// Converted attributes of one resource
#[derive(Debug, Default)]
pub(crate) struct ConvertedAttributes {
    attributes: Attributes,
    /// Output name to the attribute renamed onto it
    renamed: HashMap<String, String>,
}

impl ConvertedAttributes {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: Attributes::with_capacity(capacity),
            renamed: HashMap::new(),
        }
    }

    /// Emit `value` under `name`, converted from attribute `source`
    ///
    /// Returns the renamed attribute that lost when `name` already holds a
    /// different value. The value kept is the one not renamed.
    pub(crate) fn insert(&mut self, source: &str, name: String, value: Value) -> Option<String> {
        let is_rename = source != name;
        match self.attributes.get_mut(&name) {
            None => {
                if is_rename {
                    self.renamed.insert(name.clone(), source.to_string());
                }
                self.attributes.insert(name, value);
                None
            }
            Some(existing) if *existing == value => None,
            Some(_) if is_rename => Some(source.to_string()),
            Some(existing) => {
                *existing = value;
                self.renamed.remove(&name)
            }
        }
    }

    pub(crate) fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

/// Model transformation engine
///
/// Shares its registries read-only; one engine serves any number of
/// concurrent transformations.
#[derive(Debug, Clone)]
pub struct TransformationEngine {
    versions: Arc<VersionRegistry>,
    schema: Arc<SchemaRegistry>,
    current: ModelVersion,
    options: TransformOptions,
}

impl TransformationEngine {
    /// Create an engine transforming models authored at `current`
    #[must_use]
    pub fn new(
        versions: Arc<VersionRegistry>,
        schema: Arc<SchemaRegistry>,
        current: ModelVersion,
    ) -> Self {
        Self {
            versions,
            schema,
            current,
            options: TransformOptions::default(),
        }
    }

    /// Replace the engine policies
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    /// Version registry
    #[inline]
    #[must_use]
    pub fn versions(&self) -> &VersionRegistry {
        &self.versions
    }

    /// Schema registry
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Version the input models are authored at
    #[inline]
    #[must_use]
    pub fn current(&self) -> &ModelVersion {
        &self.current
    }

    /// Engine policies
    #[inline]
    #[must_use]
    pub fn options(&self) -> TransformOptions {
        self.options
    }

    /// Check if a model must be transformed to reach `target`
    #[inline]
    #[must_use]
    pub fn requires_transformation(&self, target: &ModelVersion) -> bool {
        self.versions.requires_transformation(&self.current, target)
    }

    /// Transform `tree` to the version registered under `target_id`
    ///
    /// # Errors
    /// [`TransformError::Version`] for an unknown id, otherwise as
    /// [`TransformationEngine::transform`]
    pub fn transform_to(&self, tree: &ModelNode, target_id: &str) -> Result<TransformationResult> {
        let target = self.versions.get(target_id)?.clone();
        self.transform(tree, &target)
    }

    /// Transform `tree` to `target`
    ///
    /// If the root resource itself is rejected, the transformed tree is an
    /// empty node at the root address.
    ///
    /// # Errors
    /// - [`TransformError::Schema`] on an undescribed resource or attribute
    /// - [`TransformError::Rewrite`] / [`TransformError::Resource`] when a
    ///   conversion fails
    /// - [`TransformError::NonDeterministicRewrite`] with `verify_determinism`
    /// - [`TransformError::FatalRejection`] with `fatal_rejections`
    pub fn transform(&self, tree: &ModelNode, target: &ModelVersion) -> Result<TransformationResult> {
        if !self.requires_transformation(target) {
            tracing::debug!("{} needs no transformation to {target}", tree.address());
            return Ok(TransformationResult {
                transformed: tree.clone(),
                rejections: BTreeSet::new(),
                target: target.clone(),
            });
        }

        let span = tracing::debug_span!("transform", root = %tree.address(), %target);
        let _guard = span.enter();

        let mut rejections = BTreeSet::new();
        let transformed = self
            .transform_node(tree, target, &mut rejections)?
            .unwrap_or_else(|| ModelNode::new(tree.address().clone()));

        tracing::debug!(
            "transformed {} resource(s), {} rejection(s)",
            tree.resource_count(),
            rejections.len()
        );
        Ok(TransformationResult {
            transformed,
            rejections,
            target: target.clone(),
        })
    }

    fn transform_node(
        &self,
        node: &ModelNode,
        target: &ModelVersion,
        rejections: &mut BTreeSet<Rejection>,
    ) -> Result<Option<ModelNode>> {
        let description = self.describe(node.address())?;
        if !description.is_valid_at(target) {
            self.reject(rejections, Rejection::resource(node.address().clone()))?;
            return Ok(None);
        }

        let mut converted = ConvertedAttributes::with_capacity(node.attributes().len());
        for (source, value) in node.attributes() {
            match self.convert_attribute(description, node.address(), source, value, target)? {
                AttributeOutcome::Keep { name, value } => {
                    self.keep(&mut converted, node.address(), source, name, value, rejections)?;
                }
                AttributeOutcome::Dropped => {}
                AttributeOutcome::Rejected(rejection) => self.reject(rejections, rejection)?,
            }
        }
        let mut attributes = converted.into_attributes();
        self.apply_resource_transformers(description, node, target, &mut attributes)?;

        let mut children = Vec::with_capacity(node.children().len());
        for child in node.children() {
            if let Some(transformed) = self.transform_node(child, target, rejections)? {
                children.push(transformed);
            }
        }

        Ok(Some(ModelNode::from_parts(
            node.address().clone(),
            attributes,
            children,
        )?))
    }

    /// Resolve the description of the resource at `address`
    pub(crate) fn describe(&self, address: &PathAddress) -> Result<&ResourceDescription> {
        address
            .last()
            .and_then(|element| self.schema.resolve(element))
            .ok_or_else(|| SchemaError::UnknownResource(address.clone()).into())
    }

    /// Decide what happens to one attribute at `target`
    pub(crate) fn convert_attribute(
        &self,
        description: &ResourceDescription,
        address: &PathAddress,
        name: &str,
        value: &Value,
        target: &ModelVersion,
    ) -> Result<AttributeOutcome> {
        let definition = self
            .schema
            .lookup(description.name(), name)
            .ok_or_else(|| SchemaError::UnknownAttribute {
                address: address.clone(),
                resource_type: description.name().to_string(),
                name: name.to_string(),
            })?;
        let rules: Vec<&MigrationRule> = definition.migrations_for(target).collect();

        for rule in &rules {
            if let MigrationRule::RejectIf { predicate, reason } = rule {
                if predicate(value) {
                    tracing::debug!("{address} [{name}={value}] cannot be expressed at {target}");
                    return Ok(AttributeOutcome::Rejected(Rejection::attribute(
                        address.clone(),
                        name,
                        reason.clone(),
                    )));
                }
            }
        }

        let mut out_name = name.to_string();
        let mut out_value = value.clone();
        let mut converted = false;
        for rule in rules {
            match rule {
                MigrationRule::RejectIf { .. } => {}
                MigrationRule::Discard => {
                    tracing::info!("discarding {address} [{name}] at {target}");
                    return Ok(AttributeOutcome::Dropped);
                }
                MigrationRule::Rename(new_name) => {
                    tracing::debug!("renaming {address} [{out_name}] to '{new_name}'");
                    out_name.clone_from(new_name);
                    converted = true;
                }
                MigrationRule::Rewrite(rewrite) => {
                    out_value = self.rewrite(rewrite, address, name, &out_value)?;
                    converted = true;
                }
            }
        }

        if !converted && !definition.is_valid_at(target) {
            tracing::info!("discarding {address} [{name}]: not defined at {target}");
            return Ok(AttributeOutcome::Dropped);
        }
        if !converted {
            tracing::debug!("passing {address} [{name}] through");
        }
        Ok(AttributeOutcome::Keep {
            name: out_name,
            value: out_value,
        })
    }

    fn rewrite(
        &self,
        rewrite: &RewriteFn,
        address: &PathAddress,
        attribute: &str,
        value: &Value,
    ) -> Result<Value> {
        let run = || {
            rewrite(value).map_err(|e| TransformError::Rewrite {
                address: address.clone(),
                attribute: attribute.to_string(),
                message: e.0,
            })
        };
        let first = run()?;
        if self.options.verify_determinism {
            let second = run()?;
            if first != second {
                return Err(TransformError::NonDeterministicRewrite {
                    address: address.clone(),
                    attribute: attribute.to_string(),
                    first,
                    second,
                });
            }
        }
        tracing::debug!("rewrote {address} [{attribute}]: {value} -> {first}");
        Ok(first)
    }

    pub(crate) fn apply_resource_transformers(
        &self,
        description: &ResourceDescription,
        original: &ModelNode,
        target: &ModelVersion,
        attributes: &mut Attributes,
    ) -> Result<()> {
        for transformer in description.transformers_for(target) {
            tracing::debug!("{} at {}", transformer.describe(), original.address());
            transformer
                .transform(original, attributes)
                .map_err(|e| TransformError::Resource {
                    address: original.address().clone(),
                    transformer: transformer.describe(),
                    message: e.0,
                })?;
        }
        Ok(())
    }

    /// Emit a converted attribute, rejecting a rename that collides with a
    /// different value
    pub(crate) fn keep(
        &self,
        converted: &mut ConvertedAttributes,
        address: &PathAddress,
        source: &str,
        name: String,
        value: Value,
        rejections: &mut BTreeSet<Rejection>,
    ) -> Result<()> {
        let output = name.clone();
        match converted.insert(source, name, value) {
            Some(renamed) => self.reject(
                rejections,
                Rejection::attribute(
                    address.clone(),
                    renamed,
                    format!("renamed to '{output}', which holds a different value"),
                ),
            ),
            None => Ok(()),
        }
    }

    /// Record a rejection, or abort when rejections are fatal
    pub(crate) fn reject(
        &self,
        rejections: &mut BTreeSet<Rejection>,
        rejection: Rejection,
    ) -> Result<()> {
        if self.options.fatal_rejections {
            return Err(TransformError::FatalRejection(rejection));
        }
        tracing::warn!("{rejection}");
        rejections.insert(rejection);
        Ok(())
    }
}
