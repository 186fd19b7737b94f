//! Attribute schema registry
//!
//! Data-driven description of every resource type of a subsystem: where the
//! resource lives ([`ResourceDescription`]), which attributes it carries
//! ([`AttributeDefinition`]) and how those attributes migrate to older
//! versions ([`MigrationRule`]).
//!
//! # Example
//!
//! ```rust
//! use ispn_model::{
//!     AttributeDefinition, MigrationRule, ModelVersion, PathElement,
//!     ResourceDescription, SchemaRegistry, Value, ValueType,
//! };
//!
//! let v1 = ModelVersion::new("1.4.1", 1);
//! let v2 = ModelVersion::new("1.5.0", 2);
//!
//! let mut schema = SchemaRegistry::new();
//! schema
//!     .define_resource(ResourceDescription::new(
//!         "cache-container",
//!         PathElement::wildcard("cache-container"),
//!         v1.clone(),
//!     ))
//!     .unwrap();
//! schema
//!     .define(
//!         "cache-container",
//!         AttributeDefinition::builder("statistics-enabled", ValueType::Bool, v2.clone())
//!             .default_value(false)
//!             .migrate_below(
//!                 v2,
//!                 MigrationRule::reject_unless(Value::Bool(true), "statistics are always enabled"),
//!             )
//!             .build(),
//!     )
//!     .unwrap();
//!
//! assert!(schema.attributes_valid_at("cache-container", &v1).is_empty());
//! ```

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::node::ModelNode;
use crate::path::PathElement;
use crate::value::{Attributes, Value, ValueType};
use crate::version::ModelVersion;

/// Failure raised by a rewrite function or a resource transformer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RuleError(pub String);

/// Pure value conversion used by [`MigrationRule::Rewrite`]
pub type RewriteFn = Arc<dyn Fn(&Value) -> Result<Value, RuleError> + Send + Sync>;

/// Predicate used by [`MigrationRule::RejectIf`]
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// How an attribute is carried to an older version
#[derive(Clone)]
pub enum MigrationRule {
    /// Move the value under another attribute name
    Rename(String),

    /// Replace the value; the function must be deterministic and free of I/O
    Rewrite(RewriteFn),

    /// Drop the attribute silently
    Discard,

    /// Reject the attribute when the predicate holds for its value
    RejectIf {
        /// Rejection test
        predicate: Predicate,
        /// Operator-facing reason
        reason: String,
    },
}

impl MigrationRule {
    /// Rename rule
    #[inline]
    #[must_use]
    pub fn rename(new_name: impl Into<String>) -> Self {
        Self::Rename(new_name.into())
    }

    /// Rewrite rule
    #[inline]
    #[must_use]
    pub fn rewrite<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, RuleError> + Send + Sync + 'static,
    {
        Self::Rewrite(Arc::new(f))
    }

    /// Rewrite rule replacing one specific value by another, leaving the rest
    #[must_use]
    pub fn replace_value(from: Value, to: Value) -> Self {
        Self::rewrite(move |value| {
            if *value == from {
                Ok(to.clone())
            } else {
                Ok(value.clone())
            }
        })
    }

    /// Rejection rule
    #[inline]
    #[must_use]
    pub fn reject_if<P>(predicate: P, reason: impl Into<String>) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::RejectIf {
            predicate: Arc::new(predicate),
            reason: reason.into(),
        }
    }

    /// Rejection rule for any value other than `expected`
    #[must_use]
    pub fn reject_unless(expected: Value, reason: impl Into<String>) -> Self {
        Self::reject_if(move |value| *value != expected, reason)
    }

    /// Check if this rule rejects
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RejectIf { .. })
    }

    /// Short rule name for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rename(_) => "rename",
            Self::Rewrite(_) => "rewrite",
            Self::Discard => "discard",
            Self::RejectIf { .. } => "reject-if",
        }
    }
}

impl Debug for MigrationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(name) => f.debug_tuple("Rename").field(name).finish(),
            Self::Rewrite(_) => f.write_str("Rewrite(<fn>)"),
            Self::Discard => f.write_str("Discard"),
            Self::RejectIf { reason, .. } => f
                .debug_struct("RejectIf")
                .field("reason", reason)
                .finish_non_exhaustive(),
        }
    }
}

/// A migration rule bounded by version
///
/// Applies only when the target version is strictly older than `below`.
#[derive(Debug, Clone)]
pub struct AttributeMigration {
    /// First version that no longer needs the rule
    pub below: ModelVersion,
    /// The rule
    pub rule: MigrationRule,
}

impl AttributeMigration {
    /// Check if the rule applies when transforming to `target`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, target: &ModelVersion) -> bool {
        self.below.requires_transformation(target)
    }
}

/// Immutable definition of one attribute of a resource type
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    value_type: ValueType,
    introduced_in: ModelVersion,
    removed_in: Option<ModelVersion>,
    deprecated: bool,
    default: Option<Value>,
    migrations: Vec<AttributeMigration>,
}

impl AttributeDefinition {
    /// Start building a definition
    #[inline]
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        value_type: ValueType,
        introduced_in: ModelVersion,
    ) -> AttributeDefinitionBuilder {
        AttributeDefinitionBuilder {
            definition: Self {
                name: name.into(),
                value_type,
                introduced_in,
                removed_in: None,
                deprecated: false,
                default: None,
                migrations: Vec::new(),
            },
        }
    }

    /// Attribute name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// First version defining the attribute
    #[inline]
    #[must_use]
    pub fn introduced_in(&self) -> &ModelVersion {
        &self.introduced_in
    }

    /// First version no longer defining the attribute
    #[inline]
    #[must_use]
    pub fn removed_in(&self) -> Option<&ModelVersion> {
        self.removed_in.as_ref()
    }

    /// Check if the attribute is deprecated in the current model
    #[inline]
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Default value used when the attribute is undefined
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// All migration rules, in definition order
    #[inline]
    #[must_use]
    pub fn migrations(&self) -> &[AttributeMigration] {
        &self.migrations
    }

    /// Rules applying when transforming to `target`
    pub fn migrations_for<'a>(
        &'a self,
        target: &'a ModelVersion,
    ) -> impl Iterator<Item = &'a MigrationRule> + 'a {
        self.migrations
            .iter()
            .filter(move |m| m.applies_to(target))
            .map(|m| &m.rule)
    }

    /// Check if `introduced_in <= version < removed_in`
    #[inline]
    #[must_use]
    pub fn is_valid_at(&self, version: &ModelVersion) -> bool {
        self.introduced_in <= *version && self.removed_in.as_ref().map_or(true, |r| version < r)
    }
}

/// Builder for [`AttributeDefinition`]
#[derive(Debug)]
#[must_use]
pub struct AttributeDefinitionBuilder {
    definition: AttributeDefinition,
}

impl AttributeDefinitionBuilder {
    /// Set the version that removed the attribute
    #[inline]
    pub fn removed_in(mut self, version: ModelVersion) -> Self {
        self.definition.removed_in = Some(version);
        self
    }

    /// Mark as deprecated
    #[inline]
    pub fn deprecated(mut self) -> Self {
        self.definition.deprecated = true;
        self
    }

    /// Set the default value
    #[inline]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.definition.default = Some(value.into());
        self
    }

    /// Attach a migration rule applying to versions older than `below`
    #[inline]
    pub fn migrate_below(mut self, below: ModelVersion, rule: MigrationRule) -> Self {
        self.definition.migrations.push(AttributeMigration { below, rule });
        self
    }

    /// Finish
    #[inline]
    #[must_use]
    pub fn build(self) -> AttributeDefinition {
        self.definition
    }
}

/// Whole-resource conversion to an older version
///
/// Runs after the attribute rules of a node, with access to the original
/// node (including its children), and may add or change attributes of the
/// transformed node.
pub trait ResourceTransformer: Send + Sync + Debug {
    /// Adjust the transformed attributes of `original`
    ///
    /// # Errors
    /// Returns error if the resource cannot be converted
    fn transform(&self, original: &ModelNode, attributes: &mut Attributes) -> Result<(), RuleError>;

    /// Describe the transformation
    fn describe(&self) -> String;
}

/// A resource transformer bounded by version
#[derive(Debug, Clone)]
pub struct BoundedTransformer {
    /// First version that no longer needs the transformer
    pub below: ModelVersion,
    /// The transformer
    pub transformer: Arc<dyn ResourceTransformer>,
}

/// Where a resource type lives and when it exists
#[derive(Debug, Clone)]
pub struct ResourceDescription {
    name: String,
    path: PathElement,
    introduced_in: ModelVersion,
    removed_in: Option<ModelVersion>,
    transformers: Vec<BoundedTransformer>,
}

impl ResourceDescription {
    /// Describe a resource type registered at `path`
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, path: PathElement, introduced_in: ModelVersion) -> Self {
        Self {
            name: name.into(),
            path,
            introduced_in,
            removed_in: None,
            transformers: Vec::new(),
        }
    }

    /// Set the version that removed the resource type
    #[inline]
    #[must_use]
    pub fn removed_in(mut self, version: ModelVersion) -> Self {
        self.removed_in = Some(version);
        self
    }

    /// Attach a resource transformer applying to versions older than `below`
    #[inline]
    #[must_use]
    pub fn transform_below(
        mut self,
        below: ModelVersion,
        transformer: Arc<dyn ResourceTransformer>,
    ) -> Self {
        self.transformers.push(BoundedTransformer { below, transformer });
        self
    }

    /// Resource type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration path (possibly a wildcard)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &PathElement {
        &self.path
    }

    /// First version defining the resource type
    #[inline]
    #[must_use]
    pub fn introduced_in(&self) -> &ModelVersion {
        &self.introduced_in
    }

    /// Transformers applying when transforming to `target`
    pub fn transformers_for<'a>(
        &'a self,
        target: &'a ModelVersion,
    ) -> impl Iterator<Item = &'a Arc<dyn ResourceTransformer>> + 'a {
        self.transformers
            .iter()
            .filter(move |t| t.below.requires_transformation(target))
            .map(|t| &t.transformer)
    }

    /// Check if the resource type exists at `version`
    #[inline]
    #[must_use]
    pub fn is_valid_at(&self, version: &ModelVersion) -> bool {
        self.introduced_in <= *version && self.removed_in.as_ref().map_or(true, |r| version < r)
    }
}

#[derive(Debug, Clone)]
struct ResourceSchema {
    description: ResourceDescription,
    attributes: IndexMap<String, AttributeDefinition>,
}

/// Catalog of resource types and their attributes
///
/// Built once at startup, then shared read-only.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    resources: IndexMap<String, ResourceSchema>,
    by_path: HashMap<PathElement, String>,
}

impl SchemaRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe a resource type
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateResource`] if the name or the
    /// registration path is taken
    pub fn define_resource(&mut self, description: ResourceDescription) -> Result<(), SchemaError> {
        if self.resources.contains_key(description.name()) {
            return Err(SchemaError::DuplicateResource(description.name));
        }
        if let Some(existing) = self.by_path.get(description.path()) {
            return Err(SchemaError::DuplicateResource(existing.clone()));
        }
        self.by_path
            .insert(description.path.clone(), description.name.clone());
        self.resources.insert(
            description.name.clone(),
            ResourceSchema {
                description,
                attributes: IndexMap::new(),
            },
        );
        Ok(())
    }

    /// Define an attribute of a resource type
    ///
    /// # Errors
    /// - [`SchemaError::UnknownResourceType`] if the type was never described
    /// - [`SchemaError::DuplicateAttribute`] if the name is taken
    pub fn define(
        &mut self,
        resource_type: &str,
        attribute: AttributeDefinition,
    ) -> Result<(), SchemaError> {
        let schema = self
            .resources
            .get_mut(resource_type)
            .ok_or_else(|| SchemaError::UnknownResourceType(resource_type.to_string()))?;
        if schema.attributes.contains_key(attribute.name()) {
            return Err(SchemaError::DuplicateAttribute {
                resource_type: resource_type.to_string(),
                name: attribute.name,
            });
        }
        schema.attributes.insert(attribute.name.clone(), attribute);
        Ok(())
    }

    /// Attributes of a resource type valid at `version`, in definition order
    #[must_use]
    pub fn attributes_valid_at(
        &self,
        resource_type: &str,
        version: &ModelVersion,
    ) -> Vec<&AttributeDefinition> {
        self.resources
            .get(resource_type)
            .map(|schema| {
                schema
                    .attributes
                    .values()
                    .filter(|a| a.is_valid_at(version))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up an attribute definition
    #[inline]
    #[must_use]
    pub fn lookup(&self, resource_type: &str, name: &str) -> Option<&AttributeDefinition> {
        self.resources.get(resource_type)?.attributes.get(name)
    }

    /// Default value of an attribute, if it has one
    #[inline]
    #[must_use]
    pub fn default_value(&self, resource_type: &str, name: &str) -> Option<&Value> {
        self.lookup(resource_type, name)?.default_value()
    }

    /// Description of a resource type by name
    #[inline]
    #[must_use]
    pub fn description(&self, resource_type: &str) -> Option<&ResourceDescription> {
        self.resources.get(resource_type).map(|s| &s.description)
    }

    /// Resolve the description of a concrete resource element
    ///
    /// An exact `(key, value)` registration wins over a wildcard `(key, *)`.
    #[must_use]
    pub fn resolve(&self, element: &PathElement) -> Option<&ResourceDescription> {
        let name = self
            .by_path
            .get(element)
            .or_else(|| self.by_path.get(&PathElement::wildcard(element.key())))?;
        self.description(name)
    }

    /// Resource type names, in registration order
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: &str, ordinal: u32) -> ModelVersion {
        ModelVersion::new(id, ordinal)
    }

    fn registry() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema
            .define_resource(ResourceDescription::new(
                "transaction",
                PathElement::new("component", "transaction"),
                v("1.4.1", 1),
            ))
            .unwrap();
        schema
            .define_resource(ResourceDescription::new(
                "backup",
                PathElement::wildcard("backup"),
                v("2.0.0", 4),
            ))
            .unwrap();
        schema
            .define(
                "transaction",
                AttributeDefinition::builder("mode", ValueType::String, v("1.4.1", 1))
                    .default_value("NONE")
                    .build(),
            )
            .unwrap();
        schema
            .define(
                "transaction",
                AttributeDefinition::builder("complete-timeout", ValueType::Int, v("3.0.0", 5))
                    .build(),
            )
            .unwrap();
        schema
            .define(
                "transaction",
                AttributeDefinition::builder("eager-locking", ValueType::Bool, v("1.4.1", 1))
                    .removed_in(v("2.0.0", 4))
                    .build(),
            )
            .unwrap();
        schema
    }

    #[test]
    fn define_rejects_duplicate_attribute() {
        let mut schema = registry();
        let again = AttributeDefinition::builder("mode", ValueType::String, v("1.4.1", 1)).build();
        assert!(matches!(
            schema.define("transaction", again),
            Err(SchemaError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn define_requires_described_resource() {
        let mut schema = registry();
        let attr = AttributeDefinition::builder("x", ValueType::Int, v("1.4.1", 1)).build();
        assert_eq!(
            schema.define("locking", attr),
            Err(SchemaError::UnknownResourceType("locking".to_string()))
        );
    }

    #[test]
    fn define_resource_rejects_duplicate_path() {
        let mut schema = registry();
        let result = schema.define_resource(ResourceDescription::new(
            "tx",
            PathElement::new("component", "transaction"),
            v("1.4.1", 1),
        ));
        assert_eq!(result, Err(SchemaError::DuplicateResource("transaction".to_string())));
    }

    #[test]
    fn attributes_valid_at_filters_by_range() {
        let schema = registry();
        let names = |version: ModelVersion| -> Vec<String> {
            schema
                .attributes_valid_at("transaction", &version)
                .iter()
                .map(|a| a.name().to_string())
                .collect()
        };
        assert_eq!(names(v("1.4.1", 1)), vec!["mode", "eager-locking"]);
        assert_eq!(names(v("2.0.0", 4)), vec!["mode"]);
        assert_eq!(names(v("3.0.0", 5)), vec!["mode", "complete-timeout"]);
    }

    #[test]
    fn lookup_and_defaults() {
        let schema = registry();
        assert!(schema.lookup("transaction", "mode").is_some());
        assert!(schema.lookup("transaction", "unknown").is_none());
        assert!(schema.lookup("unknown", "mode").is_none());
        assert_eq!(schema.default_value("transaction", "mode"), Some(&Value::from("NONE")));
    }

    #[test]
    fn resolve_prefers_exact_then_wildcard() {
        let schema = registry();
        let tx = schema.resolve(&PathElement::new("component", "transaction")).unwrap();
        assert_eq!(tx.name(), "transaction");
        let backup = schema.resolve(&PathElement::new("backup", "NYC")).unwrap();
        assert_eq!(backup.name(), "backup");
        assert!(schema.resolve(&PathElement::new("component", "locking")).is_none());
    }

    #[test]
    fn migrations_apply_strictly_below_boundary() {
        let def = AttributeDefinition::builder("mode", ValueType::String, v("1.4.1", 1))
            .migrate_below(v("3.0.0", 5), MigrationRule::rename("legacy-mode"))
            .migrate_below(v("1.5.0", 2), MigrationRule::Discard)
            .build();
        assert_eq!(def.migrations_for(&v("3.0.0", 5)).count(), 0);
        assert_eq!(def.migrations_for(&v("2.0.0", 4)).count(), 1);
        let kinds: Vec<_> = def.migrations_for(&v("1.4.1", 1)).map(MigrationRule::kind).collect();
        assert_eq!(kinds, vec!["rename", "discard"]);
    }

    #[test]
    fn reject_unless_predicate() {
        let rule = MigrationRule::reject_unless(Value::Bool(true), "always on");
        let MigrationRule::RejectIf { predicate, reason } = &rule else {
            panic!("expected rejection rule");
        };
        assert!(predicate(&Value::Bool(false)));
        assert!(!predicate(&Value::Bool(true)));
        assert_eq!(reason, "always on");
        assert!(rule.is_rejection());
    }

    #[test]
    fn replace_value_leaves_other_values() {
        let MigrationRule::Rewrite(f) =
            MigrationRule::replace_value(Value::from("BATCH"), Value::from("NONE"))
        else {
            panic!("expected rewrite rule");
        };
        assert_eq!(f(&Value::from("BATCH")).unwrap(), Value::from("NONE"));
        assert_eq!(f(&Value::from("FULL_XA")).unwrap(), Value::from("FULL_XA"));
    }
}
