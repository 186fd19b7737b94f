//! Model versions
//!
//! Provides [`ModelVersion`], a totally ordered schema version, and
//! [`VersionRegistry`], the set of versions a subsystem knows about.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A schema version
///
/// Ordered (and compared for equality) by `ordinal` only; ordinals increase
/// strictly with release order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    id: String,
    ordinal: u32,
}

impl ModelVersion {
    /// Create a version
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, ordinal: u32) -> Self {
        Self {
            id: id.into(),
            ordinal,
        }
    }

    /// Version id, e.g. `1.4.1`
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Release ordinal
    #[inline]
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Check if a model at `target` must be translated to be understood by a
    /// management core that introduced something at `self`
    ///
    /// True iff `target` precedes `self`.
    #[inline]
    #[must_use]
    pub fn requires_transformation(&self, target: &ModelVersion) -> bool {
        target.ordinal < self.ordinal
    }
}

impl PartialEq for ModelVersion {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal == other.ordinal
    }
}

impl Eq for ModelVersion {}

impl Hash for ModelVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordinal.hash(state);
    }
}

impl PartialOrd for ModelVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl Display for ModelVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Registry of known versions
#[derive(Debug, Default, Clone)]
pub struct VersionRegistry {
    by_ordinal: BTreeMap<u32, ModelVersion>,
    by_id: HashMap<String, u32>,
}

impl VersionRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version
    ///
    /// # Errors
    /// Returns [`VersionError::DuplicateVersion`] if the id or the ordinal is
    /// already taken
    pub fn register(&mut self, version: ModelVersion) -> Result<(), VersionError> {
        if self.by_ordinal.contains_key(&version.ordinal) || self.by_id.contains_key(&version.id)
        {
            return Err(VersionError::DuplicateVersion {
                id: version.id,
                ordinal: version.ordinal,
            });
        }
        self.by_id.insert(version.id.clone(), version.ordinal);
        self.by_ordinal.insert(version.ordinal, version);
        Ok(())
    }

    /// Check if a model at `current` must be transformed to reach `target`
    #[inline]
    #[must_use]
    pub fn requires_transformation(&self, current: &ModelVersion, target: &ModelVersion) -> bool {
        target.ordinal < current.ordinal
    }

    /// Total order of two versions
    #[inline]
    #[must_use]
    pub fn compare(&self, a: &ModelVersion, b: &ModelVersion) -> Ordering {
        a.cmp(b)
    }

    /// Look up a version by id
    ///
    /// # Errors
    /// Returns [`VersionError::UnknownVersion`] if no such id is registered
    pub fn get(&self, id: &str) -> Result<&ModelVersion, VersionError> {
        self.by_id
            .get(id)
            .and_then(|ordinal| self.by_ordinal.get(ordinal))
            .ok_or_else(|| VersionError::UnknownVersion(id.to_string()))
    }

    /// Highest registered version
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&ModelVersion> {
        self.by_ordinal.values().next_back()
    }

    /// Versions in ascending order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ModelVersion> {
        self.by_ordinal.values()
    }

    /// Versions strictly older than `version`, ascending
    pub fn older_than<'a>(
        &'a self,
        version: &ModelVersion,
    ) -> impl Iterator<Item = &'a ModelVersion> + 'a {
        self.by_ordinal.range(..version.ordinal).map(|(_, v)| v)
    }

    /// Number of registered versions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ordinal.len()
    }

    /// Check if no version is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ordinal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> VersionRegistry {
        let mut registry = VersionRegistry::new();
        registry.register(ModelVersion::new("1.4.1", 1)).unwrap();
        registry.register(ModelVersion::new("2.0.0", 4)).unwrap();
        registry.register(ModelVersion::new("1.5.0", 2)).unwrap();
        registry
    }

    #[test]
    fn register_rejects_duplicate_id() {
        let mut registry = registry();
        let result = registry.register(ModelVersion::new("1.4.1", 9));
        assert!(matches!(result, Err(VersionError::DuplicateVersion { .. })));
    }

    #[test]
    fn register_rejects_duplicate_ordinal() {
        let mut registry = registry();
        let result = registry.register(ModelVersion::new("9.9.9", 2));
        assert!(matches!(result, Err(VersionError::DuplicateVersion { .. })));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn iteration_is_ascending_by_ordinal() {
        let ids: Vec<_> = registry().iter().map(|v| v.id().to_string()).collect();
        assert_eq!(ids, vec!["1.4.1", "1.5.0", "2.0.0"]);
    }

    #[test]
    fn current_is_highest() {
        assert_eq!(registry().current().unwrap().id(), "2.0.0");
        assert!(VersionRegistry::new().current().is_none());
    }

    #[test]
    fn requires_transformation_only_for_older_targets() {
        let registry = registry();
        let current = registry.get("2.0.0").unwrap();
        let legacy = registry.get("1.4.1").unwrap();
        assert!(registry.requires_transformation(current, legacy));
        assert!(!registry.requires_transformation(current, current));
        assert!(!registry.requires_transformation(legacy, current));
        assert!(current.requires_transformation(legacy));
    }

    #[test]
    fn compare_is_total() {
        let registry = registry();
        let a = registry.get("1.4.1").unwrap();
        let b = registry.get("1.5.0").unwrap();
        assert_eq!(registry.compare(a, b), Ordering::Less);
        assert_eq!(registry.compare(b, a), Ordering::Greater);
        assert_eq!(registry.compare(a, a), Ordering::Equal);
    }

    #[test]
    fn older_than_excludes_bound() {
        let registry = registry();
        let bound = registry.get("2.0.0").unwrap().clone();
        let ids: Vec<_> = registry.older_than(&bound).map(ModelVersion::id).collect();
        assert_eq!(ids, vec!["1.4.1", "1.5.0"]);
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_eq!(
            registry().get("0.0.1").unwrap_err(),
            VersionError::UnknownVersion("0.0.1".to_string())
        );
    }
}
