//! Resource addresses
//!
//! Provides [`PathElement`] and [`PathAddress`] for hierarchical addressing of
//! resources within a management model.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Value used by patterns to match any element name
pub const WILDCARD: &str = "*";

/// One `(type, name)` segment of a resource address
///
/// # Examples
/// - `cache-container=maximal`
/// - `component=transaction`
/// - `backup=*` (pattern)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathElement {
    key: String,
    value: String,
}

impl PathElement {
    /// Create a new element
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a wildcard element matching any name of the given type
    #[inline]
    #[must_use]
    pub fn wildcard(key: impl Into<String>) -> Self {
        Self::new(key, WILDCARD)
    }

    /// Resource type
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resource name
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check if this element is a wildcard pattern
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Check if `self`, used as a pattern, matches a concrete element
    #[inline]
    #[must_use]
    pub fn matches(&self, element: &PathElement) -> bool {
        self.key == element.key && (self.is_wildcard() || self.value == element.value)
    }
}

impl Display for PathElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl FromStr for PathElement {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| PathError::MissingSeparator(s.to_string()))?;
        if key.is_empty() || value.is_empty() {
            return Err(PathError::EmptySegment);
        }
        Ok(Self::new(key, value))
    }
}

/// Absolute address of a resource in the model tree
///
/// The empty address is the model root. Serialized in its display form,
/// e.g. `/subsystem=infinispan/cache-container=maximal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    /// Create address from elements
    #[inline]
    #[must_use]
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// Empty address (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Address with a single element
    #[inline]
    #[must_use]
    pub fn of(element: PathElement) -> Self {
        Self(vec![element])
    }

    /// Address elements from root to leaf
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root address
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an element, returning the child address
    #[inline]
    #[must_use]
    pub fn append(&self, element: PathElement) -> Self {
        let mut new = self.clone();
        new.0.push(element);
        new
    }

    /// Parent address (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Last element (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// Check if `self` is the direct parent of `other`
    #[inline]
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.0.len() == self.0.len() + 1 && other.0[..self.0.len()] == self.0[..]
    }

    /// Check if `self`, used as a pattern, matches a concrete address
    ///
    /// Lengths must be equal; each pattern element may be a wildcard.
    #[must_use]
    pub fn matches(&self, address: &Self) -> bool {
        self.0.len() == address.0.len()
            && self.0.iter().zip(&address.0).all(|(p, e)| p.matches(e))
    }

    /// Iterator over elements from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }
}

impl Display for PathAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let elements = trimmed
            .split('/')
            .map(PathElement::from_str)
            .collect::<Result<_, _>>()?;
        Ok(Self(elements))
    }
}

impl Serialize for PathAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PathAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

impl From<Vec<PathElement>> for PathAddress {
    fn from(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }
}

/// Errors related to resource addresses
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    /// Empty key or value
    #[error("address contains empty segment")]
    EmptySegment,

    /// Segment without `key=value` separator
    #[error("segment '{0}' is not of the form key=value")]
    MissingSeparator(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PathAddress {
        s.parse().unwrap()
    }

    #[test]
    fn element_display_and_parse() {
        let element = PathElement::new("cache-container", "maximal");
        assert_eq!(element.to_string(), "cache-container=maximal");
        assert_eq!("cache-container=maximal".parse::<PathElement>().unwrap(), element);
    }

    #[test]
    fn element_wildcard_matches_any_name() {
        let pattern = PathElement::wildcard("local-cache");
        assert!(pattern.matches(&PathElement::new("local-cache", "local")));
        assert!(!pattern.matches(&PathElement::new("distributed-cache", "local")));
    }

    #[test]
    fn element_parse_errors() {
        assert!(matches!(
            "novalue".parse::<PathElement>(),
            Err(PathError::MissingSeparator(_))
        ));
        assert_eq!("=x".parse::<PathElement>(), Err(PathError::EmptySegment));
    }

    #[test]
    fn address_root_display() {
        assert_eq!(PathAddress::root().to_string(), "/");
        assert!(addr("/").is_empty());
    }

    #[test]
    fn address_round_trips_display() {
        let text = "/subsystem=infinispan/cache-container=maximal/local-cache=local";
        assert_eq!(addr(text).to_string(), text);
        assert_eq!(addr(text).len(), 3);
    }

    #[test]
    fn address_serializes_as_text() {
        let address = addr("/subsystem=infinispan/cache-container=c");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"/subsystem=infinispan/cache-container=c\"");
        let back: PathAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn address_append_and_parent() {
        let container = addr("/subsystem=infinispan/cache-container=c");
        let cache = container.append(PathElement::new("local-cache", "l"));
        assert_eq!(cache.parent().unwrap(), container);
        assert!(container.is_parent_of(&cache));
        assert!(!cache.is_parent_of(&container));
        assert_eq!(cache.last().unwrap().value(), "l");
    }

    #[test]
    fn address_pattern_matching() {
        let pattern = addr("/subsystem=infinispan/cache-container=*/distributed-cache=*");
        assert!(pattern.matches(&addr(
            "/subsystem=infinispan/cache-container=a/distributed-cache=b"
        )));
        assert!(!pattern.matches(&addr("/subsystem=infinispan/cache-container=a")));
        assert!(!pattern.matches(&addr(
            "/subsystem=infinispan/cache-container=a/local-cache=b"
        )));
    }
}
