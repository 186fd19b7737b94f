//! Expected operation failures
//!
//! A [`FailedOperationConfig`] maps address patterns to what a legacy
//! controller is expected to refuse there: the whole resource, or attribute
//! values that some correction turns into acceptable ones.

use std::fmt::Debug;
use std::sync::Arc;

use ispn_model::{PathAddress, Value};

/// Coerces attribute values a legacy controller refuses into values it
/// accepts
pub trait AttributeCorrection: Send + Sync + Debug {
    /// Names of the attributes this correction covers
    fn attributes(&self) -> &[String];

    /// Check if `value` of `attribute` needs correcting
    fn check_value(&self, attribute: &str, value: &Value) -> bool;

    /// Value `attribute` is corrected to
    fn correct_value(&self, attribute: &str, value: &Value) -> Value;

    /// Check if this correction covers `attribute`
    fn covers(&self, attribute: &str) -> bool {
        self.attributes().iter().any(|name| name == attribute)
    }
}

/// Legacy releases only accept `true` for these attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeToTrue {
    attributes: Vec<String>,
}

impl ChangeToTrue {
    /// Cover `attributes`
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

impl AttributeCorrection for ChangeToTrue {
    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn check_value(&self, _attribute: &str, value: &Value) -> bool {
        *value != Value::Bool(true)
    }

    fn correct_value(&self, _attribute: &str, _value: &Value) -> Value {
        Value::Bool(true)
    }
}

/// What is expected of operations on a matching address
#[derive(Debug, Clone)]
pub enum ExpectedCorrection {
    /// Every operation is refused because the resource does not exist
    RejectedResource,

    /// Operations carrying values the correction flags are refused, and
    /// accepted once corrected
    Attributes(Arc<dyn AttributeCorrection>),
}

impl ExpectedCorrection {
    /// Attribute expectation from a correction
    pub fn attributes(correction: impl AttributeCorrection + 'static) -> Self {
        Self::Attributes(Arc::new(correction))
    }
}

/// Address patterns and their expected failures, first match wins
#[derive(Debug, Clone, Default)]
pub struct FailedOperationConfig {
    expectations: Vec<(PathAddress, ExpectedCorrection)>,
}

impl FailedOperationConfig {
    /// Empty configuration; every operation is expected to pass
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for addresses matching `pattern`
    #[must_use]
    pub fn with(mut self, pattern: PathAddress, expected: ExpectedCorrection) -> Self {
        self.expectations.push((pattern, expected));
        self
    }

    /// Expectation for operations on `address`
    #[must_use]
    pub fn expectation_for(&self, address: &PathAddress) -> Option<&ExpectedCorrection> {
        self.expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(address))
            .map(|(_, expected)| expected)
    }

    /// Number of patterns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Check if no pattern is configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }
}
