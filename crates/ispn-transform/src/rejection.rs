//! Rejections
//!
//! A rejection records that part of a model cannot be represented at a
//! legacy version. Rejections are data, aggregated into a
//! [`TransformationResult`](crate::TransformationResult), not errors.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use ispn_model::{ModelVersion, PathAddress};
use serde::{Deserialize, Serialize};

/// Why something was rejected
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The resource type does not exist at the target version
    RejectedResource,

    /// The attribute value cannot be expressed at the target version
    RejectedAttribute {
        /// Operator-facing reason
        message: String,
    },
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectedResource => f.write_str("REJECTED_RESOURCE"),
            Self::RejectedAttribute { message } => write!(f, "REJECTED_ATTRIBUTE({message})"),
        }
    }
}

/// A rejected resource or attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rejection {
    /// Address of the rejected resource, or of the resource owning the
    /// rejected attribute
    pub address: PathAddress,

    /// Rejected attribute, `None` for a whole resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Reason
    pub reason: RejectionReason,
}

impl Rejection {
    /// Whole-resource rejection
    #[inline]
    #[must_use]
    pub fn resource(address: PathAddress) -> Self {
        Self {
            address,
            attribute: None,
            reason: RejectionReason::RejectedResource,
        }
    }

    /// Attribute rejection
    #[inline]
    #[must_use]
    pub fn attribute(
        address: PathAddress,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            address,
            attribute: Some(attribute.into()),
            reason: RejectionReason::RejectedAttribute {
                message: message.into(),
            },
        }
    }

    /// Check if a whole resource was rejected
    #[inline]
    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.reason == RejectionReason::RejectedResource
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{} [{attribute}]: {}", self.address, self.reason),
            None => write!(f, "{}: {}", self.address, self.reason),
        }
    }
}

/// Serializable summary of the rejections of one transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReport {
    /// Target version id
    pub target: String,

    /// Rejections, ordered by address
    pub rejections: Vec<Rejection>,
}

impl RejectionReport {
    /// Build from a rejection set
    #[must_use]
    pub fn new(target: &ModelVersion, rejections: &BTreeSet<Rejection>) -> Self {
        Self {
            target: target.id().to_string(),
            rejections: rejections.iter().cloned().collect(),
        }
    }

    /// Check if nothing was rejected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
    }
}

impl Display for RejectionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.rejections.is_empty() {
            return write!(f, "no rejections at {}", self.target);
        }
        writeln!(f, "{} rejection(s) at {}:", self.rejections.len(), self.target)?;
        for rejection in &self.rejections {
            writeln!(f, "  {rejection}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PathAddress {
        s.parse().unwrap()
    }

    #[test]
    fn display_forms() {
        let resource = Rejection::resource(addr("/subsystem=infinispan/backup=x"));
        assert_eq!(resource.to_string(), "/subsystem=infinispan/backup=x: REJECTED_RESOURCE");

        let attribute = Rejection::attribute(addr("/a=b"), "statistics-enabled", "always on");
        assert_eq!(
            attribute.to_string(),
            "/a=b [statistics-enabled]: REJECTED_ATTRIBUTE(always on)"
        );
        assert!(resource.is_resource());
        assert!(!attribute.is_resource());
    }

    #[test]
    fn set_orders_by_address_first() {
        let mut set = BTreeSet::new();
        set.insert(Rejection::attribute(addr("/a=2"), "x", "m"));
        set.insert(Rejection::resource(addr("/a=1")));
        set.insert(Rejection::resource(addr("/a=1")));
        let addresses: Vec<_> = set.iter().map(|r| r.address.to_string()).collect();
        assert_eq!(addresses, vec!["/a=1", "/a=2"]);
    }

    #[test]
    fn report_json_shape() {
        let mut set = BTreeSet::new();
        set.insert(Rejection::attribute(addr("/a=b"), "x", "nope"));
        let report = RejectionReport::new(&ModelVersion::new("1.4.1", 1), &set);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["target"], "1.4.1");
        assert_eq!(json["rejections"][0]["address"], "/a=b");
        assert_eq!(json["rejections"][0]["reason"]["kind"], "REJECTED_ATTRIBUTE");
        assert_eq!(json["rejections"][0]["reason"]["message"], "nope");
    }
}
