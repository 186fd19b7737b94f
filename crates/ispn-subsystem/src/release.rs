//! Legacy controller releases
//!
//! Each supported legacy server release runs exactly one subsystem model
//! version. The runtime artifacts listed per release are what a legacy boot
//! would need on its class path; resolving them is left to the caller.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SubsystemError;
use crate::model::InfinispanModel;

/// A legacy server release with a fixed subsystem model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegacyRelease {
    /// EAP 6.2.0
    #[serde(rename = "eap-620")]
    Eap620,
    /// EAP 6.3.0
    #[serde(rename = "eap-630")]
    Eap630,
    /// EAP 6.4.0
    #[serde(rename = "eap-640")]
    Eap640,
    /// WildFly 8.0.0.Final
    #[serde(rename = "wildfly-800")]
    WildFly800,
    /// WildFly 8.1.0.Final
    #[serde(rename = "wildfly-810")]
    WildFly810,
    /// WildFly 8.2.0.Final
    #[serde(rename = "wildfly-820")]
    WildFly820,
}

impl LegacyRelease {
    /// All releases, oldest model first
    pub const ALL: [Self; 6] = [
        Self::Eap620,
        Self::Eap630,
        Self::Eap640,
        Self::WildFly800,
        Self::WildFly810,
        Self::WildFly820,
    ];

    /// Release name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eap620 => "EAP 6.2.0",
            Self::Eap630 => "EAP 6.3.0",
            Self::Eap640 => "EAP 6.4.0",
            Self::WildFly800 => "WildFly 8.0.0.Final",
            Self::WildFly810 => "WildFly 8.1.0.Final",
            Self::WildFly820 => "WildFly 8.2.0.Final",
        }
    }

    /// Subsystem model the release runs
    #[must_use]
    pub const fn model(self) -> InfinispanModel {
        match self {
            Self::Eap620 => InfinispanModel::Version1_4_1,
            Self::Eap630 => InfinispanModel::Version1_5_0,
            Self::Eap640 => InfinispanModel::Version1_6_0,
            Self::WildFly800 | Self::WildFly810 | Self::WildFly820 => InfinispanModel::Version2_0_0,
        }
    }

    /// Maven coordinates of the legacy subsystem and cache runtime
    #[must_use]
    pub const fn artifacts(self) -> &'static [&'static str] {
        match self {
            Self::Eap620 => &[
                "org.jboss.as:jboss-as-clustering-infinispan:7.3.0.Final-redhat-14",
                "org.infinispan:infinispan-core:5.2.7.Final-redhat-2",
                "org.infinispan:infinispan-cachestore-jdbc:5.2.7.Final-redhat-2",
            ],
            Self::Eap630 => &[
                "org.jboss.as:jboss-as-clustering-infinispan:7.4.0.Final-redhat-19",
                "org.infinispan:infinispan-core:5.2.10.Final-redhat-1",
                "org.infinispan:infinispan-cachestore-jdbc:5.2.10.Final-redhat-1",
            ],
            Self::Eap640 => &[
                "org.jboss.as:jboss-as-clustering-infinispan:7.5.0.Final-redhat-21",
                "org.infinispan:infinispan-core:5.2.11.Final-redhat-2",
                "org.infinispan:infinispan-cachestore-jdbc:5.2.11.Final-redhat-2",
            ],
            Self::WildFly800 => &[
                "org.wildfly:wildfly-clustering-infinispan:8.0.0.Final",
                "org.wildfly:wildfly-clustering-common:8.0.0.Final",
                "org.infinispan:infinispan-core:6.0.1.Final",
                "org.infinispan:infinispan-commons:6.0.1.Final",
                "org.infinispan:infinispan-cachestore-jdbc:6.0.1.Final",
                "org.wildfly:wildfly-clustering-jgroups:8.0.0.Final",
                "org.jgroups:jgroups:3.4.2.Final",
            ],
            Self::WildFly810 => &[
                "org.wildfly:wildfly-clustering-infinispan:8.1.0.Final",
                "org.wildfly:wildfly-clustering-common:8.1.0.Final",
                "org.infinispan:infinispan-core:6.0.2.Final",
                "org.infinispan:infinispan-commons:6.0.2.Final",
                "org.infinispan:infinispan-cachestore-jdbc:6.0.2.Final",
                "org.wildfly:wildfly-clustering-jgroups:8.1.0.Final",
                "org.jgroups:jgroups:3.4.3.Final",
            ],
            Self::WildFly820 => &[
                "org.wildfly:wildfly-clustering-infinispan:8.2.0.Final",
                "org.wildfly:wildfly-clustering-common:8.2.0.Final",
                "org.infinispan:infinispan-core:6.0.2.Final",
                "org.infinispan:infinispan-commons:6.0.2.Final",
                "org.infinispan:infinispan-cachestore-jdbc:6.0.2.Final",
                "org.wildfly:wildfly-clustering-jgroups:8.2.0.Final",
                "org.jgroups:jgroups:3.4.5.Final",
            ],
        }
    }

    /// Short identifier, as accepted by [`FromStr`]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Eap620 => "eap-620",
            Self::Eap630 => "eap-630",
            Self::Eap640 => "eap-640",
            Self::WildFly800 => "wildfly-800",
            Self::WildFly810 => "wildfly-810",
            Self::WildFly820 => "wildfly-820",
        }
    }
}

impl Display for LegacyRelease {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LegacyRelease {
    type Err = SubsystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|release| release.key() == s)
            .ok_or_else(|| SubsystemError::UnknownRelease(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_matrix() {
        let matrix: Vec<_> = LegacyRelease::ALL
            .iter()
            .map(|r| (r.key(), r.model().id()))
            .collect();
        assert_eq!(
            matrix,
            vec![
                ("eap-620", "1.4.1"),
                ("eap-630", "1.5.0"),
                ("eap-640", "1.6.0"),
                ("wildfly-800", "2.0.0"),
                ("wildfly-810", "2.0.0"),
                ("wildfly-820", "2.0.0"),
            ]
        );
    }

    #[test]
    fn every_release_needs_transformation() {
        let current = InfinispanModel::CURRENT;
        assert!(LegacyRelease::ALL
            .iter()
            .all(|r| current.requires_transformation(&r.model().version())));
    }

    #[test]
    fn serde_key_matches_from_str() {
        for release in LegacyRelease::ALL {
            let json = serde_json::to_string(&release).unwrap();
            assert_eq!(json, format!("\"{}\"", release.key()));
            assert_eq!(release.key().parse::<LegacyRelease>().unwrap(), release);
        }
    }

    #[test]
    fn wildfly_releases_ship_jgroups() {
        assert!(LegacyRelease::WildFly810
            .artifacts()
            .iter()
            .any(|a| a.starts_with("org.jgroups:jgroups:")));
        assert!(!LegacyRelease::Eap620
            .artifacts()
            .iter()
            .any(|a| a.starts_with("org.jgroups:")));
    }
}
