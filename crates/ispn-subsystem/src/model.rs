//! Subsystem model versions

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use ispn_model::{ModelVersion, VersionRegistry};
use serde::{Deserialize, Serialize};

use crate::error::SubsystemError;

/// Every released version of the Infinispan subsystem model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfinispanModel {
    /// EAP 6.2
    #[serde(rename = "1.4.1")]
    Version1_4_1,
    /// EAP 6.3
    #[serde(rename = "1.5.0")]
    Version1_5_0,
    /// EAP 6.4
    #[serde(rename = "1.6.0")]
    Version1_6_0,
    /// WildFly 8
    #[serde(rename = "2.0.0")]
    Version2_0_0,
    /// WildFly 9
    #[serde(rename = "3.0.0")]
    Version3_0_0,
    /// WildFly 10
    #[serde(rename = "4.0.0")]
    Version4_0_0,
}

impl InfinispanModel {
    /// All versions, oldest first
    pub const ALL: [Self; 6] = [
        Self::Version1_4_1,
        Self::Version1_5_0,
        Self::Version1_6_0,
        Self::Version2_0_0,
        Self::Version3_0_0,
        Self::Version4_0_0,
    ];

    /// The version models are authored at
    pub const CURRENT: Self = Self::Version4_0_0;

    /// Version id
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Version1_4_1 => "1.4.1",
            Self::Version1_5_0 => "1.5.0",
            Self::Version1_6_0 => "1.6.0",
            Self::Version2_0_0 => "2.0.0",
            Self::Version3_0_0 => "3.0.0",
            Self::Version4_0_0 => "4.0.0",
        }
    }

    /// Release ordinal, starting at 1
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        self as u32 + 1
    }

    /// The schema version
    #[must_use]
    pub fn version(self) -> ModelVersion {
        ModelVersion::new(self.id(), self.ordinal())
    }

    /// Check if a model at `target` must be transformed to understand
    /// something introduced by this version
    #[inline]
    #[must_use]
    pub fn requires_transformation(self, target: &ModelVersion) -> bool {
        self.version().requires_transformation(target)
    }

    /// Registry holding every version
    ///
    /// # Panics
    /// Never: ids and ordinals of [`InfinispanModel::ALL`] are distinct.
    #[must_use]
    pub fn registry() -> VersionRegistry {
        let mut registry = VersionRegistry::new();
        for model in Self::ALL {
            registry
                .register(model.version())
                .unwrap_or_else(|e| unreachable!("{e}"));
        }
        registry
    }
}

impl Display for InfinispanModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for InfinispanModel {
    type Err = SubsystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.id() == s)
            .ok_or_else(|| SubsystemError::UnknownModel(s.to_string()))
    }
}
