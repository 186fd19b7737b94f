//! Group alias providers
//!
//! Other subsystems contribute services to every cache container transport:
//! aliases that let them refer to a clustering group by container name
//! while the real service is named by channel.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::name::ServiceName;

/// A service contributed by a provider, aliasing `target` under `name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Alias name
    pub name: ServiceName,
    /// Aliased service
    pub target: ServiceName,
}

/// Contributes services for a cache container `group` running over `channel`
///
/// Each contribution depends on its `target`, named by channel, and on the
/// channel service of `group`, so it starts after both and is removed
/// before either.
pub trait GroupAliasProvider: Send + Sync + Debug {
    /// Provider name, for logs and plans
    fn name(&self) -> &str;

    /// Services to install alongside the transport
    fn contributions(&self, group: &str, channel: &str) -> Vec<Contribution>;
}

/// Aliases `<prefix>.<group>` to `<prefix>.<channel>` for each prefix
#[derive(Debug, Clone)]
pub struct FamilyAliasProvider {
    name: String,
    prefixes: Vec<ServiceName>,
}

impl FamilyAliasProvider {
    /// Create a provider aliasing each of `prefixes`
    pub fn new(name: impl Into<String>, prefixes: Vec<ServiceName>) -> Self {
        Self {
            name: name.into(),
            prefixes,
        }
    }
}

impl GroupAliasProvider for FamilyAliasProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn contributions(&self, group: &str, channel: &str) -> Vec<Contribution> {
        if group == channel {
            return Vec::new();
        }
        self.prefixes
            .iter()
            .map(|prefix| Contribution {
                name: prefix.append(group),
                target: prefix.append(channel),
            })
            .collect()
    }
}

/// Registered providers
///
/// Providers may be registered at any time; every planning pass sees the
/// current set.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<dyn GroupAliasProvider>>>,
}

impl ProviderRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    pub fn register(&self, provider: Arc<dyn GroupAliasProvider>) {
        tracing::debug!("registering group alias provider '{}'", provider.name());
        self.providers.write().push(provider);
    }

    /// Snapshot of the registered providers
    #[must_use]
    pub fn list_providers(&self) -> Vec<Arc<dyn GroupAliasProvider>> {
        self.providers.read().clone()
    }

    /// Number of providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Check if no provider is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}
