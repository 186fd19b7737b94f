//! Planned services

use std::collections::BTreeSet;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde::Serialize;

use crate::name::{ServiceKind, ServiceMode, ServiceName};

/// What a started service provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServiceInstance {
    /// Cache container transport over a channel
    Transport {
        /// Cache container
        group: String,
        /// Protocol stack of the channel
        channel: String,
        /// Distributed lock acquisition timeout, in milliseconds
        lock_timeout: i64,
    },
    /// Cross-site configuration of a cache container
    Site {
        /// Cache container
        group: String,
    },
    /// Naming binding of another service
    Binding {
        /// JNDI name
        jndi_name: String,
        /// Bound service
        target: ServiceName,
    },
    /// Channel of a cache container
    Channel {
        /// Cache container
        group: String,
    },
    /// Another service under a second name
    Alias {
        /// Aliased service
        target: ServiceName,
    },
}

/// Where a planned service comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceOrigin {
    /// Installed by the transport itself
    Transport(ServiceKind),
    /// Contributed by a group alias provider
    Provider(String),
}

type Factory = Arc<dyn Fn() -> ServiceInstance + Send + Sync>;

/// A service to register: name, dependencies, initial mode and how to build it
#[derive(Clone)]
pub struct ServiceDescriptor {
    name: ServiceName,
    origin: ServiceOrigin,
    dependencies: BTreeSet<ServiceName>,
    mode: ServiceMode,
    factory: Factory,
}

impl ServiceDescriptor {
    /// Create a descriptor without dependencies
    pub fn new<F>(name: ServiceName, origin: ServiceOrigin, mode: ServiceMode, factory: F) -> Self
    where
        F: Fn() -> ServiceInstance + Send + Sync + 'static,
    {
        Self {
            name,
            origin,
            dependencies: BTreeSet::new(),
            mode,
            factory: Arc::new(factory),
        }
    }

    /// Add a dependency
    #[must_use]
    pub fn depends_on(mut self, dependency: ServiceName) -> Self {
        self.dependencies.insert(dependency);
        self
    }

    /// Service name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &ServiceOrigin {
        &self.origin
    }

    /// Kind, for services the transport installs itself
    #[must_use]
    pub fn kind(&self) -> Option<ServiceKind> {
        match self.origin {
            ServiceOrigin::Transport(kind) => Some(kind),
            ServiceOrigin::Provider(_) => None,
        }
    }

    /// Services that must be up first
    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &BTreeSet<ServiceName> {
        &self.dependencies
    }

    /// Initial mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ServiceMode {
        self.mode
    }

    /// Build the service value
    #[must_use]
    pub fn instantiate(&self) -> ServiceInstance {
        (self.factory)()
    }
}

impl Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("dependencies", &self.dependencies)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
