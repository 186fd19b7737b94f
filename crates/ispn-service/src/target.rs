//! Service targets and installation

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::descriptor::{ServiceDescriptor, ServiceInstance};
use crate::error::{InstallerError, Result};
use crate::name::{ServiceMode, ServiceName};

/// Registry the planned services are submitted to
#[cfg_attr(test, mockall::automock)]
pub trait ServiceTarget {
    /// Register a service
    ///
    /// # Errors
    /// Whatever the target refuses; never retried
    fn register(&mut self, descriptor: &ServiceDescriptor) -> Result<()>;

    /// Set the mode of a registered service
    ///
    /// # Errors
    /// Whatever the target refuses; never retried
    fn set_mode(&mut self, name: &ServiceName, mode: ServiceMode) -> Result<()>;

    /// Remove a service; `false` if it was not registered
    ///
    /// # Errors
    /// Whatever the target refuses; never retried
    fn remove(&mut self, name: &ServiceName) -> Result<bool>;
}

/// Register every descriptor, in order, and set its initial mode
///
/// # Errors
/// The first error of `target`
pub fn install<T: ServiceTarget + ?Sized>(target: &mut T, descriptors: &[ServiceDescriptor]) -> Result<()> {
    for descriptor in descriptors {
        target.register(descriptor)?;
        target.set_mode(descriptor.name(), descriptor.mode())?;
        tracing::info!("installed {} ({})", descriptor.name(), descriptor.mode());
    }
    Ok(())
}

/// Remove every name, in order; absent services are skipped
///
/// # Errors
/// The first error of `target`
pub fn remove<T: ServiceTarget + ?Sized>(target: &mut T, names: &[ServiceName]) -> Result<()> {
    for name in names {
        if target.remove(name)? {
            tracing::info!("removed {name}");
        } else {
            tracing::debug!("{name} was not installed");
        }
    }
    Ok(())
}

/// A registered service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredService {
    /// Current mode
    pub mode: ServiceMode,
    /// Dependencies at registration
    pub dependencies: BTreeSet<ServiceName>,
    /// Value built at registration
    pub instance: ServiceInstance,
}

/// Service target keeping registrations in memory
///
/// Dependencies must be registered first or declared external with
/// [`InMemoryServiceTarget::provide`].
#[derive(Debug, Default)]
pub struct InMemoryServiceTarget {
    services: IndexMap<ServiceName, RegisteredService>,
    external: BTreeSet<ServiceName>,
}

impl InMemoryServiceTarget {
    /// Empty target
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a service installed elsewhere
    pub fn provide(&mut self, name: ServiceName) {
        self.external.insert(name);
    }

    /// Check if `name` is registered
    #[must_use]
    pub fn contains(&self, name: &ServiceName) -> bool {
        self.services.contains_key(name)
    }

    /// Registered service under `name`
    #[must_use]
    pub fn get(&self, name: &ServiceName) -> Option<&RegisteredService> {
        self.services.get(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &ServiceName> {
        self.services.keys()
    }

    /// Number of registered services
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceTarget for InMemoryServiceTarget {
    fn register(&mut self, descriptor: &ServiceDescriptor) -> Result<()> {
        let name = descriptor.name();
        if self.services.contains_key(name) {
            return Err(InstallerError::DuplicateService(name.clone()));
        }
        if let Some(missing) = descriptor
            .dependencies()
            .iter()
            .find(|d| !self.services.contains_key(*d) && !self.external.contains(*d))
        {
            return Err(InstallerError::MissingDependency {
                service: name.clone(),
                dependency: missing.clone(),
            });
        }
        self.services.insert(
            name.clone(),
            RegisteredService {
                mode: descriptor.mode(),
                dependencies: descriptor.dependencies().clone(),
                instance: descriptor.instantiate(),
            },
        );
        Ok(())
    }

    fn set_mode(&mut self, name: &ServiceName, mode: ServiceMode) -> Result<()> {
        let service = self
            .services
            .get_mut(name)
            .ok_or_else(|| InstallerError::UnknownService(name.clone()))?;
        service.mode = mode;
        Ok(())
    }

    fn remove(&mut self, name: &ServiceName) -> Result<bool> {
        Ok(self.services.shift_remove(name).is_some())
    }
}
