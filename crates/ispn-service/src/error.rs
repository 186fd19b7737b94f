//! Installer errors

use ispn_model::PathAddress;
use thiserror::Error;

use crate::name::ServiceName;

/// Installer failures; none are retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallerError {
    /// The transport address has no cache container parent
    #[error("{0} is not the address of a cache container transport")]
    InvalidAddress(PathAddress),

    /// An attribute could not be resolved
    #[error("{address} [{name}]: {message}")]
    InvalidAttribute {
        /// Transport address
        address: PathAddress,
        /// Attribute name
        name: String,
        /// What is wrong
        message: String,
    },

    /// Services depend on each other in a cycle
    #[error("dependency cycle through {0}")]
    Cycle(ServiceName),

    /// Two services under one name
    #[error("service {0} is already registered")]
    DuplicateService(ServiceName),

    /// A dependency is neither registered nor provided
    #[error("service {service} depends on missing service {dependency}")]
    MissingDependency {
        /// Dependent service
        service: ServiceName,
        /// Missing dependency
        dependency: ServiceName,
    },

    /// No service under this name
    #[error("service {0} is not registered")]
    UnknownService(ServiceName),
}

/// Result type for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;
