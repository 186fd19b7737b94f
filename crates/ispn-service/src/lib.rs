//! Transport service installer
//!
//! Derives the runtime services a cache container transport needs from its
//! configuration, orders them by dependency and submits them to a
//! [`ServiceTarget`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ispn_model::{ModelNode, PathAddress, PathElement};
//! use ispn_service::{install, InMemoryServiceTarget, ProviderRegistry, ServiceKind, TransportInstaller};
//! use ispn_subsystem::catalog;
//!
//! let installer = TransportInstaller::new(
//!     Arc::new(catalog::schema().unwrap()),
//!     Arc::new(ProviderRegistry::new()),
//! );
//! let transport = ModelNode::new(
//!     PathAddress::of(catalog::subsystem_path())
//!         .append(PathElement::new("cache-container", "web"))
//!         .append(catalog::transport_path()),
//! )
//! .with("channel", "tcp");
//!
//! let plan = installer.plan(&transport).unwrap();
//! let mut target = InMemoryServiceTarget::new();
//! for external in plan.external_dependencies() {
//!     target.provide(external);
//! }
//! install(&mut target, plan.descriptors()).unwrap();
//! assert!(target.contains(&ServiceKind::Transport.service_name("web")));
//! ```

#![warn(unreachable_pub)]

mod descriptor;
mod error;
mod name;
mod plan;
mod provider;
mod target;

pub use descriptor::{ServiceDescriptor, ServiceInstance, ServiceOrigin};
pub use error::{InstallerError, Result};
pub use name::{InvalidServiceName, ServiceFamily, ServiceKind, ServiceMode, ServiceName};
pub use plan::{ServicePlan, TransportInstaller, DEFAULT_GROUP};
pub use provider::{Contribution, FamilyAliasProvider, GroupAliasProvider, ProviderRegistry};
pub use target::{install, remove, InMemoryServiceTarget, RegisteredService, ServiceTarget};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
