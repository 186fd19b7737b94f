//! Infinispan subsystem catalog
//!
//! The concrete schema of the clustered cache subsystem: its model
//! versions, the legacy releases running them, and the attribute tables
//! driving transformation to those releases.
//!
//! # Example
//!
//! ```rust
//! use ispn_subsystem::{catalog, InfinispanModel, LegacyRelease};
//!
//! let schema = catalog::schema().unwrap();
//! let legacy = LegacyRelease::Eap630.model().version();
//! assert!(InfinispanModel::CURRENT.requires_transformation(&legacy));
//! assert!(schema.resolve(&catalog::transport_path()).is_some());
//! ```

#![warn(unreachable_pub)]

mod batching;
pub mod catalog;
mod error;
mod fixer;
mod model;
mod release;

pub use batching::{BatchingTransformer, BATCH_MODE};
pub use error::SubsystemError;
pub use fixer::model_fixer;
pub use model::InfinispanModel;
pub use release::LegacyRelease;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
