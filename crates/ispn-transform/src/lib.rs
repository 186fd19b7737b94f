//! Model transformation and compatibility rejection
//!
//! Given a model authored at the current version, decides which attributes
//! and resources a legacy version can understand.
//!
//! # Core Concepts
//!
//! - [`TransformationEngine`]: walks a tree applying migration rules
//! - [`TransformationResult`]: transformed tree plus its rejections
//! - [`Rejection`]: a resource or attribute the target cannot express
//! - [`OperationOutcome`]: fate of a single management operation
//! - [`Violation`]: reason a tree would not boot at a version
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = TransformationEngine::new(versions, schema, current);
//! let result = engine.transform(&tree, &legacy)?;
//! for rejection in result.rejections() {
//!     println!("{rejection}");
//! }
//! ```

#![warn(unreachable_pub)]

mod engine;
mod error;
mod operation;
mod rejection;
mod validate;

#[cfg(test)]
mod testing;

pub use engine::{TransformOptions, TransformationEngine, TransformationResult};
pub use error::{Result, TransformError};
pub use operation::OperationOutcome;
pub use rejection::{Rejection, RejectionReason, RejectionReport};
pub use validate::{Violation, ViolationKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
