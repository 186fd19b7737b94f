//! Compatibility test harness
//!
//! Drives the transformation engine against fixture trees and replayed
//! operation sequences, and reports every difference between what a legacy
//! controller would receive and what it is expected to receive.
//!
//! ```rust,ignore
//! let harness = CompatibilityHarness::new(engine);
//! harness.check_model_transformation(&tree, &legacy, None)?;
//! harness.assert_rejects_operations(&operations, &legacy, &config)?;
//! ```

#![warn(unreachable_pub)]

mod diff;
mod error;
mod harness;
mod reject;

pub use diff::{diff_rejections, diff_trees, CompareOptions};
pub use error::{Difference, DifferenceKind, HarnessAssertionFailure, HarnessError, Result};
pub use harness::CompatibilityHarness;
pub use reject::{AttributeCorrection, ChangeToTrue, ExpectedCorrection, FailedOperationConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
