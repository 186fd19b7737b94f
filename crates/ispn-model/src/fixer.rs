//! Legacy model fix-up hook

use std::fmt::Debug;

use crate::node::ModelNode;
use crate::version::ModelVersion;

/// Adjusts a transformed model before a legacy controller reads it
///
/// Some legacy releases need a tree massaged after transformation, e.g. to
/// fill in attributes they require but the current model leaves undefined.
pub trait ModelFixer: Send + Sync + Debug {
    /// Fix up `model`, already transformed to `version`
    fn fix(&self, model: ModelNode, version: &ModelVersion) -> ModelNode;
}
