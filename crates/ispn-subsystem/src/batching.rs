//! Batching derived from the transaction mode
//!
//! Releases before 3.0.0 express batching as a cache flag instead of a
//! transaction mode. A cache whose transaction component runs in `BATCH`
//! mode gets `batching=true`; the mode itself is rewritten to `NONE` by the
//! attribute rules of the transaction component.

use ispn_model::{Attributes, ModelNode, ResourceTransformer, RuleError, Value};

use crate::catalog::{attribute, component_path, resource};

/// Transaction mode meaning "batching"
pub const BATCH_MODE: &str = "BATCH";

/// Sets the legacy `batching` flag of caches with a batching transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchingTransformer;

impl ResourceTransformer for BatchingTransformer {
    fn transform(&self, original: &ModelNode, attributes: &mut Attributes) -> Result<(), RuleError> {
        let batch = original
            .child(&component_path(resource::TRANSACTION))
            .and_then(|transaction| transaction.get(attribute::MODE))
            .is_some_and(|mode| mode.as_str() == Some(BATCH_MODE));
        if batch {
            tracing::debug!("{}: batching derived from transaction mode", original.address());
            attributes.insert(attribute::BATCHING.to_string(), Value::Bool(true));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "derive batching from transaction mode".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ispn_model::PathElement;

    fn cache(mode: Option<&str>) -> ModelNode {
        let mut cache = ModelNode::new(
            "/subsystem=infinispan/cache-container=maximal/local-cache=local"
                .parse()
                .unwrap(),
        );
        let transaction = cache
            .add_child_at(PathElement::new("component", "transaction"))
            .unwrap();
        if let Some(mode) = mode {
            transaction.set("mode", mode);
        }
        cache
    }

    #[test]
    fn batch_mode_sets_batching() {
        let mut attributes = Attributes::new();
        BatchingTransformer
            .transform(&cache(Some("BATCH")), &mut attributes)
            .unwrap();
        assert_eq!(attributes.get("batching"), Some(&Value::Bool(true)));
    }

    #[test]
    fn other_modes_leave_attributes_alone() {
        for mode in [Some("NONE"), Some("FULL_XA"), None] {
            let mut attributes = Attributes::new();
            attributes.insert("batching".into(), Value::Bool(false));
            BatchingTransformer
                .transform(&cache(mode), &mut attributes)
                .unwrap();
            assert_eq!(attributes.get("batching"), Some(&Value::Bool(false)));
        }
    }
}
