//! Per-version model fixers

use ispn_model::ModelFixer;

use crate::model::InfinispanModel;

/// Fixer to run on models transformed to `model`
///
/// No released version currently needs one.
#[must_use]
pub fn model_fixer(model: InfinispanModel) -> Option<Box<dyn ModelFixer>> {
    match model {
        InfinispanModel::Version1_4_1
        | InfinispanModel::Version1_5_0
        | InfinispanModel::Version1_6_0
        | InfinispanModel::Version2_0_0
        | InfinispanModel::Version3_0_0
        | InfinispanModel::Version4_0_0 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_version_needs_fixing() {
        assert!(InfinispanModel::ALL.into_iter().all(|m| model_fixer(m).is_none()));
    }
}
