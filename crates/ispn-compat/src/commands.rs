//! Command implementations; each returns the text to print

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use ispn_harness::{CompatibilityHarness, HarnessError};
use ispn_model::{Fingerprint, ModelDocument, ModelNode, ModelVersion, PathAddress};
use ispn_service::{install, InMemoryServiceTarget, ProviderRegistry, TransportInstaller};
use ispn_subsystem::{catalog, model_fixer, InfinispanModel, LegacyRelease};
use ispn_transform::TransformationEngine;
use serde_json::json;

use crate::config::CompatConfig;

/// Target given as a model id (`1.6.0`) or a release key (`eap-640`)
///
/// # Errors
/// Neither a model id nor a release key
pub fn resolve_target(text: &str) -> Result<InfinispanModel> {
    text.parse::<InfinispanModel>()
        .or_else(|_| text.parse::<LegacyRelease>().map(LegacyRelease::model))
        .map_err(|_| anyhow!("unknown model version or release '{text}'"))
}

/// Read a subsystem model document
///
/// # Errors
/// Unreadable file or malformed document
pub fn read_tree(path: &Path) -> Result<ModelNode> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = ModelDocument::from_json(&text)
        .with_context(|| format!("{} is not a model document", path.display()))?;
    Ok(document.into_node(&PathAddress::root())?)
}

fn releases_of(model: InfinispanModel) -> Vec<LegacyRelease> {
    LegacyRelease::ALL
        .into_iter()
        .filter(|release| release.model() == model)
        .collect()
}

/// Known model versions, newest first
///
/// # Errors
/// JSON rendering failure
pub fn versions(as_json: bool) -> Result<String> {
    let models = InfinispanModel::ALL.into_iter().rev();
    if as_json {
        let entries: Vec<_> = models
            .map(|model| {
                let releases: Vec<_> = releases_of(model).into_iter().map(LegacyRelease::key).collect();
                json!({
                    "id": model.id(),
                    "ordinal": model.ordinal(),
                    "current": model == InfinispanModel::CURRENT,
                    "releases": releases,
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&entries)?);
    }

    let mut out = String::new();
    for model in models {
        let releases: Vec<_> = releases_of(model).into_iter().map(LegacyRelease::name).collect();
        let note = if model == InfinispanModel::CURRENT {
            "current".to_string()
        } else {
            releases.join(", ")
        };
        writeln!(out, "{:<6} ({})  {note}", model.id(), model.ordinal())?;
    }
    Ok(out)
}

/// Output of `transform`
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Text to print
    pub text: String,
    /// Nothing was rejected
    pub clean: bool,
}

/// Outcome of `check` for one target
#[derive(Debug, Clone)]
pub struct CheckLine {
    /// Target model
    pub model: InfinispanModel,
    /// Fingerprint of the fixed legacy model, if checks passed
    pub fingerprint: Option<Fingerprint>,
    /// Rejections recorded on the way
    pub rejections: usize,
    /// Failure, if any
    pub failure: Option<String>,
}

impl CheckLine {
    /// Check if the target passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Engine and installer built from a configuration
#[derive(Debug, Clone)]
pub struct Compat {
    engine: TransformationEngine,
    installer: TransportInstaller,
}

impl Compat {
    /// Build from `config`
    ///
    /// # Errors
    /// The subsystem catalog is inconsistent
    pub fn new(config: &CompatConfig) -> Result<Self> {
        let versions = Arc::new(InfinispanModel::registry());
        let schema = Arc::new(catalog::schema()?);
        let engine = TransformationEngine::new(
            versions,
            Arc::clone(&schema),
            InfinispanModel::CURRENT.version(),
        )
        .with_options(config.transform);
        let installer = TransportInstaller::new(schema, Arc::new(ProviderRegistry::new()))
            .with_default_group(config.installer.default_group.as_str());
        Ok(Self { engine, installer })
    }

    /// Transformation engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &TransformationEngine {
        &self.engine
    }

    /// Service installer
    #[inline]
    #[must_use]
    pub fn installer(&self) -> &TransportInstaller {
        &self.installer
    }

    /// Transform `tree` to `target`
    ///
    /// # Errors
    /// Engine failure or JSON rendering failure
    pub fn transform(&self, tree: &ModelNode, target: &ModelVersion, as_json: bool) -> Result<TransformOutput> {
        let result = self.engine.transform(tree, target)?;
        let report = result.report();
        let document = ModelDocument::from_node(result.transformed())
            .ok_or_else(|| anyhow!("cannot render the root resource as a document"))?;

        let text = if as_json {
            serde_json::to_string_pretty(&json!({
                "model": document,
                "report": report,
            }))?
        } else {
            format!("{}\n{report}", document.to_json()?)
        };
        Ok(TransformOutput {
            text,
            clean: result.is_clean(),
        })
    }

    /// Check that `tree` boots on each of `targets`, twice, with identical
    /// results
    ///
    /// # Errors
    /// Engine failure other than a failed assertion
    pub fn check(&self, tree: &ModelNode, targets: &[InfinispanModel]) -> Result<Vec<CheckLine>> {
        let harness = CompatibilityHarness::new(self.engine.clone());
        let mut lines = Vec::with_capacity(targets.len());
        for &model in targets {
            let target = model.version();
            let rejections = self.engine.transform(tree, &target)?.rejections().len();
            let fixer = model_fixer(model);
            let run = || harness.check_model_transformation(tree, &target, fixer.as_deref());

            let line = match (run(), run()) {
                (Ok(first), Ok(second)) => {
                    let (a, b) = (Fingerprint::of(&first), Fingerprint::of(&second));
                    CheckLine {
                        model,
                        fingerprint: Some(a),
                        rejections,
                        failure: (a != b).then(|| format!("non-deterministic: {} then {}", a.short(), b.short())),
                    }
                }
                (Err(HarnessError::Transform(e)), _) | (_, Err(HarnessError::Transform(e))) => {
                    return Err(e.into());
                }
                (Err(HarnessError::Assertion(failure)), _) | (_, Err(HarnessError::Assertion(failure))) => {
                    CheckLine {
                        model,
                        fingerprint: None,
                        rejections,
                        failure: Some(failure.to_string()),
                    }
                }
            };
            tracing::info!("checked {target}: passed={}", line.passed());
            lines.push(line);
        }
        Ok(lines)
    }

    /// Service plan of every transport in `tree`, dry-run installed
    ///
    /// # Errors
    /// Planning or installation failure, or a tree without transports
    pub fn plan(&self, tree: &ModelNode, uninstall: bool) -> Result<String> {
        let mut transports = Vec::new();
        tree.walk(&mut |node| {
            if node
                .element()
                .is_some_and(|element| element.key() == catalog::resource::TRANSPORT)
            {
                transports.push(node);
            }
        });
        if transports.is_empty() {
            bail!("no transport in {}", tree.address());
        }

        let mut out = String::new();
        for transport in transports {
            let plan = self.installer.plan(transport)?;
            writeln!(out, "{} over channel '{}'", plan.group(), plan.channel())?;

            let mut target = InMemoryServiceTarget::new();
            for external in plan.external_dependencies() {
                target.provide(external);
            }
            install(&mut target, plan.descriptors())?;

            if uninstall {
                for (i, name) in self.installer.uninstall(transport)?.iter().enumerate() {
                    let state = if target.contains(name) { "" } else { "  (not installed)" };
                    writeln!(out, "  {:>2}. remove {name}{state}", i + 1)?;
                }
                continue;
            }
            for (i, descriptor) in plan.descriptors().iter().enumerate() {
                let dependencies: Vec<String> =
                    descriptor.dependencies().iter().map(ToString::to_string).collect();
                writeln!(
                    out,
                    "  {:>2}. {} [{}]{}",
                    i + 1,
                    descriptor.name(),
                    descriptor.mode(),
                    if dependencies.is_empty() {
                        String::new()
                    } else {
                        format!(" <- {}", dependencies.join(", "))
                    }
                )?;
            }
            for external in plan.external_dependencies() {
                writeln!(out, "      external {external}")?;
            }
        }
        Ok(out)
    }
}

/// Render `check` lines
///
/// # Errors
/// Formatting failure
pub fn render_check(lines: &[CheckLine]) -> Result<String> {
    let mut out = String::new();
    for line in lines {
        let releases: Vec<_> = releases_of(line.model).into_iter().map(LegacyRelease::name).collect();
        let status = if line.passed() { "ok" } else { "FAILED" };
        let fingerprint = line.fingerprint.map(|f| f.short()).unwrap_or_default();
        writeln!(
            out,
            "{:<6} {status:<6} {fingerprint:<16} {} rejection(s)  {}",
            line.model.id(),
            line.rejections,
            releases.join(", ")
        )?;
        if let Some(failure) = &line.failure {
            writeln!(out, "{failure}")?;
        }
    }
    Ok(out)
}
