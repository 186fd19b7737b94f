use std::fs;
use std::path::PathBuf;

use ispn_compat::commands::{self, render_check};
use ispn_compat::{read_tree, resolve_target, Compat, CompatConfig};
use ispn_model::{ModelDocument, ModelNode};
use ispn_subsystem::InfinispanModel;
use ispn_test_utils::{maximal_tree, reject_tree};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_document(dir: &TempDir, tree: &ModelNode) -> PathBuf {
    let path = dir.path().join("infinispan.json");
    let document = ModelDocument::from_node(tree).unwrap();
    fs::write(&path, document.to_json().unwrap()).unwrap();
    path
}

fn compat() -> Compat {
    Compat::new(&CompatConfig::default()).unwrap()
}

#[test]
fn document_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, &maximal_tree());
    assert_eq!(read_tree(&path).unwrap(), maximal_tree());
}

#[test]
fn malformed_document_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"type\": \"subsystem\"").unwrap();
    let err = read_tree(&path).unwrap_err();
    assert!(format!("{err:#}").contains("is not a model document"));
}

#[test]
fn targets_by_version_or_release() {
    assert_eq!(resolve_target("1.6.0").unwrap(), InfinispanModel::Version1_6_0);
    assert_eq!(resolve_target("eap-630").unwrap(), InfinispanModel::Version1_5_0);
    assert_eq!(resolve_target("wildfly-820").unwrap(), InfinispanModel::Version2_0_0);
    assert!(resolve_target("9.9.9").is_err());
}

#[test]
fn versions_lists_releases() {
    let text = commands::versions(false).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("4.0.0"));
    assert!(first.ends_with("current"));
    assert!(text.contains("EAP 6.4.0"));

    let json: serde_json::Value = serde_json::from_str(&commands::versions(true).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 6);
    assert_eq!(json[0]["current"], serde_json::Value::Bool(true));
}

#[test]
fn transform_reports_rejections() {
    let output = compat()
        .transform(&reject_tree(), &InfinispanModel::Version1_6_0.version(), true)
        .unwrap();
    assert!(!output.clean);
    let json: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(json["report"]["target"], "1.6.0");
    assert_eq!(json["report"]["rejections"].as_array().unwrap().len(), 6);
    assert_eq!(json["model"]["type"], "subsystem");

    let clean = compat()
        .transform(&maximal_tree(), &InfinispanModel::Version1_4_1.version(), false)
        .unwrap();
    assert!(clean.clean);
}

#[test]
fn check_passes_on_every_legacy_model() {
    let targets = [
        InfinispanModel::Version1_4_1,
        InfinispanModel::Version1_5_0,
        InfinispanModel::Version1_6_0,
        InfinispanModel::Version2_0_0,
    ];
    let lines = compat().check(&maximal_tree(), &targets).unwrap();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| line.passed() && line.fingerprint.is_some()));
    assert!(lines.iter().all(|line| line.rejections == 0));

    let rendered = render_check(&lines).unwrap();
    assert_eq!(rendered.lines().count(), 4);
    assert!(rendered.lines().all(|line| line.contains(" ok ")));
}

#[test]
fn check_counts_rejections() {
    let lines = compat()
        .check(&reject_tree(), &[InfinispanModel::Version1_6_0])
        .unwrap();
    assert!(lines[0].passed());
    assert_eq!(lines[0].rejections, 6);
}

#[test]
fn plan_uses_channel_or_configured_group() {
    let text = compat().plan(&maximal_tree(), false).unwrap();
    assert!(text.starts_with("maximal over channel 'maximal-channel'"));
    assert!(text.contains("external jboss.jgroups.stack.maximal-channel"));

    let mut config = CompatConfig::default();
    config.installer.default_group = "cluster".to_string();
    let text = Compat::new(&config).unwrap().plan(&reject_tree(), false).unwrap();
    assert!(text.contains("over channel 'cluster'"));

    let removal = compat().plan(&maximal_tree(), true).unwrap();
    assert!(removal.contains("remove jboss.jgroups.channel.maximal.connector  (not installed)"));
}

#[test]
fn plan_needs_a_transport() {
    let mut tree = maximal_tree();
    let container = tree.children()[0].element().unwrap().clone();
    tree.child_mut(&container)
        .unwrap()
        .remove_child(&ispn_subsystem::catalog::transport_path());
    assert!(compat().plan(&tree, false).is_err());
}
