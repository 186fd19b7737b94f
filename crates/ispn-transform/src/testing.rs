//! Small three-version schema shared by the unit tests

use std::sync::Arc;

use ispn_model::{
    AttributeDefinition, MigrationRule, ModelNode, ModelVersion, PathElement,
    ResourceDescription, SchemaRegistry, Value, ValueType, VersionRegistry,
};

use crate::engine::TransformationEngine;

pub(crate) fn v(major: u32) -> ModelVersion {
    ModelVersion::new(format!("{major}.0.0"), major)
}

pub(crate) fn demo_schema() -> SchemaRegistry {
    let mut schema = SchemaRegistry::new();
    schema
        .define_resource(ResourceDescription::new(
            "subsystem",
            PathElement::new("subsystem", "demo"),
            v(1),
        ))
        .unwrap();
    schema
        .define_resource(ResourceDescription::new(
            "container",
            PathElement::wildcard("container"),
            v(1),
        ))
        .unwrap();
    schema
        .define_resource(ResourceDescription::new(
            "backup",
            PathElement::wildcard("backup"),
            v(2),
        ))
        .unwrap();

    let container = [
        AttributeDefinition::builder("stats", ValueType::Bool, v(2))
            .default_value(false)
            .migrate_below(v(2), MigrationRule::reject_unless(Value::Bool(true), "always on"))
            .build(),
        AttributeDefinition::builder("channel", ValueType::String, v(3))
            .migrate_below(v(3), MigrationRule::rename("stack"))
            .build(),
        AttributeDefinition::builder("stack", ValueType::String, v(1))
            .deprecated()
            .build(),
        AttributeDefinition::builder("mode", ValueType::String, v(1))
            .migrate_below(
                v(3),
                MigrationRule::replace_value(Value::from("BATCH"), Value::from("NONE")),
            )
            .build(),
        AttributeDefinition::builder("strategy", ValueType::String, v(3))
            .migrate_below(v(3), MigrationRule::Discard)
            .build(),
    ];
    for attribute in container {
        schema.define("container", attribute).unwrap();
    }
    schema
        .define(
            "backup",
            AttributeDefinition::builder("site", ValueType::String, v(2)).build(),
        )
        .unwrap();
    schema
}

pub(crate) fn demo_engine_with(schema: SchemaRegistry) -> TransformationEngine {
    let mut versions = VersionRegistry::new();
    for major in 1..=3 {
        versions.register(v(major)).unwrap();
    }
    TransformationEngine::new(Arc::new(versions), Arc::new(schema), v(3))
}

pub(crate) fn demo_engine() -> TransformationEngine {
    demo_engine_with(demo_schema())
}

/// `/subsystem=demo/container=c/backup=x`, every container attribute defined
pub(crate) fn demo_tree() -> ModelNode {
    let mut root = ModelNode::new("/subsystem=demo".parse().unwrap());
    let container = root
        .add_child_at(PathElement::new("container", "c"))
        .unwrap();
    container.set("stats", true);
    container.set("channel", "tcp");
    container.set("mode", "BATCH");
    container.set("strategy", "SYNC");
    container
        .add_child_at(PathElement::new("backup", "x"))
        .unwrap()
        .set("site", "NYC");
    root
}
