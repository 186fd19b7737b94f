//! Infinispan subsystem schema
//!
//! Every resource type and attribute of the cache-container model, with the
//! version it appeared in and how it is carried to older models.
//!
//! ```text
//! subsystem=infinispan
//! └── cache-container=*
//!     ├── transport=jgroups
//!     └── {local,distributed,replicated,invalidation}-cache=*
//!         ├── component=transaction
//!         ├── component=locking
//!         ├── component=state-transfer   (clustered caches)
//!         ├── component=expiration
//!         ├── component=backups
//!         │   └── backup=*               (2.0.0)
//!         └── component=backup-for       (2.0.0)
//! ```

use std::sync::Arc;

use ispn_model::{
    AttributeDefinition, MigrationRule, PathElement, ResourceDescription, SchemaRegistry, Value,
    ValueType,
};

use crate::batching::BatchingTransformer;
use crate::error::SubsystemError;
use crate::model::InfinispanModel::{
    self, Version1_4_1 as V1_4_1, Version1_5_0 as V1_5_0, Version2_0_0 as V2_0_0,
    Version3_0_0 as V3_0_0,
};

/// Resource type names
pub mod resource {
    /// `subsystem=infinispan`
    pub const SUBSYSTEM: &str = "subsystem";
    /// `cache-container=*`
    pub const CACHE_CONTAINER: &str = "cache-container";
    /// `transport=jgroups`
    pub const TRANSPORT: &str = "transport";
    /// `local-cache=*`
    pub const LOCAL_CACHE: &str = "local-cache";
    /// `distributed-cache=*`
    pub const DISTRIBUTED_CACHE: &str = "distributed-cache";
    /// `replicated-cache=*`
    pub const REPLICATED_CACHE: &str = "replicated-cache";
    /// `invalidation-cache=*`
    pub const INVALIDATION_CACHE: &str = "invalidation-cache";
    /// `component=transaction`
    pub const TRANSACTION: &str = "transaction";
    /// `component=locking`
    pub const LOCKING: &str = "locking";
    /// `component=state-transfer`
    pub const STATE_TRANSFER: &str = "state-transfer";
    /// `component=expiration`
    pub const EXPIRATION: &str = "expiration";
    /// `component=backups`
    pub const BACKUPS: &str = "backups";
    /// `backup=*`
    pub const BACKUP: &str = "backup";
    /// `component=backup-for`
    pub const BACKUP_FOR: &str = "backup-for";

    /// Every cache resource type
    pub const CACHES: [&str; 4] = [
        LOCAL_CACHE,
        DISTRIBUTED_CACHE,
        REPLICATED_CACHE,
        INVALIDATION_CACHE,
    ];

    /// Cache resource types spanning the cluster
    pub const CLUSTERED_CACHES: [&str; 3] = [DISTRIBUTED_CACHE, REPLICATED_CACHE, INVALIDATION_CACHE];
}

/// Attribute names used outside the catalog
pub mod attribute {
    /// Channel of a transport
    pub const CHANNEL: &str = "channel";
    /// Protocol stack of a transport (legacy form of the channel)
    pub const STACK: &str = "stack";
    /// Transport lock timeout
    pub const LOCK_TIMEOUT: &str = "lock-timeout";
    /// Statistics toggle of containers and caches
    pub const STATISTICS_ENABLED: &str = "statistics-enabled";
    /// Deprecated batching flag of caches
    pub const BATCHING: &str = "batching";
    /// Transaction mode
    pub const MODE: &str = "mode";
}

/// Path element of the subsystem root
#[must_use]
pub fn subsystem_path() -> PathElement {
    PathElement::new("subsystem", "infinispan")
}

/// Path element of a component child
#[must_use]
pub fn component_path(name: &str) -> PathElement {
    PathElement::new("component", name)
}

/// Path element of the transport child of a container
#[must_use]
pub fn transport_path() -> PathElement {
    PathElement::new(resource::TRANSPORT, "jgroups")
}

const STATISTICS_REASON: &str = "statistics cannot be disabled in this version";

fn attr(name: &str, value_type: ValueType) -> ispn_model::AttributeDefinitionBuilder {
    AttributeDefinition::builder(name, value_type, V1_4_1.version())
}

fn statistics_enabled() -> AttributeDefinition {
    AttributeDefinition::builder(attribute::STATISTICS_ENABLED, ValueType::Bool, V1_5_0.version())
        .default_value(false)
        .migrate_below(
            V1_5_0.version(),
            MigrationRule::reject_unless(Value::Bool(true), STATISTICS_REASON),
        )
        .build()
}

fn define_all(
    schema: &mut SchemaRegistry,
    resource_type: &str,
    attributes: Vec<AttributeDefinition>,
) -> Result<(), SubsystemError> {
    for attribute in attributes {
        schema.define(resource_type, attribute)?;
    }
    Ok(())
}

fn describe(
    schema: &mut SchemaRegistry,
    name: &str,
    path: PathElement,
    introduced_in: InfinispanModel,
) -> Result<(), SubsystemError> {
    schema.define_resource(ResourceDescription::new(name, path, introduced_in.version()))?;
    Ok(())
}

/// Build the schema registry of the subsystem
///
/// # Errors
/// Returns [`SubsystemError::Schema`] if the catalog tables contradict
/// themselves
pub fn schema() -> Result<SchemaRegistry, SubsystemError> {
    let mut schema = SchemaRegistry::new();
    define_containers(&mut schema)?;
    define_caches(&mut schema)?;
    define_components(&mut schema)?;
    define_backups(&mut schema)?;
    tracing::debug!(
        "infinispan catalog: {} resource type(s)",
        schema.resource_types().count()
    );
    Ok(schema)
}

fn define_containers(schema: &mut SchemaRegistry) -> Result<(), SubsystemError> {
    describe(schema, resource::SUBSYSTEM, subsystem_path(), V1_4_1)?;
    define_all(
        schema,
        resource::SUBSYSTEM,
        vec![attr("default-cache-container", ValueType::String).deprecated().build()],
    )?;

    describe(
        schema,
        resource::CACHE_CONTAINER,
        PathElement::wildcard(resource::CACHE_CONTAINER),
        V1_4_1,
    )?;
    define_all(
        schema,
        resource::CACHE_CONTAINER,
        vec![
            attr("default-cache", ValueType::String).build(),
            attr("aliases", ValueType::List).build(),
            attr("jndi-name", ValueType::String).build(),
            attr("start", ValueType::String).deprecated().default_value("LAZY").build(),
            attr("module", ValueType::String)
                .default_value("org.jboss.as.clustering.infinispan")
                .build(),
            attr("eviction-executor", ValueType::String).build(),
            attr("listener-executor", ValueType::String).build(),
            attr("replication-queue-executor", ValueType::String).build(),
            statistics_enabled(),
        ],
    )?;

    describe(schema, resource::TRANSPORT, transport_path(), V1_4_1)?;
    define_all(
        schema,
        resource::TRANSPORT,
        vec![
            AttributeDefinition::builder(attribute::CHANNEL, ValueType::String, V3_0_0.version())
                .migrate_below(V3_0_0.version(), MigrationRule::rename(attribute::STACK))
                .build(),
            attr(attribute::STACK, ValueType::String).deprecated().build(),
            attr("cluster", ValueType::String).deprecated().build(),
            attr("executor", ValueType::String).deprecated().build(),
            attr(attribute::LOCK_TIMEOUT, ValueType::Int)
                .default_value(240_000)
                .build(),
        ],
    )
}

fn define_caches(schema: &mut SchemaRegistry) -> Result<(), SubsystemError> {
    let batching = Arc::new(BatchingTransformer);
    for cache in resource::CACHES {
        schema.define_resource(
            ResourceDescription::new(cache, PathElement::wildcard(cache), V1_4_1.version())
                .transform_below(V3_0_0.version(), batching.clone()),
        )?;
        define_all(
            schema,
            cache,
            vec![
                attr("start", ValueType::String).deprecated().default_value("LAZY").build(),
                attr(attribute::BATCHING, ValueType::Bool)
                    .deprecated()
                    .default_value(false)
                    .build(),
                attr("jndi-name", ValueType::String).build(),
                attr("module", ValueType::String).build(),
                attr("indexing", ValueType::String)
                    .deprecated()
                    .default_value("NONE")
                    .build(),
                statistics_enabled(),
            ],
        )?;
    }

    for cache in resource::CLUSTERED_CACHES {
        define_all(
            schema,
            cache,
            vec![
                attr(attribute::MODE, ValueType::String).build(),
                attr("remote-timeout", ValueType::Int).default_value(17_500).build(),
                attr("queue-size", ValueType::Int).default_value(0).build(),
                attr("queue-flush-interval", ValueType::Int)
                    .default_value(10)
                    .build(),
            ],
        )?;
    }

    define_all(
        schema,
        resource::DISTRIBUTED_CACHE,
        vec![
            attr("owners", ValueType::Int).default_value(2).build(),
            attr("segments", ValueType::Int).default_value(80).build(),
            attr("virtual-nodes", ValueType::Int)
                .deprecated()
                .default_value(1)
                .build(),
            attr("l1-lifespan", ValueType::Int).default_value(600_000).build(),
            AttributeDefinition::builder("capacity-factor", ValueType::Int, V3_0_0.version())
                .default_value(1)
                .migrate_below(V3_0_0.version(), MigrationRule::Discard)
                .build(),
            AttributeDefinition::builder(
                "consistent-hash-strategy",
                ValueType::String,
                V3_0_0.version(),
            )
            .default_value("INTRA_CACHE")
            .migrate_below(V3_0_0.version(), MigrationRule::Discard)
            .build(),
        ],
    )
}

fn define_components(schema: &mut SchemaRegistry) -> Result<(), SubsystemError> {
    describe(
        schema,
        resource::TRANSACTION,
        component_path(resource::TRANSACTION),
        V1_4_1,
    )?;
    define_all(
        schema,
        resource::TRANSACTION,
        vec![
            attr(attribute::MODE, ValueType::String)
                .default_value("NONE")
                .migrate_below(
                    V3_0_0.version(),
                    MigrationRule::replace_value(Value::from("BATCH"), Value::from("NONE")),
                )
                .build(),
            attr("locking", ValueType::String)
                .default_value("OPTIMISTIC")
                .build(),
            attr("stop-timeout", ValueType::Int).default_value(10_000).build(),
        ],
    )?;

    describe(schema, resource::LOCKING, component_path(resource::LOCKING), V1_4_1)?;
    define_all(
        schema,
        resource::LOCKING,
        vec![
            attr("isolation", ValueType::String)
                .default_value("READ_COMMITTED")
                .build(),
            attr("acquire-timeout", ValueType::Int).default_value(15_000).build(),
            attr("striping", ValueType::Bool).default_value(false).build(),
            attr("concurrency-level", ValueType::Int)
                .default_value(1000)
                .build(),
        ],
    )?;

    describe(
        schema,
        resource::STATE_TRANSFER,
        component_path(resource::STATE_TRANSFER),
        V1_4_1,
    )?;
    define_all(
        schema,
        resource::STATE_TRANSFER,
        vec![
            attr("enabled", ValueType::Bool).default_value(true).build(),
            attr("timeout", ValueType::Int).default_value(240_000).build(),
            attr("chunk-size", ValueType::Int).default_value(512).build(),
        ],
    )?;

    describe(
        schema,
        resource::EXPIRATION,
        component_path(resource::EXPIRATION),
        V1_4_1,
    )?;
    define_all(
        schema,
        resource::EXPIRATION,
        vec![
            attr("max-idle", ValueType::Int).default_value(-1).build(),
            attr("lifespan", ValueType::Int).default_value(-1).build(),
            attr("interval", ValueType::Int).default_value(60_000).build(),
        ],
    )
}

fn define_backups(schema: &mut SchemaRegistry) -> Result<(), SubsystemError> {
    describe(schema, resource::BACKUPS, component_path(resource::BACKUPS), V1_4_1)?;

    describe(
        schema,
        resource::BACKUP,
        PathElement::wildcard(resource::BACKUP),
        V2_0_0,
    )?;
    let since = || V2_0_0.version();
    define_all(
        schema,
        resource::BACKUP,
        vec![
            AttributeDefinition::builder("strategy", ValueType::String, since())
                .default_value("ASYNC")
                .build(),
            AttributeDefinition::builder("failure-policy", ValueType::String, since())
                .default_value("WARN")
                .build(),
            AttributeDefinition::builder("enabled", ValueType::Bool, since())
                .default_value(true)
                .build(),
            AttributeDefinition::builder("timeout", ValueType::Int, since())
                .default_value(10_000)
                .build(),
            AttributeDefinition::builder("after-failures", ValueType::Int, since())
                .default_value(1)
                .build(),
            AttributeDefinition::builder("min-wait", ValueType::Int, since())
                .default_value(0)
                .build(),
        ],
    )?;

    describe(
        schema,
        resource::BACKUP_FOR,
        component_path(resource::BACKUP_FOR),
        V2_0_0,
    )?;
    define_all(
        schema,
        resource::BACKUP_FOR,
        vec![
            AttributeDefinition::builder("remote-cache", ValueType::String, since())
                .default_value("___defaultcache")
                .build(),
            AttributeDefinition::builder("remote-site", ValueType::String, since()).build(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_at(schema: &SchemaRegistry, resource_type: &str, model: InfinispanModel) -> Vec<String> {
        schema
            .attributes_valid_at(resource_type, &model.version())
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    #[test]
    fn catalog_builds() {
        let schema = schema().unwrap();
        assert_eq!(schema.resource_types().count(), 14);
    }

    #[test]
    fn statistics_appear_in_1_5_0() {
        let schema = schema().unwrap();
        for resource_type in [resource::CACHE_CONTAINER, resource::LOCAL_CACHE] {
            assert!(!names_at(&schema, resource_type, InfinispanModel::Version1_4_1)
                .contains(&attribute::STATISTICS_ENABLED.to_string()));
            assert!(names_at(&schema, resource_type, InfinispanModel::Version1_5_0)
                .contains(&attribute::STATISTICS_ENABLED.to_string()));
        }
    }

    #[test]
    fn transport_channel_replaces_stack() {
        let schema = schema().unwrap();
        let legacy = names_at(&schema, resource::TRANSPORT, InfinispanModel::Version2_0_0);
        assert!(legacy.contains(&"stack".to_string()));
        assert!(!legacy.contains(&"channel".to_string()));
        assert_eq!(
            schema.default_value(resource::TRANSPORT, attribute::LOCK_TIMEOUT),
            Some(&Value::Int(240_000))
        );
    }

    #[test]
    fn backups_are_newer_than_their_container() {
        let schema = schema().unwrap();
        let v1 = InfinispanModel::Version1_6_0.version();
        let backups = schema.resolve(&component_path(resource::BACKUPS)).unwrap();
        let backup = schema.resolve(&PathElement::new("backup", "NYC")).unwrap();
        let backup_for = schema.resolve(&component_path(resource::BACKUP_FOR)).unwrap();
        assert!(backups.is_valid_at(&v1));
        assert!(!backup.is_valid_at(&v1));
        assert!(!backup_for.is_valid_at(&v1));
    }

    #[test]
    fn caches_carry_batching_transformer_below_3_0_0() {
        let schema = schema().unwrap();
        for cache in resource::CACHES {
            let description = schema.description(cache).unwrap();
            assert_eq!(
                description
                    .transformers_for(&InfinispanModel::Version2_0_0.version())
                    .count(),
                1
            );
            assert_eq!(
                description
                    .transformers_for(&InfinispanModel::Version3_0_0.version())
                    .count(),
                0
            );
        }
    }
}
