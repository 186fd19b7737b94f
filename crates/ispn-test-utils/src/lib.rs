//! Testing utilities for the ispn workspace
//!
//! Shared fixtures: the "maximal" configuration every legacy release must
//! accept, the configuration exercising rejections, and transport models
//! for the service installer.

#![allow(missing_docs)]

use std::sync::Arc;

use ispn_model::{ModelNode, Operation, PathAddress, PathElement, SchemaRegistry, VersionRegistry};
use ispn_subsystem::{catalog, InfinispanModel};

pub fn addr(text: &str) -> PathAddress {
    text.parse().unwrap()
}

pub fn subsystem_address() -> PathAddress {
    PathAddress::of(catalog::subsystem_path())
}

pub fn container_address(name: &str) -> PathAddress {
    subsystem_address().append(PathElement::new("cache-container", name))
}

pub fn registries() -> (Arc<VersionRegistry>, Arc<SchemaRegistry>) {
    (
        Arc::new(InfinispanModel::registry()),
        Arc::new(catalog::schema().unwrap()),
    )
}

fn component<'a>(cache: &'a mut ModelNode, name: &str) -> &'a mut ModelNode {
    cache.add_child_at(catalog::component_path(name)).unwrap()
}

/// Cache container `maximal` with every resource type a legacy release
/// understands and values none of them reject
pub fn maximal_tree() -> ModelNode {
    let mut root = ModelNode::new(subsystem_address());
    let container = root
        .add_child_at(PathElement::new("cache-container", "maximal"))
        .unwrap();
    container.set("default-cache", "local");
    container.set("aliases", vec!["alias1", "alias2"]);
    container.set("jndi-name", "java:global/infinispan/maximal");
    container.set("module", "org.infinispan");
    container.set("eviction-executor", "infinispan-eviction");
    container.set("listener-executor", "infinispan-listener");
    container.set("statistics-enabled", true);

    let transport = container.add_child_at(catalog::transport_path()).unwrap();
    transport.set("channel", "maximal-channel");
    transport.set("lock-timeout", 120_000);

    let local = container
        .add_child_at(PathElement::new("local-cache", "local"))
        .unwrap();
    local.set("jndi-name", "java:global/infinispan/maximal/local");
    local.set("module", "org.infinispan");
    local.set("statistics-enabled", true);
    let transaction = component(local, "transaction");
    transaction.set("mode", "BATCH");
    transaction.set("stop-timeout", 60_000);
    let locking = component(local, "locking");
    locking.set("isolation", "REPEATABLE_READ");
    locking.set("acquire-timeout", 30_000);
    locking.set("striping", true);
    component(local, "expiration").set("lifespan", 2_000);

    let dist = container
        .add_child_at(PathElement::new("distributed-cache", "dist"))
        .unwrap();
    dist.set("mode", "SYNC");
    dist.set("owners", 4);
    dist.set("segments", 2);
    dist.set("l1-lifespan", 0);
    dist.set("capacity-factor", 2);
    dist.set("consistent-hash-strategy", "INTER_CACHE");
    dist.set("statistics-enabled", true);
    component(dist, "transaction").set("mode", "NON_XA");
    component(dist, "state-transfer").set("timeout", 60_000);
    component(dist, "backups");

    let repl = container
        .add_child_at(PathElement::new("replicated-cache", "repl"))
        .unwrap();
    repl.set("mode", "ASYNC");
    repl.set("queue-size", 1000);
    repl.set("statistics-enabled", true);
    component(repl, "state-transfer").set("enabled", false);

    let invalid = container
        .add_child_at(PathElement::new("invalidation-cache", "invalid"))
        .unwrap();
    invalid.set("mode", "SYNC");
    invalid.set("remote-timeout", 20_000);
    invalid.set("statistics-enabled", true);

    root
}

/// Configuration whose boot operations a legacy release partially rejects:
/// disabled statistics everywhere, cross-site backups on clustered caches
pub fn reject_tree() -> ModelNode {
    let mut root = ModelNode::new(subsystem_address());
    let container = root
        .add_child_at(PathElement::new("cache-container", "maximal"))
        .unwrap();
    container.set("default-cache", "local");
    container.set("statistics-enabled", false);
    container
        .add_child_at(catalog::transport_path())
        .unwrap()
        .set("lock-timeout", 120_000);

    container
        .add_child_at(PathElement::new("local-cache", "local"))
        .unwrap()
        .set("statistics-enabled", false);

    for (kind, name) in [("distributed-cache", "dist"), ("replicated-cache", "repl")] {
        let cache = container.add_child_at(PathElement::new(kind, name)).unwrap();
        cache.set("mode", "SYNC");
        cache.set("statistics-enabled", false);
        let backups = component(cache, "backups");
        for site in ["NYC", "LON"] {
            let backup = backups
                .add_child_at(PathElement::new("backup", site))
                .unwrap();
            backup.set("strategy", "SYNC");
            backup.set("failure-policy", "FAIL");
        }
        let backup_for = component(cache, "backup-for");
        backup_for.set("remote-cache", "users");
        backup_for.set("remote-site", "LON");
    }

    container
        .add_child_at(PathElement::new("invalidation-cache", "invalid"))
        .unwrap()
        .set("statistics-enabled", true);

    root
}

/// Boot operations recreating [`reject_tree`]
pub fn reject_operations() -> Vec<Operation> {
    Operation::describe(&reject_tree())
}

/// Transport of container `container`, optionally with an explicit channel
pub fn transport_tree(container: &str, channel: Option<&str>) -> ModelNode {
    let mut transport = ModelNode::new(container_address(container).append(catalog::transport_path()));
    if let Some(channel) = channel {
        transport.set("channel", channel);
    }
    transport
}
