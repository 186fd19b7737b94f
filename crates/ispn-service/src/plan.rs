//! Transport service planning
//!
//! Turns the transport resource of a cache container into the services it
//! needs, ordered so that every service follows its dependencies.
//!
//! ```text
//! binding ──► channel ──► channel factory ──► protocol stack <channel>
//! transport ─┘
//! provider aliases ──► <family>.<channel>, channel
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use ispn_model::{ModelNode, SchemaRegistry, Value};
use ispn_subsystem::catalog::{attribute, resource};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::descriptor::{ServiceDescriptor, ServiceInstance, ServiceOrigin};
use crate::error::{InstallerError, Result};
use crate::name::{ServiceFamily, ServiceKind, ServiceMode, ServiceName};
use crate::provider::ProviderRegistry;

/// Group a transport without an explicit channel joins
pub const DEFAULT_GROUP: &str = "ee";

/// Services of one transport in dependency order
#[derive(Debug, Clone)]
pub struct ServicePlan {
    group: String,
    channel: String,
    descriptors: Vec<ServiceDescriptor>,
}

impl ServicePlan {
    /// Cache container name
    #[inline]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Resolved channel
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Descriptors, dependencies first
    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Planned service names, dependencies first
    pub fn names(&self) -> impl Iterator<Item = &ServiceName> {
        self.descriptors.iter().map(ServiceDescriptor::name)
    }

    /// Descriptor planned under `name`
    #[must_use]
    pub fn get(&self, name: &ServiceName) -> Option<&ServiceDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Dependencies installed outside this plan
    #[must_use]
    pub fn external_dependencies(&self) -> BTreeSet<ServiceName> {
        let planned: BTreeSet<&ServiceName> = self.names().collect();
        self.descriptors
            .iter()
            .flat_map(ServiceDescriptor::dependencies)
            .filter(|dependency| !planned.contains(dependency))
            .cloned()
            .collect()
    }

    /// Descriptors, dependencies first
    #[inline]
    #[must_use]
    pub fn into_descriptors(self) -> Vec<ServiceDescriptor> {
        self.descriptors
    }
}

/// Plans and unplans the services of cache container transports
#[derive(Debug, Clone)]
pub struct TransportInstaller {
    schema: Arc<SchemaRegistry>,
    providers: Arc<ProviderRegistry>,
    default_group: String,
}

impl TransportInstaller {
    /// Create an installer resolving defaults from `schema`
    #[must_use]
    pub fn new(schema: Arc<SchemaRegistry>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            schema,
            providers,
            default_group: DEFAULT_GROUP.to_string(),
        }
    }

    /// Replace the channel used when the transport names none
    #[must_use]
    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = group.into();
        self
    }

    /// Channel used when the transport names none
    #[inline]
    #[must_use]
    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Provider registry
    #[inline]
    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Plan the services of the transport resource `transport`
    ///
    /// # Errors
    /// - [`InstallerError::InvalidAddress`] when `transport` is not below a
    ///   cache container
    /// - [`InstallerError::InvalidAttribute`] on an ill-typed attribute
    /// - [`InstallerError::Cycle`] when provider contributions loop
    pub fn plan(&self, transport: &ModelNode) -> Result<ServicePlan> {
        let group = container_name(transport)?;
        let channel = self.resolve_channel(transport)?;
        let lock_timeout = self.resolve_lock_timeout(transport)?;

        let descriptors = order(self.descriptors(&group, &channel, lock_timeout))?;
        tracing::debug!(
            "planned {} service(s) for transport of '{group}' over '{channel}'",
            descriptors.len()
        );
        Ok(ServicePlan {
            group,
            channel,
            descriptors,
        })
    }

    /// Names to remove when the transport resource `transport` goes away,
    /// dependents first
    ///
    /// Providers are enumerated again, so contributions of providers
    /// registered after installation are removed too. Every member of the
    /// container and channel name families is included whether or not it
    /// was ever installed. Only the container name is required: an
    /// ill-typed channel falls back to the default group, `lock-timeout` is
    /// not read, and looping contributions are removed before the built-in
    /// services in registration order.
    ///
    /// # Errors
    /// [`InstallerError::InvalidAddress`] when `transport` is not below a
    /// cache container
    pub fn uninstall(&self, transport: &ModelNode) -> Result<Vec<ServiceName>> {
        let group = container_name(transport)?;
        let channel = self.resolve_channel(transport).unwrap_or_else(|err| {
            tracing::warn!("{err}; removing services of '{group}' over '{}'", self.default_group);
            self.default_group.clone()
        });

        // Instances are never built for removal
        let unique = dedup(self.descriptors(&group, &channel, 0));
        let mut names: Vec<ServiceName> = match sort(&unique) {
            Ok(sorted) => sorted
                .into_iter()
                .rev()
                .map(|i| unique[i].name().clone())
                .collect(),
            Err(err) => {
                tracing::warn!("{err}; removing contributions of '{group}' unordered");
                let (contributed, builtin): (Vec<_>, Vec<_>) = unique
                    .iter()
                    .partition(|descriptor| descriptor.kind().is_none());
                contributed
                    .into_iter()
                    .chain(builtin)
                    .map(|descriptor| descriptor.name().clone())
                    .collect()
            }
        };
        for kind in ServiceKind::ALL {
            if kind.family() == ServiceFamily::Naming {
                continue;
            }
            let name = kind.service_name(&group);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Built-in services, dependents first, followed by provider
    /// contributions
    fn descriptors(&self, group: &str, channel: &str, lock_timeout: i64) -> Vec<ServiceDescriptor> {
        let name = |kind: ServiceKind| kind.service_name(group);
        let origin = ServiceOrigin::Transport;
        let mut descriptors = Vec::new();

        let (g, c) = (group.to_string(), channel.to_string());
        descriptors.push(
            ServiceDescriptor::new(
                name(ServiceKind::Transport),
                origin(ServiceKind::Transport),
                ServiceMode::Passive,
                move || ServiceInstance::Transport {
                    group: g.clone(),
                    channel: c.clone(),
                    lock_timeout,
                },
            )
            .depends_on(name(ServiceKind::Channel)),
        );

        let g = group.to_string();
        descriptors.push(ServiceDescriptor::new(
            name(ServiceKind::Site),
            origin(ServiceKind::Site),
            ServiceMode::Passive,
            move || ServiceInstance::Site { group: g.clone() },
        ));

        let jndi_name = format!("java:jboss/jgroups/channel/{group}");
        let bound = name(ServiceKind::Channel);
        descriptors.push(
            ServiceDescriptor::new(
                name(ServiceKind::ChannelBinding),
                origin(ServiceKind::ChannelBinding),
                ServiceMode::Active,
                move || ServiceInstance::Binding {
                    jndi_name: jndi_name.clone(),
                    target: bound.clone(),
                },
            )
            .depends_on(name(ServiceKind::Channel)),
        );

        let g = group.to_string();
        descriptors.push(
            ServiceDescriptor::new(
                name(ServiceKind::Channel),
                origin(ServiceKind::Channel),
                ServiceMode::Passive,
                move || ServiceInstance::Channel { group: g.clone() },
            )
            .depends_on(name(ServiceKind::ChannelFactory)),
        );

        let stack = ServiceName::protocol_stack(channel);
        let aliased = stack.clone();
        descriptors.push(
            ServiceDescriptor::new(
                name(ServiceKind::ChannelFactory),
                origin(ServiceKind::ChannelFactory),
                ServiceMode::Passive,
                move || ServiceInstance::Alias {
                    target: aliased.clone(),
                },
            )
            .depends_on(stack),
        );

        for provider in self.providers.list_providers() {
            for contribution in provider.contributions(group, channel) {
                let target = contribution.target.clone();
                descriptors.push(
                    ServiceDescriptor::new(
                        contribution.name,
                        ServiceOrigin::Provider(provider.name().to_string()),
                        ServiceMode::OnDemand,
                        move || ServiceInstance::Alias {
                            target: target.clone(),
                        },
                    )
                    .depends_on(contribution.target)
                    .depends_on(name(ServiceKind::Channel)),
                );
            }
        }
        descriptors
    }

    fn resolve_channel(&self, transport: &ModelNode) -> Result<String> {
        match transport.get(attribute::CHANNEL) {
            None => Ok(self.default_group.clone()),
            Some(Value::String(channel)) => Ok(channel.clone()),
            Some(other) => Err(invalid(transport, attribute::CHANNEL, other)),
        }
    }

    fn resolve_lock_timeout(&self, transport: &ModelNode) -> Result<i64> {
        let value = transport
            .get(attribute::LOCK_TIMEOUT)
            .or_else(|| self.schema.default_value(resource::TRANSPORT, attribute::LOCK_TIMEOUT))
            .ok_or_else(|| InstallerError::InvalidAttribute {
                address: transport.address().clone(),
                name: attribute::LOCK_TIMEOUT.to_string(),
                message: "undefined and without default".to_string(),
            })?;
        value
            .as_int()
            .ok_or_else(|| invalid(transport, attribute::LOCK_TIMEOUT, value))
    }
}

fn invalid(transport: &ModelNode, name: &str, value: &Value) -> InstallerError {
    InstallerError::InvalidAttribute {
        address: transport.address().clone(),
        name: name.to_string(),
        message: format!("unexpected {} value {value}", value.value_type()),
    }
}

/// Cache container owning the transport at `transport`
fn container_name(transport: &ModelNode) -> Result<String> {
    transport
        .address()
        .parent()
        .and_then(|parent| parent.last().map(|element| element.value().to_string()))
        .ok_or_else(|| InstallerError::InvalidAddress(transport.address().clone()))
}

/// Sort `descriptors` so that dependencies come first
///
/// Dependencies outside `descriptors` are external and impose no order.
/// Duplicate names keep the first descriptor.
fn order(descriptors: Vec<ServiceDescriptor>) -> Result<Vec<ServiceDescriptor>> {
    let unique = dedup(descriptors);
    let sorted = sort(&unique)?;
    let mut slots: Vec<Option<ServiceDescriptor>> = unique.into_iter().map(Some).collect();
    Ok(sorted
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

fn dedup(descriptors: Vec<ServiceDescriptor>) -> Vec<ServiceDescriptor> {
    let mut seen: HashSet<ServiceName> = HashSet::with_capacity(descriptors.len());
    let mut unique = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !seen.insert(descriptor.name().clone()) {
            tracing::warn!("service {} planned twice, keeping the first", descriptor.name());
            continue;
        }
        unique.push(descriptor);
    }
    unique
}

/// Indices of `unique` in dependency order
fn sort(unique: &[ServiceDescriptor]) -> Result<Vec<usize>> {
    let index: HashMap<&ServiceName, usize> = unique
        .iter()
        .enumerate()
        .map(|(i, descriptor)| (descriptor.name(), i))
        .collect();

    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for (i, descriptor) in unique.iter().enumerate() {
        graph.add_node(i);
        for dependency in descriptor.dependencies() {
            if let Some(&j) = index.get(dependency) {
                graph.add_edge(j, i, ());
            }
        }
    }

    toposort(&graph, None)
        .map_err(|cycle| InstallerError::Cycle(unique[cycle.node_id()].name().clone()))
}
