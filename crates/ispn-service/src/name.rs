//! Service names and the closed set of transport service kinds

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dot-separated service name, e.g. `jboss.infinispan.web.transport`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ServiceName(Vec<String>);

/// A service name with an empty segment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("empty segment in service name '{0}'")]
pub struct InvalidServiceName(pub String);

impl ServiceName {
    /// Name made of `segments`
    pub fn of<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Name with one more segment
    #[must_use]
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Segments, outermost first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Name without the last segment
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self(rest.to_vec())),
            _ => None,
        }
    }

    /// Check if `self` is `other` or one of its ancestors
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Protocol stack channel factory `jboss.jgroups.stack.<stack>`,
    /// installed outside this subsystem
    #[must_use]
    pub fn protocol_stack(stack: &str) -> Self {
        Self::of(["jboss", "jgroups", "stack", stack])
    }
}

impl Display for ServiceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for ServiceName {
    type Err = InvalidServiceName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.split('.').any(str::is_empty) {
            return Err(InvalidServiceName(s.to_string()));
        }
        Ok(Self::of(s.split('.')))
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for ServiceName {
    type Error = InvalidServiceName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Initial controller mode of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceMode {
    /// Started as soon as its dependencies are
    Active,
    /// Started when dependencies are up, but never demands them
    Passive,
    /// Started only when a dependent demands it
    OnDemand,
}

impl Display for ServiceMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Passive => "PASSIVE",
            Self::OnDemand => "ON_DEMAND",
        })
    }
}

/// Name family a service kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFamily {
    /// Components of the cache container
    Container,
    /// The channel and its companions
    Channel,
    /// Naming bindings
    Naming,
}

/// Every service the transport installs for a cache container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Cache container transport
    Transport,
    /// Cross-site configuration
    Site,
    /// JNDI binding of the channel
    ChannelBinding,
    /// Group communication channel
    Channel,
    /// Channel connector; the transport connects itself, so this is never
    /// installed, only removed
    ChannelConnector,
    /// Channel factory alias
    ChannelFactory,
}

impl ServiceKind {
    /// Every kind
    pub const ALL: [Self; 6] = [
        Self::Transport,
        Self::Site,
        Self::ChannelBinding,
        Self::Channel,
        Self::ChannelConnector,
        Self::ChannelFactory,
    ];

    /// Name family
    #[must_use]
    pub const fn family(self) -> ServiceFamily {
        match self {
            Self::Transport | Self::Site => ServiceFamily::Container,
            Self::ChannelBinding => ServiceFamily::Naming,
            Self::Channel | Self::ChannelConnector | Self::ChannelFactory => ServiceFamily::Channel,
        }
    }

    /// Service name of this kind for cache container `group`
    #[must_use]
    pub fn service_name(self, group: &str) -> ServiceName {
        match self {
            Self::Transport => ServiceName::of(["jboss", "infinispan", group, "transport"]),
            Self::Site => ServiceName::of(["jboss", "infinispan", group, "site"]),
            Self::ChannelBinding => ServiceName::of([
                "jboss", "naming", "context", "java", "jboss", "jgroups", "channel", group,
            ]),
            Self::Channel => ServiceName::of(["jboss", "jgroups", "channel", group]),
            Self::ChannelConnector => Self::Channel.service_name(group).append("connector"),
            Self::ChannelFactory => Self::Channel.service_name(group).append("factory"),
        }
    }
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transport => "transport",
            Self::Site => "site",
            Self::ChannelBinding => "channel-binding",
            Self::Channel => "channel",
            Self::ChannelConnector => "channel-connector",
            Self::ChannelFactory => "channel-factory",
        })
    }
}
