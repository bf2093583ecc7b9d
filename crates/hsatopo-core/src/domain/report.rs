//! The aggregate topology report and the system-level summary.

use std::fmt;

use super::agent::{AgentDescriptor, DeviceClass};

/// Runtime interface version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InterfaceVersion {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// System-wide facts queried before agent enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSummary {
    pub version: InterfaceVersion,
    pub generation_id: Option<u32>,
    pub platform_oem: Option<u64>,
    pub platform_id: Option<u32>,
    pub platform_revision: Option<u32>,
    pub node_count: Option<u32>,
}

impl SystemSummary {
    pub const fn new(version: InterfaceVersion) -> Self {
        Self {
            version,
            generation_id: None,
            platform_oem: None,
            platform_id: None,
            platform_revision: None,
            node_count: None,
        }
    }
}

/// Ordered sequence of agent descriptors, in platform discovery order.
///
/// Read-only once built: no accessor hands out mutable access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyReport {
    agents: Vec<AgentDescriptor>,
}

impl TopologyReport {
    pub fn agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentDescriptor> {
        self.agents.iter()
    }

    /// Per-agent (class, region count, cache count) triples.
    ///
    /// Two enumerations of an unchanged topology yield equal shapes.
    pub fn shape(&self) -> Vec<(DeviceClass, usize, usize)> {
        self.agents
            .iter()
            .map(|agent| (agent.device_class(), agent.regions.len(), agent.caches.len()))
            .collect()
    }

    /// Number of agents of the given class.
    pub fn count_of(&self, class: DeviceClass) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.device_class() == class)
            .count()
    }
}

impl From<Vec<AgentDescriptor>> for TopologyReport {
    fn from(agents: Vec<AgentDescriptor>) -> Self {
        Self { agents }
    }
}

impl<'a> IntoIterator for &'a TopologyReport {
    type Item = &'a AgentDescriptor;
    type IntoIter = std::slice::Iter<'a, AgentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
