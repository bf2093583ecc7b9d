//! In-memory platform runtime.
//!
//! A [`FixtureTopology`] describes a topology either in code (builder
//! methods) or as JSON, so a captured system can be replayed without the
//! hardware. Every field is optional: an absent field is an attribute the
//! platform does not report, and an absent `device` or `segment` makes the
//! object unclassifiable.

use serde::{Deserialize, Serialize};

use crate::domain::{DeviceClass, SegmentKind};
use crate::error::PlatformError;
use crate::ports::{
    AgentAttribute, AgentHandle, AttributeResult, AttributeUnavailable, AttributeValue,
    CacheAttribute, CacheHandle, HandleIter, PlatformLoader, PlatformRuntime, RegionAttribute,
    RegionHandle, SystemAttribute, UnavailableReason,
};

/// A complete topology description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureTopology {
    pub version_major: Option<u16>,
    pub version_minor: Option<u16>,
    pub generation_id: Option<u32>,
    pub platform_oem: Option<u64>,
    pub platform_id: Option<u32>,
    pub platform_revision: Option<u32>,
    pub agents: Vec<FixtureAgent>,
}

impl Default for FixtureTopology {
    fn default() -> Self {
        Self {
            version_major: Some(1),
            version_minor: Some(1),
            generation_id: None,
            platform_oem: None,
            platform_id: None,
            platform_revision: None,
            agents: Vec::new(),
        }
    }
}

impl FixtureTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON topology description.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_agent(mut self, agent: FixtureAgent) -> Self {
        self.agents.push(agent);
        self
    }
}

/// One agent of a fixture topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureAgent {
    pub node_id: Option<u32>,
    pub name: Option<String>,
    pub product_name: Option<String>,
    pub device: Option<DeviceClass>,
    pub compute_units: Option<u32>,
    pub simds_per_cu: Option<u32>,
    pub max_waves_per_cu: Option<u32>,
    pub chip_id: Option<u32>,
    pub location_id: Option<u32>,
    pub domain: Option<u32>,
    pub regions: Vec<FixtureRegion>,
    pub caches: Vec<FixtureCache>,
}

impl FixtureAgent {
    pub fn new(node_id: u32, device: DeviceClass) -> Self {
        Self {
            node_id: Some(node_id),
            device: Some(device),
            ..Self::default()
        }
    }

    pub fn cpu(node_id: u32) -> Self {
        Self::new(node_id, DeviceClass::Cpu)
    }

    pub fn gpu(node_id: u32) -> Self {
        Self::new(node_id, DeviceClass::Gpu)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Set the raw per-CU figures.
    #[must_use]
    pub const fn with_compute(
        mut self,
        compute_units: u32,
        simds_per_cu: u32,
        max_waves_per_cu: u32,
    ) -> Self {
        self.compute_units = Some(compute_units);
        self.simds_per_cu = Some(simds_per_cu);
        self.max_waves_per_cu = Some(max_waves_per_cu);
        self
    }

    #[must_use]
    pub const fn with_ids(mut self, chip_id: u32, location_id: u32, domain: u32) -> Self {
        self.chip_id = Some(chip_id);
        self.location_id = Some(location_id);
        self.domain = Some(domain);
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: FixtureRegion) -> Self {
        self.regions.push(region);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: FixtureCache) -> Self {
        self.caches.push(cache);
        self
    }
}

/// One region of a fixture agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureRegion {
    pub segment: Option<SegmentKind>,
    pub size: Option<u64>,
    pub host_accessible: Option<bool>,
}

impl FixtureRegion {
    pub const fn new(segment: SegmentKind, size: u64) -> Self {
        Self {
            segment: Some(segment),
            size: Some(size),
            host_accessible: None,
        }
    }

    /// Global device memory (not host accessible).
    pub const fn vram(size: u64) -> Self {
        Self::new(SegmentKind::Global, size).host_accessible(false)
    }

    /// Global host memory.
    pub const fn system(size: u64) -> Self {
        Self::new(SegmentKind::Global, size).host_accessible(true)
    }

    #[must_use]
    pub const fn host_accessible(mut self, accessible: bool) -> Self {
        self.host_accessible = Some(accessible);
        self
    }
}

/// One cache of a fixture agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureCache {
    pub level: Option<u8>,
    pub size: Option<u32>,
    pub associativity: Option<u32>,
}

impl FixtureCache {
    pub const fn new(level: u8, size: u32) -> Self {
        Self {
            level: Some(level),
            size: Some(size),
            associativity: None,
        }
    }

    #[must_use]
    pub const fn with_associativity(mut self, ways: u32) -> Self {
        self.associativity = Some(ways);
        self
    }
}

/// Starts [`FixturePlatform`] runtimes over a fixed topology.
#[derive(Debug, Clone, Default)]
pub struct FixtureLoader {
    topology: FixtureTopology,
}

impl FixtureLoader {
    pub const fn new(topology: FixtureTopology) -> Self {
        Self { topology }
    }
}

impl PlatformLoader for FixtureLoader {
    type Runtime = FixturePlatform;

    fn initialize(&self) -> Result<Self::Runtime, PlatformError> {
        Ok(FixturePlatform {
            topology: self.topology.clone(),
            initialized: true,
        })
    }
}

/// Runtime serving attribute queries from a [`FixtureTopology`].
///
/// Region and cache handles pack the agent index in the upper 32 bits and
/// the object index in the lower 32 bits.
#[derive(Debug, Clone)]
pub struct FixturePlatform {
    topology: FixtureTopology,
    initialized: bool,
}

const fn pack(agent: usize, index: usize) -> u64 {
    ((agent as u64) << 32) | (index as u64 & 0xffff_ffff)
}

#[allow(clippy::cast_possible_truncation)]
const fn unpack(handle: u64) -> (usize, usize) {
    ((handle >> 32) as usize, (handle & 0xffff_ffff) as usize)
}

fn reported<T>(
    value: Option<T>,
    attribute: &'static str,
    wrap: impl FnOnce(T) -> AttributeValue,
) -> AttributeResult {
    value
        .map(wrap)
        .ok_or(AttributeUnavailable::new(attribute, UnavailableReason::NotReported))
}

impl FixturePlatform {
    fn ensure_initialized(&self) -> Result<(), PlatformError> {
        if self.initialized {
            Ok(())
        } else {
            Err(PlatformError::NotInitialized)
        }
    }

    fn agent(&self, handle: AgentHandle) -> Result<&FixtureAgent, UnavailableReason> {
        if !self.initialized {
            return Err(UnavailableReason::NotInitialized);
        }
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.topology.agents.get(index))
            .ok_or(UnavailableReason::InvalidHandle)
    }

    fn region(&self, handle: RegionHandle) -> Result<&FixtureRegion, UnavailableReason> {
        let (agent, index) = unpack(handle.0);
        self.agent(AgentHandle(agent as u64))?
            .regions
            .get(index)
            .ok_or(UnavailableReason::InvalidHandle)
    }

    fn cache(&self, handle: CacheHandle) -> Result<&FixtureCache, UnavailableReason> {
        let (agent, index) = unpack(handle.0);
        self.agent(AgentHandle(agent as u64))?
            .caches
            .get(index)
            .ok_or(UnavailableReason::InvalidHandle)
    }

    fn agent_index(&self, handle: AgentHandle) -> Result<usize, PlatformError> {
        self.ensure_initialized()?;
        usize::try_from(handle.0)
            .ok()
            .filter(|&index| index < self.topology.agents.len())
            .ok_or(PlatformError::InvalidHandle {
                kind: AgentHandle::KIND,
                handle: handle.0,
            })
    }
}

impl PlatformRuntime for FixturePlatform {
    fn system_info(&self, attribute: SystemAttribute) -> AttributeResult {
        if !self.initialized {
            return Err(AttributeUnavailable::new(
                attribute.as_str(),
                UnavailableReason::NotInitialized,
            ));
        }

        let name = attribute.as_str();
        let topology = &self.topology;
        match attribute {
            SystemAttribute::VersionMajor => {
                reported(topology.version_major, name, AttributeValue::U16)
            }
            SystemAttribute::VersionMinor => {
                reported(topology.version_minor, name, AttributeValue::U16)
            }
            SystemAttribute::GenerationId => {
                reported(topology.generation_id, name, AttributeValue::U32)
            }
            SystemAttribute::PlatformOem => {
                reported(topology.platform_oem, name, AttributeValue::U64)
            }
            SystemAttribute::PlatformId => {
                reported(topology.platform_id, name, AttributeValue::U32)
            }
            SystemAttribute::PlatformRevision => {
                reported(topology.platform_revision, name, AttributeValue::U32)
            }
            SystemAttribute::NodeCount => {
                let nodes = u32::try_from(topology.agents.len()).ok();
                reported(nodes, name, AttributeValue::U32)
            }
        }
    }

    fn agents(&self) -> Result<HandleIter<AgentHandle>, PlatformError> {
        self.ensure_initialized()?;
        let count = self.topology.agents.len() as u64;
        Ok(Box::new((0..count).map(AgentHandle)))
    }

    fn regions(&self, agent: AgentHandle) -> Result<HandleIter<RegionHandle>, PlatformError> {
        let index = self.agent_index(agent)?;
        let count = self.topology.agents[index].regions.len();
        Ok(Box::new((0..count).map(move |i| RegionHandle(pack(index, i)))))
    }

    fn caches(&self, agent: AgentHandle) -> Result<HandleIter<CacheHandle>, PlatformError> {
        let index = self.agent_index(agent)?;
        let count = self.topology.agents[index].caches.len();
        Ok(Box::new((0..count).map(move |i| CacheHandle(pack(index, i)))))
    }

    fn agent_info(&self, agent: AgentHandle, attribute: AgentAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let agent = self
            .agent(agent)
            .map_err(|reason| AttributeUnavailable::new(name, reason))?;

        match attribute {
            AgentAttribute::Name => reported(agent.name.clone(), name, AttributeValue::Text),
            AgentAttribute::ProductName => {
                reported(agent.product_name.clone(), name, AttributeValue::Text)
            }
            AgentAttribute::Device => reported(agent.device, name, AttributeValue::Device),
            AgentAttribute::NodeId => reported(agent.node_id, name, AttributeValue::U32),
            AgentAttribute::ComputeUnitCount => {
                reported(agent.compute_units, name, AttributeValue::U32)
            }
            AgentAttribute::SimdsPerCu => reported(agent.simds_per_cu, name, AttributeValue::U32),
            AgentAttribute::MaxWavesPerCu => {
                reported(agent.max_waves_per_cu, name, AttributeValue::U32)
            }
            AgentAttribute::ChipId => reported(agent.chip_id, name, AttributeValue::U32),
            AgentAttribute::BdfId => reported(agent.location_id, name, AttributeValue::U32),
            AgentAttribute::Domain => reported(agent.domain, name, AttributeValue::U32),
        }
    }

    fn region_info(&self, region: RegionHandle, attribute: RegionAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let region = self
            .region(region)
            .map_err(|reason| AttributeUnavailable::new(name, reason))?;

        match attribute {
            RegionAttribute::Segment => reported(region.segment, name, AttributeValue::Segment),
            RegionAttribute::Size => reported(region.size, name, AttributeValue::U64),
            RegionAttribute::HostAccessible => {
                reported(region.host_accessible, name, AttributeValue::Bool)
            }
        }
    }

    fn cache_info(&self, cache: CacheHandle, attribute: CacheAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let cache = self
            .cache(cache)
            .map_err(|reason| AttributeUnavailable::new(name, reason))?;

        match attribute {
            CacheAttribute::Level => reported(cache.level, name, AttributeValue::U8),
            CacheAttribute::Size => reported(cache.size, name, AttributeValue::U32),
            CacheAttribute::Associativity => {
                reported(cache.associativity, name, AttributeValue::U32)
            }
        }
    }

    fn shut_down(&mut self) -> Result<(), PlatformError> {
        self.ensure_initialized()?;
        self.initialized = false;
        Ok(())
    }
}
