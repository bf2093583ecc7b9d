//! [`PlatformRuntime`] over a KFD topology snapshot.

use hsatopo_core::{
    AgentAttribute, AgentHandle, AttributeResult, AttributeUnavailable, AttributeValue,
    CacheAttribute, CacheHandle, HandleIter, PlatformError, PlatformLoader, PlatformRuntime,
    RegionAttribute, RegionHandle, SystemAttribute, UnavailableReason,
};

use crate::config::SysfsConfig;
use crate::snapshot::{AgentRecord, CacheRecord, RegionRecord, TopologySnapshot};

/// HSA interface level the adapter implements.
const INTERFACE_VERSION: (u16, u16) = (1, 1);

/// Starts [`SysfsPlatform`] runtimes.
#[derive(Debug, Clone, Default)]
pub struct SysfsLoader {
    config: SysfsConfig,
}

impl SysfsLoader {
    pub const fn new(config: SysfsConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &SysfsConfig {
        &self.config
    }
}

impl PlatformLoader for SysfsLoader {
    type Runtime = SysfsPlatform;

    fn initialize(&self) -> Result<Self::Runtime, PlatformError> {
        let snapshot = TopologySnapshot::load(&self.config)
            .map_err(|err| PlatformError::Unavailable(format!("{err:#}")))?;
        Ok(SysfsPlatform::new(snapshot))
    }
}

/// Runtime serving attribute queries from a [`TopologySnapshot`].
///
/// Agent handles are indices into the snapshot. Region and cache handles
/// carry the agent index in the upper 32 bits.
#[derive(Debug, Clone)]
pub struct SysfsPlatform {
    snapshot: TopologySnapshot,
    initialized: bool,
}

fn object_handle(agent: usize, index: usize) -> u64 {
    ((agent as u64) << 32) | (index as u64 & 0xffff_ffff)
}

#[allow(clippy::cast_possible_truncation)]
const fn split_handle(handle: u64) -> (usize, usize) {
    ((handle >> 32) as usize, (handle & 0xffff_ffff) as usize)
}

fn value_or_not_reported<T>(
    value: Option<T>,
    attribute: &'static str,
    wrap: impl FnOnce(T) -> AttributeValue,
) -> AttributeResult {
    value
        .map(wrap)
        .ok_or(AttributeUnavailable::new(attribute, UnavailableReason::NotReported))
}

impl SysfsPlatform {
    pub const fn new(snapshot: TopologySnapshot) -> Self {
        Self {
            snapshot,
            initialized: true,
        }
    }

    pub const fn snapshot(&self) -> &TopologySnapshot {
        &self.snapshot
    }

    fn agent_record(&self, handle: AgentHandle) -> Result<(usize, &AgentRecord), PlatformError> {
        if !self.initialized {
            return Err(PlatformError::NotInitialized);
        }
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| Some((index, self.snapshot.agents.get(index)?)))
            .ok_or(PlatformError::InvalidHandle {
                kind: AgentHandle::KIND,
                handle: handle.0,
            })
    }

    fn region_record(&self, handle: RegionHandle) -> Result<&RegionRecord, UnavailableReason> {
        let (agent, index) = split_handle(handle.0);
        self.agent_record(AgentHandle(agent as u64))
            .map_err(unavailable_reason)?
            .1
            .regions
            .get(index)
            .ok_or(UnavailableReason::InvalidHandle)
    }

    fn cache_record(&self, handle: CacheHandle) -> Result<&CacheRecord, UnavailableReason> {
        let (agent, index) = split_handle(handle.0);
        self.agent_record(AgentHandle(agent as u64))
            .map_err(unavailable_reason)?
            .1
            .caches
            .get(index)
            .ok_or(UnavailableReason::InvalidHandle)
    }
}

fn unavailable_reason(err: PlatformError) -> UnavailableReason {
    match err {
        PlatformError::NotInitialized => UnavailableReason::NotInitialized,
        _ => UnavailableReason::InvalidHandle,
    }
}

impl PlatformRuntime for SysfsPlatform {
    fn system_info(&self, attribute: SystemAttribute) -> AttributeResult {
        let name = attribute.as_str();
        if !self.initialized {
            return Err(AttributeUnavailable::new(name, UnavailableReason::NotInitialized));
        }

        let system = &self.snapshot.system;
        match attribute {
            SystemAttribute::VersionMajor => Ok(AttributeValue::U16(INTERFACE_VERSION.0)),
            SystemAttribute::VersionMinor => Ok(AttributeValue::U16(INTERFACE_VERSION.1)),
            SystemAttribute::GenerationId => {
                value_or_not_reported(system.generation_id, name, AttributeValue::U32)
            }
            SystemAttribute::PlatformOem => {
                value_or_not_reported(system.platform_oem, name, AttributeValue::U64)
            }
            SystemAttribute::PlatformId => {
                value_or_not_reported(system.platform_id, name, AttributeValue::U32)
            }
            SystemAttribute::PlatformRevision => {
                value_or_not_reported(system.platform_revision, name, AttributeValue::U32)
            }
            SystemAttribute::NodeCount => Ok(AttributeValue::U32(system.node_count)),
        }
    }

    fn agents(&self) -> Result<HandleIter<AgentHandle>, PlatformError> {
        if !self.initialized {
            return Err(PlatformError::NotInitialized);
        }
        let count = self.snapshot.agents.len() as u64;
        Ok(Box::new((0..count).map(AgentHandle)))
    }

    fn regions(&self, agent: AgentHandle) -> Result<HandleIter<RegionHandle>, PlatformError> {
        let (index, record) = self.agent_record(agent)?;
        let count = record.regions.len();
        Ok(Box::new((0..count).map(move |i| RegionHandle(object_handle(index, i)))))
    }

    fn caches(&self, agent: AgentHandle) -> Result<HandleIter<CacheHandle>, PlatformError> {
        let (index, record) = self.agent_record(agent)?;
        let count = record.caches.len();
        Ok(Box::new((0..count).map(move |i| CacheHandle(object_handle(index, i)))))
    }

    fn agent_info(&self, agent: AgentHandle, attribute: AgentAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let (_, record) = self
            .agent_record(agent)
            .map_err(|err| AttributeUnavailable::new(name, unavailable_reason(err)))?;

        match attribute {
            AgentAttribute::Name => {
                value_or_not_reported(record.name.clone(), name, AttributeValue::Text)
            }
            AgentAttribute::ProductName => {
                value_or_not_reported(record.product_name.clone(), name, AttributeValue::Text)
            }
            AgentAttribute::Device => {
                value_or_not_reported(record.class, name, AttributeValue::Device)
            }
            AgentAttribute::NodeId => Ok(AttributeValue::U32(record.node_id)),
            AgentAttribute::ComputeUnitCount => {
                value_or_not_reported(record.compute_units, name, AttributeValue::U32)
            }
            AgentAttribute::SimdsPerCu => {
                value_or_not_reported(record.simds_per_cu, name, AttributeValue::U32)
            }
            AgentAttribute::MaxWavesPerCu => {
                value_or_not_reported(record.max_waves_per_cu, name, AttributeValue::U32)
            }
            AgentAttribute::ChipId => {
                value_or_not_reported(record.chip_id, name, AttributeValue::U32)
            }
            AgentAttribute::BdfId => {
                value_or_not_reported(record.location_id, name, AttributeValue::U32)
            }
            AgentAttribute::Domain => {
                value_or_not_reported(record.domain, name, AttributeValue::U32)
            }
        }
    }

    fn region_info(&self, region: RegionHandle, attribute: RegionAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let record = self
            .region_record(region)
            .map_err(|reason| AttributeUnavailable::new(name, reason))?;

        match attribute {
            RegionAttribute::Segment => Ok(AttributeValue::Segment(record.segment)),
            RegionAttribute::Size => value_or_not_reported(record.size, name, AttributeValue::U64),
            RegionAttribute::HostAccessible => Ok(AttributeValue::Bool(record.host_accessible)),
        }
    }

    fn cache_info(&self, cache: CacheHandle, attribute: CacheAttribute) -> AttributeResult {
        let name = attribute.as_str();
        let record = self
            .cache_record(cache)
            .map_err(|reason| AttributeUnavailable::new(name, reason))?;

        match attribute {
            CacheAttribute::Level => value_or_not_reported(record.level, name, AttributeValue::U8),
            CacheAttribute::Size => value_or_not_reported(record.size, name, AttributeValue::U32),
            CacheAttribute::Associativity => {
                value_or_not_reported(record.associativity, name, AttributeValue::U32)
            }
        }
    }

    fn shut_down(&mut self) -> Result<(), PlatformError> {
        if !self.initialized {
            return Err(PlatformError::NotInitialized);
        }
        self.initialized = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hsatopo_core::{DeviceClass, SegmentKind};

    use super::*;
    use crate::snapshot::SystemRecord;

    fn platform() -> SysfsPlatform {
        SysfsPlatform::new(TopologySnapshot {
            system: SystemRecord {
                generation_id: Some(3),
                node_count: 1,
                ..SystemRecord::default()
            },
            agents: vec![AgentRecord {
                node_id: 1,
                class: Some(DeviceClass::Gpu),
                regions: vec![RegionRecord {
                    segment: SegmentKind::Global,
                    size: Some(1 << 34),
                    host_accessible: false,
                }],
                ..AgentRecord::default()
            }],
        })
    }

    #[test]
    fn test_reports_interface_one_one() {
        let platform = platform();
        assert_eq!(
            platform.system_info(SystemAttribute::VersionMajor),
            Ok(AttributeValue::U16(1))
        );
        assert_eq!(
            platform.system_info(SystemAttribute::VersionMinor),
            Ok(AttributeValue::U16(1))
        );
        assert_eq!(
            platform.system_info(SystemAttribute::GenerationId),
            Ok(AttributeValue::U32(3))
        );
        assert!(platform.system_info(SystemAttribute::PlatformOem).is_err());
    }

    #[test]
    fn test_platform_oem_is_64_bit() {
        let platform = SysfsPlatform::new(TopologySnapshot {
            system: SystemRecord {
                platform_oem: Some(35_498_446_626_881),
                ..SystemRecord::default()
            },
            agents: Vec::new(),
        });
        assert_eq!(
            platform.system_info(SystemAttribute::PlatformOem),
            Ok(AttributeValue::U64(35_498_446_626_881))
        );
    }

    #[test]
    fn test_region_handles_resolve() {
        let platform = platform();
        let regions: Vec<_> = platform.regions(AgentHandle(0)).unwrap().collect();
        assert_eq!(regions.len(), 1);
        assert_eq!(
            platform.region_info(regions[0], RegionAttribute::Size),
            Ok(AttributeValue::U64(1 << 34))
        );
        assert!(platform.caches(AgentHandle(0)).unwrap().next().is_none());
    }

    #[test]
    fn test_invalid_handles() {
        let platform = platform();
        assert!(matches!(
            platform.regions(AgentHandle(9)),
            Err(PlatformError::InvalidHandle { kind: "agent", handle: 9 })
        ));
        let err = platform
            .region_info(RegionHandle(5), RegionAttribute::Segment)
            .unwrap_err();
        assert_eq!(err.reason, UnavailableReason::InvalidHandle);
    }

    #[test]
    fn test_queries_fail_after_shutdown() {
        let mut platform = platform();
        platform.shut_down().unwrap();

        let err = platform
            .agent_info(AgentHandle(0), AgentAttribute::Device)
            .unwrap_err();
        assert_eq!(err.reason, UnavailableReason::NotInitialized);
        assert_eq!(platform.shut_down(), Err(PlatformError::NotInitialized));
    }
}
