//! One-shot read of the KFD topology tree into agent records.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use hsatopo_core::{DeviceClass, SegmentKind};
use tracing::{debug, info};

use crate::config::SysfsConfig;
use crate::cpuinfo::CpuModels;
use crate::marketing::{GfxVersion, MarketingNames, read_pci_revision};
use crate::properties::{Properties, numbered_entries, read_trimmed};

/// KFD memory heap types.
const HEAP_SYSTEM: u32 = 0;
const HEAP_FRAME_BUFFER_PUBLIC: u32 = 1;
const HEAP_FRAME_BUFFER_PRIVATE: u32 = 2;
const HEAP_GPU_LDS: u32 = 4;
const HEAP_GPU_SCRATCH: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemRecord {
    pub generation_id: Option<u32>,
    pub platform_oem: Option<u64>,
    pub platform_id: Option<u32>,
    pub platform_revision: Option<u32>,
    pub node_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRecord {
    pub segment: SegmentKind,
    pub size: Option<u64>,
    pub host_accessible: bool,
}

impl RegionRecord {
    /// Map a `mem_banks/<n>/properties` file to a region.
    fn from_bank(props: &Properties) -> Self {
        let (segment, host_accessible) = match props.get::<u32>("heap_type") {
            Some(HEAP_SYSTEM) => (SegmentKind::Global, true),
            Some(HEAP_FRAME_BUFFER_PUBLIC | HEAP_FRAME_BUFFER_PRIVATE) => {
                (SegmentKind::Global, false)
            }
            Some(HEAP_GPU_LDS) => (SegmentKind::Group, false),
            Some(HEAP_GPU_SCRATCH) => (SegmentKind::Private, false),
            _ => (SegmentKind::Unknown, false),
        };
        Self {
            segment,
            size: props.get("size_in_bytes"),
            host_accessible,
        }
    }

    const fn is_system_heap(&self) -> bool {
        matches!(self.segment, SegmentKind::Global) && self.host_accessible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub level: Option<u8>,
    pub size: Option<u32>,
    pub associativity: Option<u32>,
    processor_id_low: Option<u32>,
}

impl CacheRecord {
    /// `size` is reported in KiB.
    fn from_properties(props: &Properties) -> Self {
        Self {
            level: props.get("level"),
            size: props.get::<u32>("size").and_then(|kib| kib.checked_mul(1024)),
            associativity: props.get("association"),
            processor_id_low: props.get("processor_id_low"),
        }
    }
}

/// One agent derived from a KFD node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRecord {
    pub node_id: u32,
    /// `None` when the node's properties could not be read.
    pub class: Option<DeviceClass>,
    pub name: Option<String>,
    pub product_name: Option<String>,
    pub compute_units: Option<u32>,
    pub simds_per_cu: Option<u32>,
    pub max_waves_per_cu: Option<u32>,
    pub chip_id: Option<u32>,
    pub location_id: Option<u32>,
    pub domain: Option<u32>,
    pub regions: Vec<RegionRecord>,
    pub caches: Vec<CacheRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologySnapshot {
    pub system: SystemRecord,
    pub agents: Vec<AgentRecord>,
}

impl TopologySnapshot {
    /// Read the whole topology.
    ///
    /// Fails when the topology root is missing or `system_properties` cannot
    /// be read; problems inside individual nodes degrade to unknown values.
    pub fn load(config: &SysfsConfig) -> Result<Self> {
        let root = &config.topology_root;
        ensure!(root.is_dir(), "KFD topology not found at {}", root.display());

        let system_props = Properties::read(&config.system_properties_path())
            .context("Failed to read system properties")?;

        let reader = NodeReader {
            config,
            cpu_models: CpuModels::load(&config.cpuinfo_path),
            marketing: MarketingNames::load(&config.amdgpu_ids_paths),
        };

        let nodes = numbered_entries(&config.nodes_dir());
        let mut agents = Vec::new();
        for (node_id, path) in &nodes {
            agents.extend(reader.read_node(*node_id, path));
        }

        let system = SystemRecord {
            generation_id: read_trimmed(&config.generation_id_path())
                .and_then(|id| id.parse().ok()),
            platform_oem: system_props.get("platform_oem"),
            platform_id: system_props.get("platform_id"),
            platform_revision: system_props.get("platform_rev"),
            node_count: u32::try_from(nodes.len()).unwrap_or(u32::MAX),
        };

        info!(
            root = %root.display(),
            nodes = system.node_count,
            agents = agents.len(),
            "KFD topology snapshot loaded"
        );

        Ok(Self { system, agents })
    }
}

struct NodeReader<'a> {
    config: &'a SysfsConfig,
    cpu_models: CpuModels,
    marketing: MarketingNames,
}

impl NodeReader<'_> {
    /// Agents of one node: CPU first, then GPU (both on an APU).
    fn read_node(&self, node_id: u32, path: &Path) -> Vec<AgentRecord> {
        let props = match Properties::read(&path.join("properties")) {
            Ok(props) => props,
            Err(err) => {
                debug!(node_id, error = %format!("{err:#}"), "node properties unreadable");
                return vec![AgentRecord {
                    node_id,
                    ..AgentRecord::default()
                }];
            }
        };

        let cpu_cores = props.count("cpu_cores_count");
        let simd_count = props.count("simd_count");
        let regions = read_objects(&path.join("mem_banks"), RegionRecord::from_bank);
        let caches = read_objects(&path.join("caches"), CacheRecord::from_properties);

        let mut agents = Vec::with_capacity(2);
        match (cpu_cores > 0, simd_count > 0) {
            (true, true) => {
                let (system, device): (Vec<_>, Vec<_>) =
                    regions.into_iter().partition(RegionRecord::is_system_heap);
                let simd_id_base = props.count("simd_id_base");
                let (gpu_caches, cpu_caches): (Vec<_>, Vec<_>) = caches
                    .into_iter()
                    .partition(|cache| {
                        cache
                            .processor_id_low
                            .is_some_and(|low| low >= simd_id_base)
                    });
                agents.push(self.cpu_agent(node_id, path, &props, system, cpu_caches));
                agents.push(self.gpu_agent(node_id, &props, device, gpu_caches));
            }
            (true, false) => agents.push(self.cpu_agent(node_id, path, &props, regions, caches)),
            (false, true) => agents.push(self.gpu_agent(node_id, &props, regions, caches)),
            (false, false) => debug!(node_id, "node has neither CPU cores nor SIMDs"),
        }
        agents
    }

    fn cpu_agent(
        &self,
        node_id: u32,
        path: &Path,
        props: &Properties,
        regions: Vec<RegionRecord>,
        caches: Vec<CacheRecord>,
    ) -> AgentRecord {
        let product_name = props
            .get::<u32>("cpu_core_id_base")
            .and_then(|base| self.cpu_models.model_name(base))
            .map(str::to_string);

        AgentRecord {
            node_id,
            class: Some(DeviceClass::Cpu),
            name: read_trimmed(&path.join("name")),
            product_name,
            compute_units: props.get("cpu_cores_count"),
            regions,
            caches,
            ..AgentRecord::default()
        }
    }

    fn gpu_agent(
        &self,
        node_id: u32,
        props: &Properties,
        mut regions: Vec<RegionRecord>,
        caches: Vec<CacheRecord>,
    ) -> AgentRecord {
        let gfx = self
            .config
            .gfx_overrides
            .for_node(node_id)
            .and_then(GfxVersion::parse_override)
            .or_else(|| props.get("gfx_target_version").map(GfxVersion::from_target_version));

        let chip_id: Option<u32> = props.get("device_id");
        let location_id: Option<u32> = props.get("location_id");
        let domain: Option<u32> = props.get("domain");
        let product_name = match (chip_id, location_id) {
            (Some(chip), Some(location)) => {
                read_pci_revision(&self.config.pci_revision_path(domain.unwrap_or(0), location))
                    .and_then(|revision| self.marketing.lookup(chip, revision))
                    .map(str::to_string)
            }
            _ => None,
        };

        let simds_per_cu: Option<u32> = props.get("simd_per_cu");
        let compute_units = simds_per_cu
            .and_then(|per_cu| props.count("simd_count").checked_div(per_cu));
        let max_waves_per_cu = props
            .get::<u32>("max_waves_per_simd")
            .zip(simds_per_cu)
            .and_then(|(waves, simds)| waves.checked_mul(simds));

        if let Some(lds_kib) = props.get::<u64>("lds_size_in_kb") {
            regions.push(RegionRecord {
                segment: SegmentKind::Group,
                size: lds_kib.checked_mul(1024),
                host_accessible: false,
            });
        }

        debug!(node_id, gfx = ?gfx.map(|v| v.to_string()), ?product_name, "GPU node");

        AgentRecord {
            node_id,
            class: Some(DeviceClass::Gpu),
            name: gfx.map(|version| version.to_string()),
            product_name,
            compute_units,
            simds_per_cu,
            max_waves_per_cu,
            chip_id,
            location_id,
            domain,
            regions,
            caches,
        }
    }
}

/// Read the `properties` file of every numbered subdirectory of `dir`.
///
/// Unreadable objects are left out.
fn read_objects<T>(dir: &Path, map: impl Fn(&Properties) -> T) -> Vec<T> {
    numbered_entries(dir)
        .into_iter()
        .filter_map(|(index, path)| match Properties::read(&path.join("properties")) {
            Ok(props) => Some(map(&props)),
            Err(err) => {
                debug!(index, error = %format!("{err:#}"), "skipping unreadable topology object");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_bank_heap_types() {
        let bank = |heap: u32| {
            RegionRecord::from_bank(&Properties::parse(&format!(
                "heap_type {heap}\nsize_in_bytes 4096"
            )))
        };

        assert_eq!(bank(0).segment, SegmentKind::Global);
        assert!(bank(0).host_accessible);
        assert_eq!(bank(1).segment, SegmentKind::Global);
        assert!(!bank(2).host_accessible);
        assert_eq!(bank(4).segment, SegmentKind::Group);
        assert_eq!(bank(5).segment, SegmentKind::Private);
        assert_eq!(bank(3).segment, SegmentKind::Unknown);
        assert_eq!(bank(1).size, Some(4096));
    }

    #[test]
    fn test_cache_size_is_kib() {
        let cache = CacheRecord::from_properties(&Properties::parse(
            "level 2\nsize 8192\nassociation 16\nprocessor_id_low 16",
        ));
        assert_eq!(cache.level, Some(2));
        assert_eq!(cache.associativity, Some(16));
        assert_eq!(cache.size, Some(8 << 20));
        assert_eq!(cache.processor_id_low, Some(16));
    }

    #[test]
    fn test_missing_root_fails() {
        let config = SysfsConfig::default().with_topology_root("/nonexistent/kfd/topology");
        let err = TopologySnapshot::load(&config).unwrap_err();
        assert!(err.to_string().contains("KFD topology not found"));
    }

    #[test]
    fn test_missing_system_properties_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nodes")).unwrap();

        let config = SysfsConfig::default().with_topology_root(dir.path());
        let err = TopologySnapshot::load(&config).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read system properties");
    }
}
