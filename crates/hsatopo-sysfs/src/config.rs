//! Filesystem locations and environment overrides used by the adapter.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

/// Default KFD topology directory.
pub const DEFAULT_TOPOLOGY_ROOT: &str = "/sys/devices/virtual/kfd/kfd/topology";

/// Default PCI device directory.
pub const DEFAULT_PCI_DEVICES_ROOT: &str = "/sys/bus/pci/devices";

pub const DEFAULT_CPUINFO_PATH: &str = "/proc/cpuinfo";

/// libdrm marketing-name tables, searched in order.
pub const DEFAULT_AMDGPU_IDS_PATHS: &[&str] = &[
    "/usr/share/libdrm/amdgpu.ids",
    "/usr/local/share/libdrm/amdgpu.ids",
];

/// Environment variable overriding the gfx version of every GPU node.
pub const GFX_OVERRIDE_VAR: &str = "HSA_OVERRIDE_GFX_VERSION";

/// `maj.min.step` overrides of the reported gfx target version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GfxOverrides {
    /// `HSA_OVERRIDE_GFX_VERSION`
    pub global: Option<String>,
    /// `HSA_OVERRIDE_GFX_VERSION_<node>`
    pub per_node: BTreeMap<u32, String>,
}

impl GfxOverrides {
    /// Collect overrides from `(name, value)` pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if key == GFX_OVERRIDE_VAR {
                overrides.global = Some(value.into());
            } else if let Some(node) = key
                .strip_prefix(GFX_OVERRIDE_VAR)
                .and_then(|rest| rest.strip_prefix('_'))
                .and_then(|node| node.parse().ok())
            {
                overrides.per_node.insert(node, value.into());
            }
        }
        overrides
    }

    /// Override for `node`; the per-node variable wins over the global one.
    pub fn for_node(&self, node: u32) -> Option<&str> {
        self.per_node
            .get(&node)
            .or(self.global.as_ref())
            .map(String::as_str)
    }
}

/// Where the adapter reads the topology from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsConfig {
    pub topology_root: PathBuf,
    pub pci_devices_root: PathBuf,
    pub cpuinfo_path: PathBuf,
    pub amdgpu_ids_paths: Vec<PathBuf>,
    pub gfx_overrides: GfxOverrides,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            topology_root: PathBuf::from(DEFAULT_TOPOLOGY_ROOT),
            pci_devices_root: PathBuf::from(DEFAULT_PCI_DEVICES_ROOT),
            cpuinfo_path: PathBuf::from(DEFAULT_CPUINFO_PATH),
            amdgpu_ids_paths: DEFAULT_AMDGPU_IDS_PATHS.iter().map(PathBuf::from).collect(),
            gfx_overrides: GfxOverrides::default(),
        }
    }
}

impl SysfsConfig {
    /// Default locations plus the gfx overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            gfx_overrides: GfxOverrides::from_vars(env::vars()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topology_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.topology_root = root.into();
        self
    }

    #[must_use]
    pub fn with_pci_devices_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.pci_devices_root = root.into();
        self
    }

    #[must_use]
    pub fn with_cpuinfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cpuinfo_path = path.into();
        self
    }

    #[must_use]
    pub fn with_amdgpu_ids_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.amdgpu_ids_paths = paths;
        self
    }

    #[must_use]
    pub fn with_gfx_overrides(mut self, overrides: GfxOverrides) -> Self {
        self.gfx_overrides = overrides;
        self
    }

    pub fn nodes_dir(&self) -> PathBuf {
        self.topology_root.join("nodes")
    }

    pub fn system_properties_path(&self) -> PathBuf {
        self.topology_root.join("system_properties")
    }

    pub fn generation_id_path(&self) -> PathBuf {
        self.topology_root.join("generation_id")
    }

    /// PCI `revision` file of the device at `domain` / KFD `location_id`.
    ///
    /// KFD packs the location as `bus << 8 | device << 3 | function`.
    pub fn pci_revision_path(&self, domain: u32, location_id: u32) -> PathBuf {
        let bus = (location_id >> 8) & 0xff;
        let device = (location_id >> 3) & 0x1f;
        let function = location_id & 0x7;
        self.pci_devices_root
            .join(format!("{domain:04x}:{bus:02x}:{device:02x}.{function:x}"))
            .join("revision")
    }
}
