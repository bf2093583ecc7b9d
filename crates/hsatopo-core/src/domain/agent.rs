//! Agent descriptors: one per compute-capable unit reported by the platform.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cache::CacheDescriptor;
use super::region::RegionDescriptor;

/// Device class of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Cpu,
    Gpu,
    /// Anything else the platform reports (DSPs, accelerators).
    Other,
}

impl DeviceClass {
    /// Label used in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute block reported for GPU agents only.
///
/// Every field is `None` when the platform could not supply it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuCompute {
    pub compute_units: Option<u32>,
    /// `compute_units × simds_per_cu`, computed in 64 bits.
    pub total_simds: Option<u64>,
    pub waves_per_simd: Option<u32>,
    pub chip_id: Option<u32>,
    /// PCI bus/device/function packed as the platform reports it.
    pub location_id: Option<u32>,
    pub domain: Option<u32>,
}

impl GpuCompute {
    /// Derive the SIMD and wave figures from the raw per-CU values.
    ///
    /// `waves_per_simd` is `0` whenever `simds_per_cu` is `0`.
    pub fn derive(
        compute_units: Option<u32>,
        simds_per_cu: Option<u32>,
        max_waves_per_cu: Option<u32>,
    ) -> Self {
        let total_simds = match (compute_units, simds_per_cu) {
            (Some(cus), Some(simds)) => Some(u64::from(cus) * u64::from(simds)),
            _ => None,
        };

        let waves_per_simd = match (simds_per_cu, max_waves_per_cu) {
            (Some(0), _) => Some(0),
            (Some(simds), Some(waves)) => Some(waves / simds),
            _ => None,
        };

        Self {
            compute_units,
            total_simds,
            waves_per_simd,
            ..Self::default()
        }
    }

    /// Attach the chip, location and domain identifiers.
    #[must_use]
    pub const fn with_ids(
        mut self,
        chip_id: Option<u32>,
        location_id: Option<u32>,
        domain: Option<u32>,
    ) -> Self {
        self.chip_id = chip_id;
        self.location_id = location_id;
        self.domain = domain;
        self
    }
}

/// Class-specific payload of an agent.
///
/// The device class is derived from the variant, so the GPU compute block
/// exists exactly when the agent is a GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Cpu {
        /// Core count, when the platform reports one.
        cores: Option<u32>,
    },
    Gpu(GpuCompute),
    Other,
}

impl AgentKind {
    pub const fn device_class(&self) -> DeviceClass {
        match self {
            Self::Cpu { .. } => DeviceClass::Cpu,
            Self::Gpu(_) => DeviceClass::Gpu,
            Self::Other => DeviceClass::Other,
        }
    }
}

/// Everything the report knows about one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub node_id: Option<u32>,
    /// Resolved display name; empty when the platform supplied none.
    pub name: String,
    pub kind: AgentKind,
    /// Regions in platform discovery order.
    pub regions: Vec<RegionDescriptor>,
    /// Caches in platform discovery order.
    pub caches: Vec<CacheDescriptor>,
}

impl AgentDescriptor {
    pub const fn device_class(&self) -> DeviceClass {
        self.kind.device_class()
    }

    /// The GPU compute block, present only for GPU agents.
    pub const fn gpu(&self) -> Option<&GpuCompute> {
        match &self.kind {
            AgentKind::Gpu(compute) => Some(compute),
            _ => None,
        }
    }

    /// Regions carrying a display index (Global segment only).
    pub fn global_regions(&self) -> impl Iterator<Item = &RegionDescriptor> {
        self.regions.iter().filter(|r| r.global_index.is_some())
    }
}

/// Pick the display name for an agent.
///
/// The vendor product name wins when it is present and non-empty; otherwise
/// the generic name is used. Returns an empty string when neither exists.
pub fn resolve_display_name(product_name: Option<String>, generic_name: Option<String>) -> String {
    product_name
        .filter(|name| !name.trim().is_empty())
        .or(generic_name)
        .map(|name| name.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_reference_gpu() {
        let compute = GpuCompute::derive(Some(60), Some(4), Some(40));
        assert_eq!(compute.compute_units, Some(60));
        assert_eq!(compute.total_simds, Some(240));
        assert_eq!(compute.waves_per_simd, Some(10));
    }

    #[test]
    fn test_derive_zero_simds_guards_division() {
        let compute = GpuCompute::derive(Some(60), Some(0), Some(40));
        assert_eq!(compute.total_simds, Some(0));
        assert_eq!(compute.waves_per_simd, Some(0));

        // Guard holds even when the wave count is unknown
        let compute = GpuCompute::derive(Some(60), Some(0), None);
        assert_eq!(compute.waves_per_simd, Some(0));
    }

    #[test]
    fn test_derive_unknown_inputs_stay_unknown() {
        let compute = GpuCompute::derive(None, Some(4), None);
        assert_eq!(compute.total_simds, None);
        assert_eq!(compute.waves_per_simd, None);
    }

    #[test]
    fn test_derive_does_not_overflow_32_bits() {
        let compute = GpuCompute::derive(Some(u32::MAX), Some(4), Some(8));
        assert_eq!(compute.total_simds, Some(u64::from(u32::MAX) * 4));
        assert_eq!(compute.waves_per_simd, Some(2));
    }

    #[test]
    fn test_kind_maps_to_class() {
        assert_eq!(AgentKind::Cpu { cores: None }.device_class(), DeviceClass::Cpu);
        assert_eq!(AgentKind::Gpu(GpuCompute::default()).device_class(), DeviceClass::Gpu);
        assert_eq!(AgentKind::Other.device_class(), DeviceClass::Other);
    }

    #[test]
    fn test_display_name_prefers_product() {
        let name = resolve_display_name(Some("AMD Instinct MI210".into()), Some("gfx90a".into()));
        assert_eq!(name, "AMD Instinct MI210");
    }

    #[test]
    fn test_display_name_falls_back_to_generic() {
        assert_eq!(resolve_display_name(None, Some("gfx1100".into())), "gfx1100");
        assert_eq!(resolve_display_name(Some(String::new()), Some("gfx1100".into())), "gfx1100");
    }

    #[test]
    fn test_display_name_empty_when_nothing_reported() {
        assert_eq!(resolve_display_name(None, None), "");
    }
}
