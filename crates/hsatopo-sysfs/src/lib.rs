//! Linux KFD adapter for the hsatopo platform port.
//!
//! The topology is read once from sysfs when the runtime is initialized
//! (`/sys/devices/virtual/kfd/kfd/topology`), enriched with CPU model names
//! from `/proc/cpuinfo` and GPU product names from libdrm's `amdgpu.ids`, and
//! then served from memory.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod cpuinfo;
pub mod marketing;
pub mod platform;
pub mod properties;
pub mod snapshot;

pub use config::{GfxOverrides, SysfsConfig};
pub use platform::{SysfsLoader, SysfsPlatform};
pub use snapshot::TopologySnapshot;
