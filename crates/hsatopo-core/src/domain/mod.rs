//! Topology report domain types.
//!
//! These are pure value types: they are assembled by the enumerator and
//! never mutated once the owning traversal step has completed.

mod agent;
mod cache;
mod region;
mod report;

pub use agent::{AgentDescriptor, AgentKind, DeviceClass, GpuCompute, resolve_display_name};
pub use cache::CacheDescriptor;
pub use region::{RegionDescriptor, SegmentKind};
pub use report::{InterfaceVersion, SystemSummary, TopologyReport};
