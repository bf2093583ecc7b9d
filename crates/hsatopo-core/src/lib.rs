//! Core of hsatopo: the topology report model, the platform port and the
//! enumeration engine that walks system → agents → {regions, caches}.
//!
//! Adapters (e.g. `hsatopo-sysfs`) implement [`ports::PlatformLoader`] and
//! [`ports::PlatformRuntime`]; the CLI drives them through a
//! [`services::RuntimeSession`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod fixture;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AgentDescriptor, AgentKind, CacheDescriptor, DeviceClass, GpuCompute, InterfaceVersion,
    RegionDescriptor, SegmentKind, SystemSummary, TopologyReport, resolve_display_name,
};
pub use error::{PlatformError, TopologyError};
pub use fixture::{
    FixtureAgent, FixtureCache, FixtureLoader, FixturePlatform, FixtureRegion, FixtureTopology,
};
pub use ports::{
    AgentAttribute, AgentHandle, AttributeResult, AttributeUnavailable, AttributeValue,
    CacheAttribute, CacheHandle, FromAttribute, HandleIter, PlatformLoader, PlatformRuntime,
    RegionAttribute, RegionHandle, SystemAttribute, UnavailableReason,
};
pub use services::{
    AttributeAccessor, ClassificationPolicy, EnumerationOptions, GlobalIndexCounter,
    RuntimeSession, TopologyEnumerator,
};
