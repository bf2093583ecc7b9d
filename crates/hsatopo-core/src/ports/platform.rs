//! Platform runtime port.
//!
//! A runtime exposes an initialize/shutdown lifecycle, a system attribute
//! query, pull-style traversal of agents and their regions and caches, and
//! typed-by-selector attribute queries on each object category.

use std::fmt;

use crate::error::PlatformError;

use super::attribute::AttributeResult;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            pub const KIND: &'static str = $label;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {:#x}"), self.0)
            }
        }
    };
}

handle!(
    /// Opaque agent handle.
    AgentHandle,
    "agent"
);
handle!(
    /// Opaque region handle.
    RegionHandle,
    "region"
);
handle!(
    /// Opaque cache handle.
    CacheHandle,
    "cache"
);

/// Lazy, finite, non-restartable sequence of handles in discovery order.
pub type HandleIter<H> = Box<dyn Iterator<Item = H>>;

macro_rules! selector {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

selector!(
    /// System-wide attributes.
    SystemAttribute {
        VersionMajor => "version_major",
        VersionMinor => "version_minor",
        GenerationId => "generation_id",
        PlatformOem => "platform_oem",
        PlatformId => "platform_id",
        PlatformRevision => "platform_revision",
        NodeCount => "node_count",
    }
);

selector!(
    /// Per-agent attributes.
    AgentAttribute {
        Name => "name",
        ProductName => "product_name",
        Device => "device",
        NodeId => "node_id",
        ComputeUnitCount => "compute_unit_count",
        SimdsPerCu => "simds_per_cu",
        MaxWavesPerCu => "max_waves_per_cu",
        ChipId => "chip_id",
        BdfId => "bdf_id",
        Domain => "domain",
    }
);

selector!(
    /// Per-region attributes.
    RegionAttribute {
        Segment => "segment",
        Size => "size",
        HostAccessible => "host_accessible",
    }
);

selector!(
    /// Per-cache attributes.
    CacheAttribute {
        Level => "level",
        Size => "size",
        Associativity => "associativity",
    }
);

/// An initialized platform runtime.
///
/// Every method is only valid between a successful
/// [`PlatformLoader::initialize`] and [`PlatformRuntime::shut_down`].
/// Calls are synchronous and single-threaded.
#[cfg_attr(test, mockall::automock)]
pub trait PlatformRuntime {
    fn system_info(&self, attribute: SystemAttribute) -> AttributeResult;

    fn agents(&self) -> Result<HandleIter<AgentHandle>, PlatformError>;

    fn regions(&self, agent: AgentHandle) -> Result<HandleIter<RegionHandle>, PlatformError>;

    fn caches(&self, agent: AgentHandle) -> Result<HandleIter<CacheHandle>, PlatformError>;

    fn agent_info(&self, agent: AgentHandle, attribute: AgentAttribute) -> AttributeResult;

    fn region_info(&self, region: RegionHandle, attribute: RegionAttribute) -> AttributeResult;

    fn cache_info(&self, cache: CacheHandle, attribute: CacheAttribute) -> AttributeResult;

    /// Tear the runtime down. A second call fails with
    /// [`PlatformError::NotInitialized`].
    fn shut_down(&mut self) -> Result<(), PlatformError>;
}

/// Starts a platform runtime.
pub trait PlatformLoader {
    type Runtime: PlatformRuntime;

    fn initialize(&self) -> Result<Self::Runtime, PlatformError>;
}
