//! Memory region descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a region's memory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Global memory: VRAM or host system memory.
    Global,
    /// Group segment (LDS).
    Group,
    /// Private segment (scratch).
    Private,
    /// Read-only segment (constant memory).
    ReadOnly,
    /// Reported by the platform but not one of the known segments.
    Unknown,
}

impl SegmentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Group => "group",
            Self::Private => "private",
            Self::ReadOnly => "readonly",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One memory region owned by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub segment: SegmentKind,
    /// Size in bytes; `Some(0)` means the platform reported zero.
    pub size_bytes: Option<u64>,
    pub host_accessible: Option<bool>,
    /// Per-agent display index, assigned to Global regions only.
    pub global_index: Option<u32>,
}

impl RegionDescriptor {
    pub fn is_global(&self) -> bool {
        self.segment == SegmentKind::Global
    }

    /// Size when it is known and non-zero.
    pub fn known_size(&self) -> Option<u64> {
        self.size_bytes.filter(|&size| size > 0)
    }
}
