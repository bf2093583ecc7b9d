//! Cache descriptors.

/// One cache level owned by an agent.
///
/// `size_bytes` distinguishes three states: `None` (the query failed),
/// `Some(0)` (the platform reported zero, i.e. it does not know) and a real
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDescriptor {
    /// Level 1 is closest to compute.
    pub level: Option<u8>,
    pub size_bytes: Option<u32>,
    /// Ways of set associativity, as the platform reports it.
    pub associativity: Option<u32>,
}

impl CacheDescriptor {
    pub const fn reported_zero(&self) -> bool {
        matches!(self.size_bytes, Some(0))
    }
}
