//! Port definitions (trait abstractions) for the platform runtime.
//!
//! Ports define what the engine expects from a heterogeneous-system runtime.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - Handles are opaque `Copy` newtypes; only the runtime that produced them
//!   can interpret them
//! - Traversal primitives hand out pull-style iterators instead of callbacks
//! - Attribute queries return loosely typed values; typing happens in
//!   [`crate::services::AttributeAccessor`]

pub mod attribute;
pub mod platform;

pub use attribute::{
    AttributeResult, AttributeUnavailable, AttributeValue, FromAttribute, UnavailableReason,
};
pub use platform::{
    AgentAttribute, AgentHandle, CacheAttribute, CacheHandle, HandleIter, PlatformLoader,
    PlatformRuntime, RegionAttribute, RegionHandle, SystemAttribute,
};

#[cfg(test)]
pub use platform::MockPlatformRuntime;
