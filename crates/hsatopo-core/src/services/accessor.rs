//! Typed attribute access on top of the raw runtime queries.

use std::fmt;

use tracing::debug;

use crate::ports::{
    AgentAttribute, AgentHandle, AttributeResult, AttributeUnavailable, CacheAttribute,
    CacheHandle, FromAttribute, PlatformRuntime, RegionAttribute, RegionHandle, SystemAttribute,
    UnavailableReason,
};

/// Queries one attribute of one object and converts it to `T`.
///
/// Each call issues exactly one runtime query; nothing is retried or cached.
pub struct AttributeAccessor<'r, R: ?Sized> {
    runtime: &'r R,
}

impl<'r, R: PlatformRuntime + ?Sized> AttributeAccessor<'r, R> {
    pub const fn new(runtime: &'r R) -> Self {
        Self { runtime }
    }

    pub fn system<T: FromAttribute>(
        &self,
        attribute: SystemAttribute,
    ) -> Result<T, AttributeUnavailable> {
        typed(attribute.as_str(), self.runtime.system_info(attribute))
    }

    pub fn agent<T: FromAttribute>(
        &self,
        agent: AgentHandle,
        attribute: AgentAttribute,
    ) -> Result<T, AttributeUnavailable> {
        typed(attribute.as_str(), self.runtime.agent_info(agent, attribute))
    }

    pub fn region<T: FromAttribute>(
        &self,
        region: RegionHandle,
        attribute: RegionAttribute,
    ) -> Result<T, AttributeUnavailable> {
        typed(attribute.as_str(), self.runtime.region_info(region, attribute))
    }

    pub fn cache<T: FromAttribute>(
        &self,
        cache: CacheHandle,
        attribute: CacheAttribute,
    ) -> Result<T, AttributeUnavailable> {
        typed(attribute.as_str(), self.runtime.cache_info(cache, attribute))
    }
}

fn typed<T: FromAttribute>(
    attribute: &'static str,
    result: AttributeResult,
) -> Result<T, AttributeUnavailable> {
    let value = result?;
    let found = value.type_name();
    T::from_attribute(value).ok_or(AttributeUnavailable::new(
        attribute,
        UnavailableReason::TypeMismatch {
            expected: T::EXPECTED,
            found,
        },
    ))
}

/// Degrade a failed non-classification query to the "unknown" sentinel.
pub fn unknown_on_error<T>(
    result: Result<T, AttributeUnavailable>,
    object: impl fmt::Display,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(%object, error = %err, "attribute degraded to unknown");
            None
        }
    }
}
