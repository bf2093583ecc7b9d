//! Region and cache visitors.

use tracing::debug;

use crate::domain::{CacheDescriptor, RegionDescriptor, SegmentKind};
use crate::error::TopologyError;
use crate::ports::{CacheAttribute, CacheHandle, PlatformRuntime, RegionAttribute, RegionHandle};

use super::accessor::{AttributeAccessor, unknown_on_error};

/// Display-index counter for Global regions, scoped to one agent.
#[derive(Debug, Default)]
pub struct GlobalIndexCounter {
    next: u32,
}

impl GlobalIndexCounter {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the current index and advance.
    pub const fn claim(&mut self) -> u32 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Number of indices handed out so far.
    pub const fn issued(&self) -> u32 {
        self.next
    }
}

/// Build the descriptor for one region.
///
/// The segment kind is classification-critical: if it is unavailable the
/// visit fails and the counter is left untouched. Global regions consume one
/// index from `counter`.
pub fn visit_region<R: PlatformRuntime + ?Sized>(
    accessor: &AttributeAccessor<'_, R>,
    region: RegionHandle,
    counter: &mut GlobalIndexCounter,
) -> Result<RegionDescriptor, TopologyError> {
    let segment: SegmentKind = accessor
        .region(region, RegionAttribute::Segment)
        .map_err(|source| TopologyError::Classification {
            object: region.to_string(),
            source,
        })?;

    let size_bytes = unknown_on_error(accessor.region(region, RegionAttribute::Size), region);
    let host_accessible =
        unknown_on_error(accessor.region(region, RegionAttribute::HostAccessible), region);

    let global_index = (segment == SegmentKind::Global).then(|| counter.claim());

    debug!(%region, %segment, ?size_bytes, ?global_index, "visited region");

    Ok(RegionDescriptor {
        segment,
        size_bytes,
        host_accessible,
        global_index,
    })
}

/// Build the descriptor for one cache. Never fails; a missing level, size or
/// associativity becomes `None`.
pub fn visit_cache<R: PlatformRuntime + ?Sized>(
    accessor: &AttributeAccessor<'_, R>,
    cache: CacheHandle,
) -> CacheDescriptor {
    let level = unknown_on_error(accessor.cache(cache, CacheAttribute::Level), cache);
    let size_bytes = unknown_on_error(accessor.cache(cache, CacheAttribute::Size), cache);
    let associativity =
        unknown_on_error(accessor.cache(cache, CacheAttribute::Associativity), cache);

    debug!(%cache, ?level, ?size_bytes, ?associativity, "visited cache");

    CacheDescriptor {
        level,
        size_bytes,
        associativity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        AttributeUnavailable, AttributeValue, MockPlatformRuntime, UnavailableReason,
    };

    fn region_runtime(segment: Option<SegmentKind>, size: Option<u64>) -> MockPlatformRuntime {
        let mut runtime = MockPlatformRuntime::new();
        runtime
            .expect_region_info()
            .returning(move |_, attribute| match attribute {
                RegionAttribute::Segment => segment.map(AttributeValue::Segment).ok_or(
                    AttributeUnavailable::new(attribute.as_str(), UnavailableReason::NotReported),
                ),
                RegionAttribute::Size => size.map(AttributeValue::U64).ok_or(
                    AttributeUnavailable::new(attribute.as_str(), UnavailableReason::NotReported),
                ),
                RegionAttribute::HostAccessible => Ok(AttributeValue::Bool(false)),
            });
        runtime
    }

    #[test]
    fn test_counter_starts_at_zero() {
        let mut counter = GlobalIndexCounter::new();
        assert_eq!(counter.claim(), 0);
        assert_eq!(counter.claim(), 1);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_global_region_consumes_index() {
        let runtime = region_runtime(Some(SegmentKind::Global), Some(1 << 30));
        let accessor = AttributeAccessor::new(&runtime);
        let mut counter = GlobalIndexCounter::new();

        let first = visit_region(&accessor, RegionHandle(0), &mut counter).unwrap();
        let second = visit_region(&accessor, RegionHandle(1), &mut counter).unwrap();

        assert_eq!(first.global_index, Some(0));
        assert_eq!(second.global_index, Some(1));
        assert_eq!(first.host_accessible, Some(false));
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_non_global_region_has_no_index() {
        let runtime = region_runtime(Some(SegmentKind::Group), Some(64 * 1024));
        let accessor = AttributeAccessor::new(&runtime);
        let mut counter = GlobalIndexCounter::new();

        let region = visit_region(&accessor, RegionHandle(0), &mut counter).unwrap();
        assert_eq!(region.global_index, None);
        assert_eq!(counter.issued(), 0);
    }

    #[test]
    fn test_missing_size_degrades() {
        let runtime = region_runtime(Some(SegmentKind::Global), None);
        let accessor = AttributeAccessor::new(&runtime);
        let mut counter = GlobalIndexCounter::new();

        let region = visit_region(&accessor, RegionHandle(0), &mut counter).unwrap();
        assert_eq!(region.size_bytes, None);
        assert_eq!(region.global_index, Some(0));
    }

    #[test]
    fn test_missing_segment_is_classification_failure() {
        let runtime = region_runtime(None, Some(4096));
        let accessor = AttributeAccessor::new(&runtime);
        let mut counter = GlobalIndexCounter::new();

        let err = visit_region(&accessor, RegionHandle(7), &mut counter).unwrap_err();
        assert!(err.is_classification());
        assert_eq!(counter.issued(), 0);
    }

    #[test]
    fn test_cache_zero_size_is_recorded_verbatim() {
        let mut runtime = MockPlatformRuntime::new();
        runtime
            .expect_cache_info()
            .returning(|_, attribute| match attribute {
                CacheAttribute::Level => Ok(AttributeValue::U8(2)),
                CacheAttribute::Size => Ok(AttributeValue::U32(0)),
                CacheAttribute::Associativity => Ok(AttributeValue::U32(16)),
            });
        let accessor = AttributeAccessor::new(&runtime);

        let cache = visit_cache(&accessor, CacheHandle(0));
        assert_eq!(cache.level, Some(2));
        assert_eq!(cache.size_bytes, Some(0));
        assert_eq!(cache.associativity, Some(16));
        assert!(cache.reported_zero());
    }

    #[test]
    fn test_cache_unreported_size_is_none() {
        let mut runtime = MockPlatformRuntime::new();
        runtime
            .expect_cache_info()
            .returning(|_, attribute| match attribute {
                CacheAttribute::Level => Ok(AttributeValue::U8(1)),
                CacheAttribute::Size | CacheAttribute::Associativity => Err(
                    AttributeUnavailable::new(attribute.as_str(), UnavailableReason::NotSupported),
                ),
            });
        let accessor = AttributeAccessor::new(&runtime);

        let cache = visit_cache(&accessor, CacheHandle(0));
        assert_eq!(cache.size_bytes, None);
        assert_eq!(cache.associativity, None);
        assert!(!cache.reported_zero());
    }
}
