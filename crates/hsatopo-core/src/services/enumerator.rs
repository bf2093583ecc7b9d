//! Agent enumerator: the outer traversal that builds the topology report.

use tracing::{debug, info, warn};

use crate::domain::{
    AgentDescriptor, AgentKind, DeviceClass, GpuCompute, InterfaceVersion, SystemSummary,
    TopologyReport, resolve_display_name,
};
use crate::error::{PlatformError, TopologyError};
use crate::ports::{AgentAttribute, AgentHandle, PlatformRuntime, SystemAttribute};

use super::accessor::{AttributeAccessor, unknown_on_error};
use super::visitor::{GlobalIndexCounter, visit_cache, visit_region};

/// What to do when an agent or region cannot be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassificationPolicy {
    /// Abort the whole run on the first failure.
    #[default]
    FailFast,
    /// Log the object and continue with its next sibling.
    SkipObject,
}

/// Knobs for one enumeration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationOptions {
    pub classification_policy: ClassificationPolicy,
}

impl EnumerationOptions {
    /// Switch between fail-fast and skip-and-continue.
    #[must_use]
    pub const fn keep_going(mut self, keep_going: bool) -> Self {
        self.classification_policy = if keep_going {
            ClassificationPolicy::SkipObject
        } else {
            ClassificationPolicy::FailFast
        };
        self
    }
}

/// Walks system → agents → {regions, caches} and folds the attribute
/// queries into a [`TopologyReport`].
pub struct TopologyEnumerator<'r, R: ?Sized> {
    runtime: &'r R,
    accessor: AttributeAccessor<'r, R>,
    options: EnumerationOptions,
}

impl<'r, R: PlatformRuntime + ?Sized> TopologyEnumerator<'r, R> {
    pub const fn new(runtime: &'r R, options: EnumerationOptions) -> Self {
        Self {
            runtime,
            accessor: AttributeAccessor::new(runtime),
            options,
        }
    }

    /// Query the interface version and the optional platform facts.
    ///
    /// A missing version is fatal; everything else degrades to `None`.
    pub fn system_summary(&self) -> Result<SystemSummary, TopologyError> {
        let version_part = |attribute: SystemAttribute| {
            self.accessor
                .system::<u16>(attribute)
                .map_err(|err| TopologyError::Initialization {
                    call: "system version query",
                    source: PlatformError::Unavailable(err.to_string()),
                })
        };

        let version = InterfaceVersion {
            major: version_part(SystemAttribute::VersionMajor)?,
            minor: version_part(SystemAttribute::VersionMinor)?,
        };

        let optional = |attribute: SystemAttribute| {
            unknown_on_error(self.accessor.system::<u32>(attribute), "system")
        };

        Ok(SystemSummary {
            version,
            generation_id: optional(SystemAttribute::GenerationId),
            platform_oem: unknown_on_error(
                self.accessor.system::<u64>(SystemAttribute::PlatformOem),
                "system",
            ),
            platform_id: optional(SystemAttribute::PlatformId),
            platform_revision: optional(SystemAttribute::PlatformRevision),
            node_count: optional(SystemAttribute::NodeCount),
        })
    }

    /// Enumerate every agent in runtime order.
    pub fn enumerate(&self) -> Result<TopologyReport, TopologyError> {
        let agents = self
            .runtime
            .agents()
            .map_err(|source| TopologyError::Traversal {
                call: "agent enumeration",
                source,
            })?;

        let mut descriptors = Vec::new();
        for agent in agents {
            match self.visit_agent(agent) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) if self.skips(&err) => {
                    warn!(%agent, error = %err, "skipping unclassifiable agent");
                }
                Err(err) => return Err(err),
            }
        }

        info!(agents = descriptors.len(), "topology enumeration complete");
        Ok(TopologyReport::from(descriptors))
    }

    fn skips(&self, err: &TopologyError) -> bool {
        self.options.classification_policy == ClassificationPolicy::SkipObject
            && err.is_classification()
    }

    fn visit_agent(&self, agent: AgentHandle) -> Result<AgentDescriptor, TopologyError> {
        let node_id = unknown_on_error(self.accessor.agent(agent, AgentAttribute::NodeId), agent);
        let name = resolve_display_name(
            unknown_on_error(self.accessor.agent(agent, AgentAttribute::ProductName), agent),
            unknown_on_error(self.accessor.agent(agent, AgentAttribute::Name), agent),
        );

        let class: DeviceClass = self
            .accessor
            .agent(agent, AgentAttribute::Device)
            .map_err(|source| TopologyError::Classification {
                object: agent.to_string(),
                source,
            })?;

        let kind = match class {
            DeviceClass::Gpu => AgentKind::Gpu(self.gpu_compute(agent)),
            DeviceClass::Cpu => AgentKind::Cpu {
                cores: unknown_on_error(
                    self.accessor.agent(agent, AgentAttribute::ComputeUnitCount),
                    agent,
                ),
            },
            DeviceClass::Other => AgentKind::Other,
        };

        debug!(%agent, ?node_id, %name, %class, "visiting agent");

        let regions = self
            .runtime
            .regions(agent)
            .map_err(|source| TopologyError::Traversal {
                call: "region enumeration",
                source,
            })?;

        let mut counter = GlobalIndexCounter::new();
        let mut region_descriptors = Vec::new();
        for region in regions {
            match visit_region(&self.accessor, region, &mut counter) {
                Ok(descriptor) => region_descriptors.push(descriptor),
                Err(err) if self.skips(&err) => {
                    warn!(%agent, %region, error = %err, "skipping unclassifiable region");
                }
                Err(err) => return Err(err),
            }
        }

        let caches = self
            .runtime
            .caches(agent)
            .map_err(|source| TopologyError::Traversal {
                call: "cache enumeration",
                source,
            })?
            .map(|cache| visit_cache(&self.accessor, cache))
            .collect();

        Ok(AgentDescriptor {
            node_id,
            name,
            kind,
            regions: region_descriptors,
            caches,
        })
    }

    fn gpu_compute(&self, agent: AgentHandle) -> GpuCompute {
        let query =
            |attribute| unknown_on_error(self.accessor.agent::<u32>(agent, attribute), agent);

        GpuCompute::derive(
            query(AgentAttribute::ComputeUnitCount),
            query(AgentAttribute::SimdsPerCu),
            query(AgentAttribute::MaxWavesPerCu),
        )
        .with_ids(
            query(AgentAttribute::ChipId),
            query(AgentAttribute::BdfId),
            query(AgentAttribute::Domain),
        )
    }
}
