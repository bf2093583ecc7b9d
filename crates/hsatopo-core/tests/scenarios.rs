//! End-to-end enumeration over fixture topologies.

use hsatopo_core::{
    DeviceClass, EnumerationOptions, FixtureAgent, FixtureCache, FixtureLoader, FixtureRegion,
    FixtureTopology, PlatformError, PlatformLoader, RuntimeSession, SegmentKind, TopologyError,
    TopologyReport,
};

fn cpu_plus_gpu() -> FixtureTopology {
    FixtureTopology::new()
        .with_agent(FixtureAgent::cpu(0).with_name("AMD EPYC 7763"))
        .with_agent(
            FixtureAgent::gpu(1)
                .with_name("gfx90a")
                .with_compute(60, 4, 40)
                .with_region(FixtureRegion::vram(0))
                .with_region(FixtureRegion::vram(17_179_869_184))
                .with_cache(FixtureCache::new(2, 4_194_304)),
        )
}

fn run(
    topology: FixtureTopology,
    options: EnumerationOptions,
) -> Result<TopologyReport, TopologyError> {
    let session = RuntimeSession::open(&FixtureLoader::new(topology))?;
    let report = session.enumerator(options).enumerate()?;
    session.close()?;
    Ok(report)
}

#[test]
fn cpu_and_gpu_scenario() {
    let report = run(cpu_plus_gpu(), EnumerationOptions::default()).unwrap();
    assert_eq!(report.len(), 2);

    let cpu = &report.agents()[0];
    assert_eq!(cpu.device_class(), DeviceClass::Cpu);
    assert!(cpu.regions.is_empty());
    assert!(cpu.caches.is_empty());
    assert!(cpu.gpu().is_none());

    let gpu = &report.agents()[1];
    let compute = gpu.gpu().unwrap();
    assert_eq!(compute.compute_units, Some(60));
    assert_eq!(compute.total_simds, Some(240));
    assert_eq!(compute.waves_per_simd, Some(10));

    let globals: Vec<_> = gpu.global_regions().collect();
    assert_eq!(globals[0].global_index, Some(0));
    assert_eq!(globals[0].known_size(), None);
    assert_eq!(globals[1].global_index, Some(1));
    assert_eq!(globals[1].known_size(), Some(17_179_869_184));

    assert_eq!(gpu.caches[0].level, Some(2));
    assert_eq!(gpu.caches[0].size_bytes, Some(4_194_304));
}

#[test]
fn zero_agents_is_an_empty_report() {
    let report = run(FixtureTopology::new(), EnumerationOptions::default()).unwrap();
    assert!(report.is_empty());
}

#[test]
fn rerun_yields_same_shape() {
    let first = run(cpu_plus_gpu(), EnumerationOptions::default()).unwrap();
    let second = run(cpu_plus_gpu(), EnumerationOptions::default()).unwrap();
    assert_eq!(first.shape(), second.shape());
    assert_eq!(first, second);
}

#[test]
fn global_indices_restart_per_agent() {
    let topology = FixtureTopology::new()
        .with_agent(
            FixtureAgent::gpu(1)
                .with_region(FixtureRegion::vram(1 << 30))
                .with_region(FixtureRegion::new(SegmentKind::Group, 65536))
                .with_region(FixtureRegion::system(1 << 32)),
        )
        .with_agent(FixtureAgent::gpu(2).with_region(FixtureRegion::vram(1 << 30)));

    let report = run(topology, EnumerationOptions::default()).unwrap();
    for agent in &report {
        let indices: Vec<_> = agent.global_regions().filter_map(|r| r.global_index).collect();
        let expected: Vec<_> = (0..indices.len() as u32).collect();
        assert_eq!(indices, expected);
    }
    assert!(
        report.agents()[0]
            .regions
            .iter()
            .filter(|r| !r.is_global())
            .all(|r| r.global_index.is_none())
    );
}

#[test]
fn unclassifiable_agent_fails_fast_by_default() {
    let topology = cpu_plus_gpu().with_agent(FixtureAgent::default());

    let err = run(topology, EnumerationOptions::default()).unwrap_err();
    assert!(err.is_classification());
}

#[test]
fn keep_going_skips_unclassifiable_objects() {
    let broken_region = FixtureRegion {
        segment: None,
        size: Some(4096),
        host_accessible: None,
    };
    let topology = cpu_plus_gpu()
        .with_agent(FixtureAgent::default())
        .with_agent(
            FixtureAgent::gpu(3)
                .with_region(broken_region)
                .with_region(FixtureRegion::vram(1 << 30)),
        );

    let report = run(topology, EnumerationOptions::default().keep_going(true)).unwrap();
    assert_eq!(report.len(), 3);

    let last = &report.agents()[2];
    assert_eq!(last.regions.len(), 1);
    assert_eq!(last.regions[0].global_index, Some(0));
}

struct BrokenLoader;

impl PlatformLoader for BrokenLoader {
    type Runtime = hsatopo_core::FixturePlatform;

    fn initialize(&self) -> Result<Self::Runtime, PlatformError> {
        Err(PlatformError::Unavailable("no KFD".to_string()))
    }
}

#[test]
fn initialization_failure_stops_before_enumeration() {
    let Err(err) = RuntimeSession::open(&BrokenLoader) else {
        panic!("expected initialization failure");
    };
    assert!(matches!(err, TopologyError::Initialization { .. }));
    assert_eq!(err.to_string(), "runtime initialization failed: no KFD");
}

#[test]
fn system_summary_reports_version() {
    let session = RuntimeSession::open(&FixtureLoader::new(cpu_plus_gpu())).unwrap();
    let summary = session
        .enumerator(EnumerationOptions::default())
        .system_summary()
        .unwrap();
    assert_eq!(summary.version.to_string(), "1.1");
    assert_eq!(summary.node_count, Some(2));
}

#[test]
fn system_summary_keeps_wide_platform_oem() {
    let topology = FixtureTopology {
        platform_oem: Some(35_498_446_626_881),
        ..cpu_plus_gpu()
    };
    let session = RuntimeSession::open(&FixtureLoader::new(topology)).unwrap();
    let summary = session
        .enumerator(EnumerationOptions::default())
        .system_summary()
        .unwrap();
    assert_eq!(summary.platform_oem, Some(35_498_446_626_881));
    assert_eq!(summary.platform_id, None);
}

#[test]
fn missing_version_is_initialization_failure() {
    let topology = FixtureTopology {
        version_major: None,
        ..FixtureTopology::new()
    };
    let session = RuntimeSession::open(&FixtureLoader::new(topology)).unwrap();
    let err = session
        .enumerator(EnumerationOptions::default())
        .system_summary()
        .unwrap_err();
    assert!(matches!(err, TopologyError::Initialization { .. }));
}
