//! Text rendering of the topology report.

use std::fmt::{Display, LowerHex};
use std::io::{self, Write};

use hsatopo_core::{
    AgentDescriptor, AgentKind, CacheDescriptor, GpuCompute, RegionDescriptor, SegmentKind,
    SystemSummary, TopologyReport,
};

const RULE_WIDTH: usize = 60;
const UNKNOWN: &str = "Unknown";

/// Region label as shown in the memory bank list.
pub const fn region_label(region: &RegionDescriptor) -> &'static str {
    match region.segment {
        SegmentKind::Global => match region.host_accessible {
            Some(true) => "System",
            Some(false) => "FrameBuffer (VRAM)",
            None => "Global",
        },
        SegmentKind::Group => "LDS (Group)",
        SegmentKind::Private => "Scratch (Private)",
        SegmentKind::ReadOnly => "Constant (ReadOnly)",
        SegmentKind::Unknown => UNKNOWN,
    }
}

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

fn hex_or_unknown(value: Option<u32>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{v:#x}"))
}

fn hex_or_placeholder(value: Option<impl LowerHex>) -> String {
    value.map_or_else(|| "?".to_string(), |v| format!("{v:#x}"))
}

/// Region line. Global regions carry their display index and print MB,
/// the others print KB. A zero or missing size prints "Unknown".
pub fn format_region(region: &RegionDescriptor) -> String {
    let label = region_label(region);
    match region.global_index {
        Some(index) => {
            let size = region
                .known_size()
                .map_or_else(|| UNKNOWN.to_string(), |bytes| format!("{} MB", bytes / 1024 / 1024));
            format!("      [{index}] {label:<20} Size: {size}")
        }
        None => {
            let size = region
                .known_size()
                .map_or_else(|| UNKNOWN.to_string(), |bytes| format!("{} KB", bytes / 1024));
            format!("          {label:<20} Size: {size}")
        }
    }
}

/// Cache line. A reported zero and an unreported size print differently.
pub fn format_cache(cache: &CacheDescriptor) -> String {
    let level = cache
        .level
        .map_or_else(|| "?".to_string(), |level| level.to_string());
    let size = match cache.size_bytes {
        Some(0) => "Unknown (Reported 0)".to_string(),
        Some(bytes) => format!("{} KB", bytes / 1024),
        None => UNKNOWN.to_string(),
    };
    match cache.associativity {
        Some(ways) => format!("      L{level} Size: {size}, Assoc: {ways}"),
        None => format!("      L{level} Size: {size}"),
    }
}

fn write_rule<W: Write>(out: &mut W, ch: char) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

fn write_gpu_block<W: Write>(out: &mut W, gpu: &GpuCompute) -> io::Result<()> {
    writeln!(out, "    Type:          GPU")?;
    writeln!(out, "    Compute Units: {}", or_unknown(gpu.compute_units))?;
    writeln!(out, "    SIMDs:         {}", or_unknown(gpu.total_simds))?;
    writeln!(out, "    Waves/SIMD:    {}", or_unknown(gpu.waves_per_simd))?;
    writeln!(out, "    Chip ID:       {}", hex_or_unknown(gpu.chip_id))?;
    writeln!(
        out,
        "    Location ID:   {} (Domain: {})",
        hex_or_unknown(gpu.location_id),
        gpu.domain.map_or_else(|| "?".to_string(), |d| d.to_string())
    )
}

/// Render one agent section.
pub fn write_agent<W: Write>(out: &mut W, agent: &AgentDescriptor) -> io::Result<()> {
    let node = agent
        .node_id
        .map_or_else(|| "?".to_string(), |id| id.to_string());
    let name = if agent.name.is_empty() {
        "Unknown Agent"
    } else {
        agent.name.as_str()
    };

    writeln!(out)?;
    write_rule(out, '-')?;
    writeln!(out, " Node {node} ({name})")?;
    write_rule(out, '-')?;

    match &agent.kind {
        AgentKind::Gpu(gpu) => write_gpu_block(out, gpu)?,
        AgentKind::Cpu { cores } => {
            writeln!(out, "    Type:          CPU")?;
            if let Some(cores) = cores {
                writeln!(out, "    Cores:         {cores}")?;
            }
        }
        AgentKind::Other => writeln!(out, "    Type:          Other")?,
    }

    writeln!(out)?;
    writeln!(out, "    Memory Banks:")?;
    for region in &agent.regions {
        writeln!(out, "{}", format_region(region))?;
    }

    writeln!(out)?;
    writeln!(out, "    Caches:")?;
    for cache in &agent.caches {
        writeln!(out, "{}", format_cache(cache))?;
    }
    Ok(())
}

fn write_header<W: Write>(out: &mut W, summary: &SystemSummary) -> io::Result<()> {
    write_rule(out, '=')?;
    writeln!(out, "{:^width$}", "HSA Topology - Diagnostics", width = RULE_WIDTH)?;
    write_rule(out, '=')?;
    writeln!(out, "[+] HSA Interface Version: {}", summary.version)?;

    if let Some(generation) = summary.generation_id {
        writeln!(out, "[+] Topology Generation:   {generation}")?;
    }
    if summary.platform_oem.is_some()
        || summary.platform_id.is_some()
        || summary.platform_revision.is_some()
    {
        writeln!(
            out,
            "[+] Platform:              OEM {}, ID {}, Rev {}",
            hex_or_placeholder(summary.platform_oem),
            hex_or_placeholder(summary.platform_id),
            hex_or_placeholder(summary.platform_revision)
        )?;
    }
    if let Some(nodes) = summary.node_count {
        writeln!(out, "[+] Topology Nodes:        {nodes}")?;
    }
    Ok(())
}

/// Render the whole report: header, one section per agent, footer.
pub fn write_report<W: Write>(
    out: &mut W,
    summary: &SystemSummary,
    report: &TopologyReport,
) -> io::Result<()> {
    write_header(out, summary)?;

    writeln!(out)?;
    writeln!(out, "[+] Scanning System Agents...")?;
    for agent in report {
        write_agent(out, agent)?;
    }

    writeln!(out)?;
    writeln!(out, "[+] Diagnostics Complete.")
}

#[cfg(test)]
mod tests {
    use hsatopo_core::{InterfaceVersion, resolve_display_name};

    use super::*;

    fn global(size: Option<u64>, index: u32, host_accessible: bool) -> RegionDescriptor {
        RegionDescriptor {
            segment: SegmentKind::Global,
            size_bytes: size,
            host_accessible: Some(host_accessible),
            global_index: Some(index),
        }
    }

    fn render_agent(agent: &AgentDescriptor) -> String {
        let mut out = Vec::new();
        write_agent(&mut out, agent).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_global_region_lines() {
        assert_eq!(
            format_region(&global(Some(17_179_869_184), 1, false)),
            "      [1] FrameBuffer (VRAM)   Size: 16384 MB"
        );
        assert_eq!(
            format_region(&global(Some(0), 0, false)),
            "      [0] FrameBuffer (VRAM)   Size: Unknown"
        );
        assert_eq!(
            format_region(&global(None, 2, true)),
            "      [2] System               Size: Unknown"
        );
    }

    #[test]
    fn test_non_global_region_lines() {
        let lds = RegionDescriptor {
            segment: SegmentKind::Group,
            size_bytes: Some(65536),
            host_accessible: Some(false),
            global_index: None,
        };
        assert_eq!(format_region(&lds), "          LDS (Group)          Size: 64 KB");

        let constant = RegionDescriptor {
            segment: SegmentKind::ReadOnly,
            size_bytes: Some(0),
            host_accessible: None,
            global_index: None,
        };
        assert_eq!(format_region(&constant), "          Constant (ReadOnly)  Size: Unknown");
    }

    #[test]
    fn test_cache_lines() {
        let cache = |level, size| CacheDescriptor {
            level,
            size_bytes: size,
            associativity: None,
        };
        assert_eq!(format_cache(&cache(Some(2), Some(4_194_304))), "      L2 Size: 4096 KB");
        assert_eq!(
            format_cache(&cache(Some(1), Some(0))),
            "      L1 Size: Unknown (Reported 0)"
        );
        assert_eq!(format_cache(&cache(Some(3), None)), "      L3 Size: Unknown");

        let associative = CacheDescriptor {
            associativity: Some(16),
            ..cache(Some(2), Some(8 << 20))
        };
        assert_eq!(format_cache(&associative), "      L2 Size: 8192 KB, Assoc: 16");
    }

    #[test]
    fn test_gpu_section() {
        let agent = AgentDescriptor {
            node_id: Some(1),
            name: "AMD Instinct MI210".to_string(),
            kind: AgentKind::Gpu(
                GpuCompute::derive(Some(104), Some(4), Some(32)).with_ids(
                    Some(0x740f),
                    Some(0x300),
                    Some(0),
                ),
            ),
            regions: vec![global(Some(65520 << 20), 0, false)],
            caches: vec![CacheDescriptor {
                level: Some(2),
                size_bytes: Some(8 << 20),
                associativity: None,
            }],
        };

        let expected = "
------------------------------------------------------------
 Node 1 (AMD Instinct MI210)
------------------------------------------------------------
    Type:          GPU
    Compute Units: 104
    SIMDs:         416
    Waves/SIMD:    8
    Chip ID:       0x740f
    Location ID:   0x300 (Domain: 0)

    Memory Banks:
      [0] FrameBuffer (VRAM)   Size: 65520 MB

    Caches:
      L2 Size: 8192 KB
";
        assert_eq!(render_agent(&agent), expected);
    }

    #[test]
    fn test_nameless_cpu_section() {
        let agent = AgentDescriptor {
            node_id: Some(0),
            name: resolve_display_name(None, None),
            kind: AgentKind::Cpu { cores: Some(16) },
            regions: Vec::new(),
            caches: Vec::new(),
        };

        let rendered = render_agent(&agent);
        assert!(rendered.contains(" Node 0 (Unknown Agent)\n"));
        assert!(rendered.contains("    Type:          CPU\n    Cores:         16\n"));
        assert!(!rendered.contains("Compute Units"));
    }

    #[test]
    fn test_report_frame() {
        let mut summary = SystemSummary::new(InterfaceVersion { major: 1, minor: 1 });
        summary.node_count = Some(0);

        let mut out = Vec::new();
        write_report(&mut out, &summary, &TopologyReport::default()).unwrap();
        let rendered = String::from_utf8(out).unwrap();

        assert!(rendered.contains("[+] HSA Interface Version: 1.1\n"));
        assert!(rendered.contains("[+] Topology Nodes:        0\n"));
        assert!(!rendered.contains("Platform"));
        assert!(rendered.ends_with("[+] Scanning System Agents...\n\n[+] Diagnostics Complete.\n"));
    }

    #[test]
    fn test_platform_line_with_wide_oem() {
        let mut summary = SystemSummary::new(InterfaceVersion { major: 1, minor: 1 });
        summary.platform_oem = Some(35_498_446_626_881);
        summary.platform_id = Some(1);

        let mut out = Vec::new();
        write_report(&mut out, &summary, &TopologyReport::default()).unwrap();
        let rendered = String::from_utf8(out).unwrap();

        assert!(
            rendered.contains("[+] Platform:              OEM 0x2049204d2041, ID 0x1, Rev ?\n")
        );
    }
}
