//! `/proc/cpuinfo` model names keyed by APIC id.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CpuModels {
    by_apic_id: HashMap<u32, String>,
}

impl CpuModels {
    /// Read and parse a cpuinfo file; an unreadable file yields no names.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cpuinfo unavailable");
                Self::default()
            }
        }
    }

    /// Parse processor blocks separated by blank lines.
    pub fn parse(content: &str) -> Self {
        let mut by_apic_id = HashMap::new();
        let mut apic_id = None;
        let mut model = None;

        for line in content.lines() {
            if line.trim().is_empty() {
                if let (Some(id), Some(name)) = (apic_id.take(), model.take()) {
                    by_apic_id.insert(id, name);
                }
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "apicid" | "initial apicid" => apic_id = value.trim().parse().ok(),
                "model name" => model = Some(value.trim().to_string()),
                _ => {}
            }
        }
        if let (Some(id), Some(name)) = (apic_id, model) {
            by_apic_id.insert(id, name);
        }

        Self { by_apic_id }
    }

    pub fn model_name(&self, apic_id: u32) -> Option<&str> {
        self.by_apic_id.get(&apic_id).map(String::as_str)
    }
}
