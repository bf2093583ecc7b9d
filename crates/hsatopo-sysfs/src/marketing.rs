//! GPU naming: libdrm `amdgpu.ids` product names and gfx target names.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Product names keyed by (device id, PCI revision).
#[derive(Debug, Clone, Default)]
pub struct MarketingNames {
    names: HashMap<(u32, u32), String>,
}

impl MarketingNames {
    /// Load every readable table; earlier paths win on duplicate keys.
    pub fn load(paths: &[PathBuf]) -> Self {
        let mut names = HashMap::new();
        for path in paths {
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            debug!(path = %path.display(), "loaded amdgpu.ids");
            for (key, name) in Self::parse(&content).names {
                names.entry(key).or_insert(name);
            }
        }
        Self { names }
    }

    /// Parse `DEVICE_ID,\tREVISION_ID,\tPRODUCT_NAME` lines (hex ids).
    ///
    /// Comment lines and the leading version line are skipped because they
    /// do not carry three fields.
    pub fn parse(content: &str) -> Self {
        let mut names = HashMap::new();
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, ',').map(str::trim);
            let (Some(device), Some(revision), Some(name)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            if let (Ok(device), Ok(revision)) =
                (u32::from_str_radix(device, 16), u32::from_str_radix(revision, 16))
            {
                names.entry((device, revision)).or_insert_with(|| name.to_string());
            }
        }
        Self { names }
    }

    pub fn lookup(&self, device_id: u32, revision: u32) -> Option<&str> {
        self.names.get(&(device_id, revision)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parse a PCI sysfs `revision` value such as `0xc1`.
pub fn parse_pci_revision(text: &str) -> Option<u32> {
    let text = text.trim();
    u32::from_str_radix(text.strip_prefix("0x").unwrap_or(text), 16).ok()
}

/// Read the PCI revision of a device; absent or malformed files give `None`.
pub fn read_pci_revision(path: &Path) -> Option<u32> {
    parse_pci_revision(&fs::read_to_string(path).ok()?)
}

/// Graphics IP version of a GPU node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxVersion {
    pub major: u32,
    pub minor: u32,
    pub stepping: u32,
}

impl GfxVersion {
    /// Decode KFD's decimal `gfx_target_version` (e.g. `90010`).
    pub const fn from_target_version(version: u32) -> Self {
        Self {
            major: (version / 10000) % 100,
            minor: (version / 100) % 100,
            stepping: version % 100,
        }
    }

    /// Parse a `maj.min.step` override; anything else is rejected.
    pub fn parse_override(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let version = Self {
            major: parts.next()?.parse().ok()?,
            minor: parts.next()?.parse().ok()?,
            stepping: parts.next()?.parse().ok()?,
        };
        parts.next().is_none().then_some(version)
    }
}

impl fmt::Display for GfxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gfx{}{:x}{:x}", self.major, self.minor, self.stepping)
    }
}
