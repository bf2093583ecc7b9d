//! KFD `properties` files and numbered object directories.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

/// Parsed `key value` lines of a KFD properties file.
///
/// Values are kept as text and parsed on access, so a key whose value does
/// not fit the requested type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                Some((parts.next()?.to_string(), parts.next()?.to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        self.entries.get(key)?.parse().ok()
    }

    /// Numeric value, treating an absent key as zero.
    pub fn count(&self, key: &str) -> u32 {
        self.get(key).unwrap_or(0)
    }
}

/// Subdirectories of `dir` whose names are numbers, sorted numerically.
///
/// A missing directory has no entries.
pub fn numbered_entries(dir: &Path) -> Vec<(u32, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut numbered: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let index = entry.file_name().to_str()?.parse::<u32>().ok()?;
            Some((index, entry.path()))
        })
        .filter(|(_, path)| path.is_dir())
        .collect();
    numbered.sort_by_key(|(index, _)| *index);
    numbered
}

/// Read a single-value sysfs file, trimmed.
pub fn read_trimmed(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
