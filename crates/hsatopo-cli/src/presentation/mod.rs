//! Presentation helpers for CLI output.

pub mod report;

pub use report::{format_cache, format_region, region_label, write_agent, write_report};
