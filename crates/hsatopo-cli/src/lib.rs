//! hsatopo command-line adapter.
//!
//! Composition root: picks a platform loader (live KFD sysfs or a JSON
//! fixture), drives a [`hsatopo_core::RuntimeSession`] and renders the report.

#![deny(unused_crate_dependencies)]

pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use error::CliError;
pub use parser::Cli;
