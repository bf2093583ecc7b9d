//! The diagnostics run: open the runtime, enumerate, print, tear down.

use std::fs;
use std::io::Write;
use std::path::Path;

use hsatopo_core::{
    EnumerationOptions, FixtureLoader, FixtureTopology, PlatformLoader, RuntimeSession,
};
use hsatopo_sysfs::{SysfsConfig, SysfsLoader};
use tracing::debug;

use crate::error::CliError;
use crate::parser::Cli;
use crate::presentation::write_report;

/// Execute a run as configured by the command line.
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    let options = EnumerationOptions::default().keep_going(cli.keep_going);

    if let Some(path) = &cli.fixture {
        let loader = FixtureLoader::new(load_fixture(path)?);
        return run(&loader, options, out);
    }

    run(&SysfsLoader::new(sysfs_config(cli)), options, out)
}

/// Sysfs locations for this run: environment defaults plus `--topology-root`.
pub fn sysfs_config(cli: &Cli) -> SysfsConfig {
    let config = SysfsConfig::from_env();
    match &cli.topology_root {
        Some(root) => config.with_topology_root(root),
        None => config,
    }
}

/// Read a JSON topology description.
pub fn load_fixture(path: &Path) -> Result<FixtureTopology, CliError> {
    let content = fs::read_to_string(path).map_err(|err| CliError::FixtureUnreadable {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    FixtureTopology::from_json(&content).map_err(|err| CliError::FixtureInvalid {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Drive one session against `loader` and write the report to `out`.
///
/// The report is rendered in full before anything is written, so a fatal
/// failure leaves `out` untouched. Teardown happens after the report is out.
pub fn run<L, W>(loader: &L, options: EnumerationOptions, out: &mut W) -> Result<(), CliError>
where
    L: PlatformLoader,
    W: Write,
{
    let session = RuntimeSession::open(loader)?;
    let enumerator = session.enumerator(options);

    let summary = enumerator.system_summary()?;
    debug!(version = %summary.version, "system summary");
    let report = enumerator.enumerate()?;

    let mut rendered = Vec::new();
    write_report(&mut rendered, &summary, &report)?;
    out.write_all(&rendered)?;
    out.flush()?;

    session.close()?;
    Ok(())
}
