//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Print the agents, memory regions and caches exposed by the HSA platform.
///
/// With no arguments the live KFD topology is probed.
#[derive(Debug, Parser)]
#[command(name = "hsatopo")]
#[command(about = "Print the HSA compute topology: agents, memory regions and caches")]
#[command(version)]
pub struct Cli {
    /// KFD topology directory to read instead of the system one
    #[arg(long = "topology-root", env = "HSATOPO_TOPOLOGY_ROOT", value_name = "DIR")]
    pub topology_root: Option<PathBuf>,

    /// Replay a JSON topology instead of probing the system
    #[arg(
        long,
        env = "HSATOPO_FIXTURE",
        value_name = "FILE",
        conflicts_with = "topology_root"
    )]
    pub fixture: Option<PathBuf>,

    /// Skip agents and regions that cannot be classified instead of aborting
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
