//! CLI-specific error types and mappings.
//!
//! Maps topology failures to exit codes and user-facing messages.

use hsatopo_core::TopologyError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Fatal failure while driving the platform runtime.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The `--fixture` file could not be read.
    #[error("cannot read fixture {path}: {message}")]
    FixtureUnreadable { path: String, message: String },

    /// The `--fixture` file is not a valid topology description.
    #[error("invalid fixture {path}: {message}")]
    FixtureInvalid { path: String, message: String },

    /// Writing the report failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Topology(TopologyError::Initialization { .. }) => 69, // EX_UNAVAILABLE
            Self::Topology(TopologyError::Classification { .. }) => 65, // EX_DATAERR
            Self::Topology(TopologyError::Traversal { .. }) => 74,      // EX_IOERR
            Self::Topology(TopologyError::Shutdown { .. }) => 70,       // EX_SOFTWARE
            Self::FixtureUnreadable { .. } => 66,                       // EX_NOINPUT
            Self::FixtureInvalid { .. } => 65,                          // EX_DATAERR
            Self::Io(_) => 74,                                          // EX_IOERR
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use hsatopo_core::{AttributeUnavailable, PlatformError, UnavailableReason};

    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_failure_kind() {
        let init = CliError::from(TopologyError::Initialization {
            call: "runtime initialization",
            source: PlatformError::Unavailable("no KFD".to_string()),
        });
        let classification = CliError::from(TopologyError::Classification {
            object: "agent 0x1".to_string(),
            source: AttributeUnavailable::new("device", UnavailableReason::NotReported),
        });
        let shutdown = CliError::from(TopologyError::Shutdown {
            call: "runtime shutdown",
            source: PlatformError::NotInitialized,
        });

        assert_eq!(init.exit_code(), 69);
        assert_eq!(classification.exit_code(), 65);
        assert_eq!(shutdown.exit_code(), 70);
        assert_ne!(init.exit_code(), 0);
    }

    #[test]
    fn test_topology_message_is_passed_through() {
        let err = CliError::from(TopologyError::Initialization {
            call: "runtime initialization",
            source: PlatformError::Unavailable("no KFD".to_string()),
        });
        assert_eq!(err.to_string(), "runtime initialization failed: no KFD");
    }

    #[test]
    fn test_io_error() {
        let err = CliError::from(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        assert_eq!(err.exit_code(), 74);
        assert_eq!(err.to_string(), "IO error: pipe closed");
    }
}
