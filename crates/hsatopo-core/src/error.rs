//! Error taxonomy for the enumeration engine.
//!
//! `PlatformError` is what adapters return from lifecycle and traversal
//! primitives. `TopologyError` is what the engine surfaces to callers; only
//! its variants halt a run; a failed non-classification attribute query
//! never becomes a `TopologyError`.

use thiserror::Error;

use crate::ports::AttributeUnavailable;

/// Failures reported by a platform runtime adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Called outside the initialize/shutdown window.
    #[error("runtime is not initialized")]
    NotInitialized,

    /// A handle that this runtime never produced.
    #[error("invalid {kind} handle {handle:#x}")]
    InvalidHandle { kind: &'static str, handle: u64 },

    /// The platform cannot provide the requested service.
    #[error("{0}")]
    Unavailable(String),

    /// I/O failure while talking to the platform.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Fatal failures of a topology run.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The runtime failed to start or cannot report its version.
    #[error("{call} failed: {source}")]
    Initialization {
        call: &'static str,
        source: PlatformError,
    },

    /// An agent's device class or a region's segment kind is unavailable.
    #[error("cannot classify {object}: {source}")]
    Classification {
        object: String,
        source: AttributeUnavailable,
    },

    /// An enumeration primitive (agents, regions, caches) failed.
    #[error("{call} failed: {source}")]
    Traversal {
        call: &'static str,
        source: PlatformError,
    },

    /// Teardown failed after the report was produced.
    #[error("{call} failed: {source}")]
    Shutdown {
        call: &'static str,
        source: PlatformError,
    },
}

impl TopologyError {
    pub const fn is_classification(&self) -> bool {
        matches!(self, Self::Classification { .. })
    }
}
