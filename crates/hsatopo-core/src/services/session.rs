//! Scoped ownership of an initialized platform runtime.

use tracing::{info, warn};

use crate::error::TopologyError;
use crate::ports::{PlatformLoader, PlatformRuntime};

use super::enumerator::{EnumerationOptions, TopologyEnumerator};

/// Owns a runtime between initialization and teardown.
///
/// [`RuntimeSession::close`] tears down and reports failures. A session that
/// is dropped without being closed (an early `?` return) still tears down,
/// logging any error, so the runtime is released on every exit path and
/// exactly once.
pub struct RuntimeSession<R: PlatformRuntime> {
    runtime: R,
    closed: bool,
}

impl<R: PlatformRuntime> RuntimeSession<R> {
    /// Initialize the platform runtime.
    pub fn open<L>(loader: &L) -> Result<Self, TopologyError>
    where
        L: PlatformLoader<Runtime = R> + ?Sized,
    {
        info!("initializing platform runtime");
        let runtime = loader
            .initialize()
            .map_err(|source| TopologyError::Initialization {
                call: "runtime initialization",
                source,
            })?;

        Ok(Self {
            runtime,
            closed: false,
        })
    }

    pub const fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Enumerator borrowing this session's runtime.
    pub const fn enumerator(&self, options: EnumerationOptions) -> TopologyEnumerator<'_, R> {
        TopologyEnumerator::new(&self.runtime, options)
    }

    /// Tear the runtime down.
    pub fn close(mut self) -> Result<(), TopologyError> {
        self.closed = true;
        info!("shutting down platform runtime");
        self.runtime
            .shut_down()
            .map_err(|source| TopologyError::Shutdown {
                call: "runtime shutdown",
                source,
            })
    }
}

impl<R: PlatformRuntime> Drop for RuntimeSession<R> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.runtime.shut_down() {
            warn!(error = %err, "platform runtime teardown failed");
        }
    }
}
