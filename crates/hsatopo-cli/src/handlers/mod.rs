//! Command handlers.

pub mod diagnostics;
