//! Shared utilities for Dareboard binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat};
