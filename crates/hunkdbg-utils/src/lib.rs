//! # hunkdbg Utilities
//!
//! Shared utilities for the hunkdbg workspace.
//!
//! Currently this is the logging setup used by the command-line host. The
//! core crate only depends on `tracing` and never installs a subscriber.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_from, init_logging_with_level, LogConfig, LogFormat, LogLevel, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
