//! Utility functions and types.
//!
//! This module provides the logging utilities used by the harness and the
//! command line.

pub mod logging;

pub use logging::{init_logging, LogLevel};
