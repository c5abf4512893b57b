//! # Latch Core
//!
//! `latch_core` provides the shared building blocks for the Latch lock toolkit:
//! the error hierarchy, the [`RawLock`] contract every lock primitive
//! implements, the [`LockKind`] selector used to pick a primitive at run time,
//! and the logging setup shared by the harness and the command line.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Latch components
//! - **traits**: The raw lock contract
//! - **types**: Data types shared across crates
//! - **utils**: Logging utilities

pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export key types and traits for convenience
pub use error::{ConfigError, Error, HarnessError, Result};
pub use traits::RawLock;
pub use types::{LockKind, ProbeAttempt};
pub use utils::{init_logging, LogLevel};
