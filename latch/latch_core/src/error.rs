//! Error types for the Latch toolkit.
//!
//! The lock primitives themselves never fail: misuse such as releasing a lock
//! that the caller does not hold is a contract violation and is not detected.
//! Everything that *can* be reported lives here, organized by subsystem, with
//! the root [`Error`] wrapping each subsystem error.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ProbeAttempt;

/// Root error type for Latch.
#[derive(Debug, Error)]
pub enum Error {
    /// Verification harness errors
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A lock kind name that matches no primitive
    #[error("Unknown lock kind: {0}")]
    UnknownLockKind(String),

    /// The global logger could not be installed
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcomes of a harness run that differ from what a correct lock produces.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A non-blocking acquisition attempt returned the wrong result
    #[error("{probe} probe expected try_lock() == {expected}, observed {observed}")]
    ProbeMismatch {
        /// Which of the two probes disagreed
        probe: ProbeAttempt,

        /// The result a correct lock produces at this point
        expected: bool,

        /// The result actually observed
        observed: bool,
    },

    /// The guarded counter did not reach threads x operations
    #[error("trial {trial}: expected count {expected}, observed {observed}")]
    CountMismatch {
        /// Zero-based trial index
        trial: usize,

        /// threads x operations per thread
        expected: u64,

        /// Final counter value
        observed: u64,
    },

    /// The recorded handshake events are not in acquire, probe, release, probe order
    #[error("handshake events out of order: expected [{expected}], observed [{observed}]")]
    EventOrder {
        /// Expected event sequence
        expected: String,

        /// Observed event sequence
        observed: String,
    },

    /// A participant thread panicked before it could report
    #[error("thread panicked: {0}")]
    ThreadPanicked(String),

    /// A participant thread could not be created
    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

/// Errors loading or validating harness configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Load {
        /// Path of the configuration file
        path: PathBuf,

        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path of the configuration file
        path: PathBuf,

        /// Parser message
        message: String,
    },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout Latch.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let harness_err = HarnessError::ThreadPanicked("boom".into());
        let error: Error = harness_err.into();
        assert!(matches!(error, Error::Harness(HarnessError::ThreadPanicked(_))));

        let config_err = ConfigError::Invalid("threads must be at least 1".into());
        let error: Error = config_err.into();
        assert!(matches!(error, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_probe_mismatch_display() {
        let error: Error = HarnessError::ProbeMismatch {
            probe: ProbeAttempt::First,
            expected: false,
            observed: true,
        }
        .into();
        let display = error.to_string();
        assert!(display.contains("first probe expected try_lock() == false, observed true"));
    }

    #[test]
    fn test_count_mismatch_display() {
        let error = HarnessError::CountMismatch {
            trial: 3,
            expected: 10_000,
            observed: 9_998,
        };
        assert_eq!(
            error.to_string(),
            "trial 3: expected count 10000, observed 9998"
        );
    }
}
