//! Configuration for harness runs
//!
//! Loaded from an optional TOML file, then overlaid with command-line
//! overrides.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use latch_core::{ConfigError, LockKind, LogLevel};

use crate::stress::StressConfig;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Primitive under test
    #[serde(default)]
    pub lock: LockKind,

    /// Worker threads per stress trial
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Guarded increments per worker
    #[serde(default = "default_ops_per_thread")]
    pub ops_per_thread: usize,

    /// Stress trials
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Workload knob for the handshake holder (which prime to compute)
    #[serde(default = "default_prime_n")]
    pub prime_n: u64,

    /// How many times to repeat the handshake
    #[serde(default = "default_handshake_rounds")]
    pub handshake_rounds: usize,

    /// Console log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log every guarded increment
    #[serde(default)]
    pub verbose: bool,
}

fn default_threads() -> usize {
    100
}

fn default_ops_per_thread() -> usize {
    100
}

fn default_trials() -> usize {
    10
}

fn default_prime_n() -> u64 {
    50_000
}

fn default_handshake_rounds() -> usize {
    1
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            lock: LockKind::default(),
            threads: default_threads(),
            ops_per_thread: default_ops_per_thread(),
            trials: default_trials(),
            prime_n: default_prime_n(),
            handshake_rounds: default_handshake_rounds(),
            log_level: LogLevel::default(),
            verbose: false,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Primitive under test
    pub lock: Option<LockKind>,
    /// Worker threads per stress trial
    pub threads: Option<usize>,
    /// Guarded increments per worker
    pub ops_per_thread: Option<usize>,
    /// Stress trials
    pub trials: Option<usize>,
    /// Handshake workload knob
    pub prime_n: Option<u64>,
    /// Handshake repetitions
    pub handshake_rounds: Option<usize>,
    /// Console log level
    pub log_level: Option<LogLevel>,
    /// Only ever switches verbose logging on
    pub verbose: bool,
}

impl HarnessConfig {
    /// Load configuration from a file
    ///
    /// With no path the defaults are used. A path that cannot be read or
    /// parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Load {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            None => {
                info!("No configuration file specified, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("threads", self.threads),
            ("ops_per_thread", self.ops_per_thread),
            ("trials", self.trials),
            ("handshake_rounds", self.handshake_rounds),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }

        if self.prime_n == 0 {
            return Err(ConfigError::Invalid("prime_n must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Overlay command-line overrides
    pub fn merge(&mut self, overrides: ConfigOverrides) {
        if let Some(lock) = overrides.lock {
            self.lock = lock;
        }
        if let Some(threads) = overrides.threads {
            self.threads = threads;
        }
        if let Some(ops) = overrides.ops_per_thread {
            self.ops_per_thread = ops;
        }
        if let Some(trials) = overrides.trials {
            self.trials = trials;
        }
        if let Some(prime_n) = overrides.prime_n {
            self.prime_n = prime_n;
        }
        if let Some(rounds) = overrides.handshake_rounds {
            self.handshake_rounds = rounds;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if overrides.verbose {
            self.verbose = true;
        }
    }

    /// The stress scenario parameters.
    pub fn stress(&self) -> StressConfig {
        StressConfig {
            threads: self.threads,
            ops_per_thread: self.ops_per_thread,
            trials: self.trials,
            verbose: self.verbose,
        }
    }
}
