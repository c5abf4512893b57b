//! Drives the harness scenarios from a [`HarnessConfig`].

use std::fmt;

use log::{debug, info};
use serde::Serialize;

use latch_core::{ConfigError, HarnessError, LockKind};
use latch_sync::{AnyLock, LockStats, TrackedLock};

use crate::config::HarnessConfig;
use crate::handshake::{run_handshake, HandshakeReport};
use crate::stress::{run_stress, StressReport};

/// A stress report together with the lock's usage statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StressRun {
    /// Trial results
    pub report: StressReport,

    /// Usage counted over every trial
    pub stats: LockStats,
}

impl fmt::Display for StressRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.report)?;
        write!(
            f,
            "  lock stats: {} acquisitions ({} contended, {:.1}%), {} releases",
            self.stats.acquisitions,
            self.stats.contended_acquisitions,
            self.stats.contention_ratio() * 100.0,
            self.stats.releases
        )
    }
}

/// Results of running every scenario.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Primitive under test
    pub lock: LockKind,

    /// Stress scenario result
    pub stress: StressRun,

    /// One report per handshake round
    pub handshakes: Vec<HandshakeReport>,
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.stress)?;
        for (round, report) in self.handshakes.iter().enumerate() {
            writeln!(f, "round {}: {}", round, report)?;
        }
        write!(f, "all scenarios passed on the {} lock", self.lock)
    }
}

/// Runs harness scenarios against the configured primitive.
#[derive(Debug, Clone)]
pub struct Runner {
    config: HarnessConfig,
}

impl Runner {
    /// Create a runner, rejecting an invalid configuration.
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run the stress scenario on one tracked lock shared by all trials.
    pub fn stress(&self) -> Result<StressRun, HarnessError> {
        let lock = TrackedLock::with_name(AnyLock::new(self.config.lock), "stress-counter");
        let report = run_stress(&lock, &self.config.stress())?;
        let stats = lock.stats();
        debug!(
            "Stress lock stats: {} acquisitions, {} contended",
            stats.acquisitions, stats.contended_acquisitions
        );
        Ok(StressRun { report, stats })
    }

    /// Run the handshake `handshake_rounds` times, each on a fresh lock.
    ///
    /// Stops at the first failing round.
    pub fn handshake(&self) -> Result<Vec<HandshakeReport>, HarnessError> {
        (0..self.config.handshake_rounds)
            .map(|round| {
                debug!("Handshake round {} of {}", round + 1, self.config.handshake_rounds);
                run_handshake(AnyLock::new(self.config.lock), self.config.prime_n)
            })
            .collect()
    }

    /// Run the stress scenario, then the handshake rounds.
    pub fn run_all(&self) -> Result<SuiteReport, HarnessError> {
        info!("Running all scenarios on the {} lock", self.config.lock);
        let stress = self.stress()?;
        let handshakes = self.handshake()?;
        Ok(SuiteReport {
            lock: self.config.lock,
            stress,
            handshakes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(lock: LockKind) -> HarnessConfig {
        HarnessConfig {
            lock,
            threads: 4,
            ops_per_thread: 50,
            trials: 2,
            prime_n: 20,
            handshake_rounds: 3,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = HarnessConfig {
            threads: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(Runner::new(config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_stress_counts_every_acquisition() {
        let runner = Runner::new(quick(LockKind::Spin)).unwrap();
        let run = runner.stress().unwrap();

        // 4 threads x 50 ops x 2 trials
        assert_eq!(run.stats.acquisitions, 400);
        assert_eq!(run.stats.releases, 400);
        assert!(run.stats.contended_acquisitions <= run.stats.acquisitions);
    }

    #[test]
    fn test_handshake_rounds() {
        let runner = Runner::new(quick(LockKind::Yield)).unwrap();
        let reports = runner.handshake().unwrap();

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert!(!report.first_probe);
            assert!(report.second_probe);
            assert_eq!(report.nth_prime, 71);
        }
    }

    #[test]
    fn test_run_all() {
        let runner = Runner::new(quick(LockKind::Spin)).unwrap();
        let suite = runner.run_all().unwrap();

        assert_eq!(suite.lock, LockKind::Spin);
        assert_eq!(suite.handshakes.len(), 3);
        assert!(suite.to_string().contains("all scenarios passed on the spin lock"));
    }
}
