//! The handshake command

use std::fmt;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use latch_harness::{ConfigOverrides, HandshakeReport, Runner};

use super::print_report;

/// Arguments for the handshake command
#[derive(Args, Debug, Clone, Default)]
pub struct HandshakeArgs {
    /// Which prime the holder computes while owning the lock
    #[clap(long)]
    pub prime: Option<u64>,

    /// Number of handshake rounds
    #[clap(long)]
    pub rounds: Option<usize>,
}

impl HandshakeArgs {
    /// Copy the given flags into `overrides`.
    pub fn apply(&self, overrides: &mut ConfigOverrides) {
        overrides.prime_n = self.prime;
        overrides.handshake_rounds = self.rounds;
    }
}

/// Implementation of the handshake command
pub fn execute_handshake(runner: &Runner, json: bool) -> Result<()> {
    let reports = runner.handshake().context("Handshake failed")?;
    print_report(&HandshakeRounds(&reports), json)
}

/// Every round of a handshake run, printed together
#[derive(Serialize)]
#[serde(transparent)]
struct HandshakeRounds<'a>(&'a [HandshakeReport]);

impl fmt::Display for HandshakeRounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (round, report) in self.0.iter().enumerate() {
            if round > 0 {
                writeln!(f)?;
            }
            write!(f, "round {}: {}", round, report)?;
        }
        Ok(())
    }
}
