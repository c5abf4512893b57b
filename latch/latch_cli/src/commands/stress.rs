//! The stress command

use anyhow::{Context, Result};
use clap::Args;

use latch_harness::{ConfigOverrides, Runner};

use super::print_report;

/// Arguments for the stress command
#[derive(Args, Debug, Clone, Default)]
pub struct StressArgs {
    /// Worker threads per trial
    #[clap(long)]
    pub threads: Option<usize>,

    /// Guarded increments per worker
    #[clap(long)]
    pub ops: Option<usize>,

    /// Number of trials
    #[clap(long)]
    pub trials: Option<usize>,
}

impl StressArgs {
    /// Copy the given flags into `overrides`.
    pub fn apply(&self, overrides: &mut ConfigOverrides) {
        overrides.threads = self.threads;
        overrides.ops_per_thread = self.ops;
        overrides.trials = self.trials;
    }
}

/// Implementation of the stress command
pub fn execute_stress(runner: &Runner, json: bool) -> Result<()> {
    let run = runner.stress().context("Stress scenario failed")?;
    print_report(&run, json)
}
