//! Subcommand implementations
//!
//! Each command runs one or more harness scenarios through a configured
//! [`Runner`](latch_harness::Runner) and prints the result to stdout, either
//! as text or as JSON.

pub mod handshake;
pub mod stress;

use std::fmt::Display;

use anyhow::{Context, Result};
use serde::Serialize;

use latch_harness::Runner;

pub use handshake::{execute_handshake, HandshakeArgs};
pub use stress::{execute_stress, StressArgs};

/// Implementation of the all command
pub fn execute_all(runner: &Runner, json: bool) -> Result<()> {
    let suite = runner.run_all().context("Harness run failed")?;
    print_report(&suite, json)
}

/// Print a report as text, or as pretty JSON.
pub(crate) fn print_report<T>(report: &T, json: bool) -> Result<()>
where
    T: Serialize + Display + ?Sized,
{
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        println!("{}", report);
    }
    Ok(())
}
