use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use latch_core::{init_logging, LockKind, LogLevel};
use latch_harness::{ConfigOverrides, HarnessConfig, Runner};

mod commands;

use commands::{HandshakeArgs, StressArgs};

/// Latch lock verification harness
///
/// Runs the contention stress scenario and the two-thread try_lock handshake
/// against the busy-wait or the yielding lock.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Lock primitive under test (spin or yield)
    #[clap(long, global = true)]
    lock: Option<LockKind>,

    /// TOML configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Console log level (trace, debug, info, warning, error, off)
    #[clap(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log every guarded increment
    #[clap(long, global = true)]
    verbose: bool,

    /// Print reports as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hammer one lock-guarded counter from many threads
    Stress(StressArgs),

    /// Probe the lock with try_lock while held and after release
    Handshake(HandshakeArgs),

    /// Run the stress scenario, then the handshake
    All {
        #[clap(flatten)]
        stress: StressArgs,

        #[clap(flatten)]
        handshake: HandshakeArgs,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            lock: self.lock,
            log_level: self.log_level,
            verbose: self.verbose,
            ..ConfigOverrides::default()
        };
        match &self.command {
            Commands::Stress(args) => args.apply(&mut overrides),
            Commands::Handshake(args) => args.apply(&mut overrides),
            Commands::All { stress, handshake } => {
                stress.apply(&mut overrides);
                handshake.apply(&mut overrides);
            }
        }
        overrides
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config =
        HarnessConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.merge(cli.overrides());

    init_logging(config.log_level).context("Failed to initialize logging")?;
    debug!("Effective configuration: {:?}", config);

    let runner = Runner::new(config).context("Invalid configuration")?;
    match &cli.command {
        Commands::Stress(_) => commands::execute_stress(&runner, cli.json),
        Commands::Handshake(_) => commands::execute_handshake(&runner, cli.json),
        Commands::All { .. } => commands::execute_all(&runner, cli.json),
    }
}
