//! DpRt CLI - real-time data reduction for telescope frames.
//!
//! # Usage
//!
//! ```bash
//! # Reduce a calibration frame
//! dprt calibrate c_b_20240101_1_1_1_0.fits
//!
//! # Reduce a science exposure with an explicit property file
//! dprt --properties ./dprt.properties expose c_e_20240101_7_1_1_0.fits
//!
//! # Reduce every frame in a night's directory
//! dprt batch ./20240101/ --kind expose --format jsonl --output night.jsonl
//!
//! # View configuration
//! dprt config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// DpRt - real-time data reduction for telescope frames.
#[derive(Parser, Debug)]
#[command(name = "dprt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Property file to use instead of the one named in the config
    #[arg(short, long, global = true, env = "DPRT_PROPERTIES")]
    properties: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Reduce a calibration (bias, dark, flat) frame
    Calibrate(cli::reduce::ReduceArgs),

    /// Reduce a science exposure
    Expose(cli::reduce::ReduceArgs),

    /// Build a master bias from a directory of bias frames
    MasterBias(cli::reduce::MasterArgs),

    /// Build a master flat from a directory of flat frames
    MasterFlat(cli::reduce::MasterArgs),

    /// Reduce every frame in a directory
    Batch(cli::batch::BatchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match dprt_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `dprt config path`."
            );
            dprt_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("DpRt v{}", dprt_core::VERSION);

    let session = cli::Session::new(config, cli.properties);
    match cli.command {
        Commands::Calibrate(args) => {
            cli::reduce::execute(session, dprt_core::RequestKind::Calibration, args).await
        }
        Commands::Expose(args) => {
            cli::reduce::execute(session, dprt_core::RequestKind::Exposure, args).await
        }
        Commands::MasterBias(args) => {
            cli::reduce::execute_master(session, dprt_core::RequestKind::MasterBias, args).await
        }
        Commands::MasterFlat(args) => {
            cli::reduce::execute_master(session, dprt_core::RequestKind::MasterFlat, args).await
        }
        Commands::Batch(args) => cli::batch::execute(session, args).await,
        Commands::Config(args) => cli::config::execute(session, args).await,
    }
}
