//! trace-histo CLI
//!
//! Turns simulator event traces into scheduling interval histograms and
//! page-replacement statistics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_histo::commands::{
    display_version, execute_process, inspect_histogram_file, validate_args, ProcessArgs,
};

/// trace-histo - interval histograms from simulator traces
#[derive(Parser, Debug)]
#[command(name = "trace-histo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a trace into histograms
    Process {
        /// JSON-lines trace file
        #[arg(short, long, env = "TRACE_HISTO_TRACE")]
        trace: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "histograms")]
        out_dir: PathBuf,

        /// TOML pipeline configuration
        #[arg(short, long, env = "TRACE_HISTO_CONFIG")]
        config: Option<PathBuf>,

        /// Exit markers ignored before snapshot cuts start
        #[arg(long)]
        grace_markers: Option<u32>,

        /// Buckets per interval histogram
        #[arg(long)]
        interval_buckets: Option<usize>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Parse and describe a histogram file
    Inspect {
        /// Path to .histo file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Process {
            trace,
            out_dir,
            config,
            grace_markers,
            interval_buckets,
            summary,
        } => {
            let args = ProcessArgs {
                trace,
                out_dir,
                config,
                grace_markers,
                interval_buckets,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_process(args)?;
        }

        Commands::Inspect { file } => {
            inspect_histogram_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
