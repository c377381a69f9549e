use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sluice",
    version,
    about = "Hierarchical concurrent metric store",
    long_about = "Drives a sluice metric store from simulated pipeline workers and \
                 reports periodic snapshots of the metric tree."
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log format (json, compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run simulated pipelines against the store
    Run {
        /// Number of pipelines, one worker thread each
        #[arg(short, long, default_value = "4")]
        pipelines: usize,

        /// Events processed by each pipeline
        #[arg(short, long, default_value = "10000")]
        events: u64,

        /// Reporter interval in milliseconds (overrides config file if provided)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Validate a configuration file
    Config {
        /// Configuration file to validate
        #[arg(short, long)]
        file: PathBuf,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}
