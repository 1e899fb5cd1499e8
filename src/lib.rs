pub mod aggregate;
pub mod clean;
pub mod cli;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod listing;
pub mod preview;
pub mod report;
pub mod table;
pub mod views;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("vehicle_listings", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Report(args) => report::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}
