mod agents;
mod cli;
mod config;
mod error;
#[cfg(all(test, unix))]
mod test_support;
mod utils;
mod workflow;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::UpdaterConfig;
use std::process;

fn main() {
    let cli = Cli::parse();
    utils::logger::init_cli_logger(cli.verbose);

    let config = UpdaterConfig::default();
    tracing::debug!(?config, "starting update");

    if let Err(e) = workflow::execute_update(&config) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(e.exit_code());
    }
}
