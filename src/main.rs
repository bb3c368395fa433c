mod agents;
mod cli;
mod config;
mod error;
mod github;
mod logging;
mod release;
mod repository;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use config::DeployConfig;
use error::Result;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(e.exit_code());
        }
    }
}

/// Runs the selected command and returns the process exit code.
fn run(cli: Cli) -> Result<i32> {
    let config = DeployConfig::new(&cli.api_url, cli.token)?;

    match cli.command {
        Commands::Check { repo, path } => {
            workflow::execute_check(&repo, &path, &config).map(|status| status.exit_code())
        }
        Commands::Update {
            repo,
            path,
            keep,
            download_timeout,
        } => {
            let config = config
                .with_keep(keep)?
                .with_download_timeout(download_timeout)?;
            workflow::execute_update(&repo, &path, &config).map(|()| 0)
        }
        Commands::Cleanup {
            path,
            keep,
            dry_run,
        } => {
            let keep = config.with_keep(keep)?.keep;
            workflow::execute_cleanup(&path, keep, dry_run).map(|()| 0)
        }
    }
}
