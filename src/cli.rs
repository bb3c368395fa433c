use crate::config::{DEFAULT_API_URL, DEFAULT_DOWNLOAD_TIMEOUT_SECS, HISTORY_COUNT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "static-site-deployer",
    about = "Deploy a static website from the latest published release",
    version,
    author
)]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the hosting service API
    #[arg(
        long,
        global = true,
        env = "STATIC_SITE_DEPLOYER_API_URL",
        default_value = DEFAULT_API_URL
    )]
    pub api_url: String,

    /// Access token for the hosting service API
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the deployed site is the latest release
    Check {
        /// Repository to download from (owner/name)
        repo: String,

        /// Where the site is deployed
        path: PathBuf,
    },

    /// Download and deploy the latest release, then prune old releases
    Update {
        /// Repository to download from (owner/name)
        repo: String,

        /// Where to deploy the site
        path: PathBuf,

        /// Number of releases to keep on disk
        #[arg(long, default_value_t = HISTORY_COUNT)]
        keep: usize,

        /// Seconds to wait for the release download
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
        download_timeout: u64,
    },

    /// Prune old releases without deploying anything
    Cleanup {
        /// Where the site is deployed
        path: PathBuf,

        /// Number of releases to keep on disk
        #[arg(long, default_value_t = HISTORY_COUNT)]
        keep: usize,

        /// List the releases that would be removed without deleting them
        #[arg(long)]
        dry_run: bool,
    },
}
