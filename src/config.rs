use crate::error::{DeployError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const HISTORY_COUNT: usize = 5;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("repository pattern is valid")
});

/// Settings shared by every command, validated once at startup.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub api_url: Url,
    pub token: Option<String>,
    pub keep: usize,
    pub download_timeout: Duration,
}

impl DeployConfig {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        Ok(Self {
            api_url: Self::validate_api_url(api_url)?,
            token: token.filter(|t| !t.trim().is_empty()),
            keep: HISTORY_COUNT,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        })
    }

    pub fn with_keep(mut self, keep: usize) -> Result<Self> {
        if keep == 0 {
            return Err(DeployError::Config(
                "Must keep at least one release".to_string(),
            ));
        }
        self.keep = keep;
        Ok(self)
    }

    pub fn with_download_timeout(mut self, secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(DeployError::Config(
                "Download timeout must be greater than zero".to_string(),
            ));
        }
        self.download_timeout = Duration::from_secs(secs);
        Ok(self)
    }

    fn validate_api_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url)
            .map_err(|_| DeployError::Config(format!("Invalid API URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => Ok(parsed),
            scheme => Err(DeployError::Config(format!(
                "Unsupported API URL scheme: {scheme}"
            ))),
        }
    }
}

/// Repository identifiers look like `owner/name`.
pub fn validate_repo(repo: &str) -> Result<&str> {
    if REPO_RE.is_match(repo) && !repo.split('/').any(|part| part == "." || part == "..") {
        Ok(repo)
    } else {
        Err(DeployError::Config(format!(
            "Repository must be of the form owner/name, got '{repo}'"
        )))
    }
}
