use crate::config::DeployConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::repository::{AssetFetcher, ReleaseSource};
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// One shared GitHub client serving both release metadata and asset downloads.
    pub fn create_github(
        config: &DeployConfig,
    ) -> Result<(Arc<dyn ReleaseSource>, Arc<dyn AssetFetcher>)> {
        let client = Arc::new(GitHubClient::new(config)?);
        let source: Arc<dyn ReleaseSource> = client.clone();
        let fetcher: Arc<dyn AssetFetcher> = client;
        Ok((source, fetcher))
    }
}
