use crate::error::Result;
use crate::release::{Release, ReleaseAsset};
use std::io::Read;
use std::time::Duration;

pub mod factory;
pub mod selector;

pub use factory::RepositoryFactory;
pub use selector::ReleaseSelector;

/// One page of a repository's release listing, newest first.
#[derive(Debug, Clone, Default)]
pub struct ReleasePage {
    pub releases: Vec<Release>,
    pub has_next: bool,
}

/// Source of release metadata for a repository.
pub trait ReleaseSource: Send + Sync {
    /// Fetch one page (1-based) of releases in the order the service lists them.
    fn fetch_release_page(&self, repo: &str, page: u32) -> Result<ReleasePage>;
}

/// Opens the raw bytes of a release asset as a stream.
pub trait AssetFetcher: Send + Sync {
    fn open_asset(&self, asset: &ReleaseAsset, timeout: Duration) -> Result<Box<dyn Read + Send>>;
}
