use crate::error::{DeployError, Result};
use crate::release::ReleaseAsset;
use crate::repository::ReleaseSource;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on pages scanned, so a misbehaving `Link` header can't loop forever.
const MAX_PAGES: u32 = 1000;

/// Picks the primary asset of the newest eligible release.
pub struct ReleaseSelector {
    source: Arc<dyn ReleaseSource>,
}

impl ReleaseSelector {
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self { source }
    }

    /// Scan releases in service order and return the first asset of the first
    /// release that is published, not a prerelease, and has assets.
    ///
    /// Every page is scanned before giving up with `NoEligibleRelease`. A
    /// listing still advertising more pages after `MAX_PAGES` is an error of
    /// its own, since not every release was seen.
    pub fn latest_asset(&self, repo: &str) -> Result<ReleaseAsset> {
        for page in 1..=MAX_PAGES {
            let listing = self.source.fetch_release_page(repo, page)?;
            debug!(repo, page, count = listing.releases.len(), "scanning releases");

            if let Some(release) = listing.releases.iter().find(|r| r.is_eligible()) {
                if let Some(asset) = release.primary_asset() {
                    debug!(
                        tag = release.tag_name.as_deref().unwrap_or("<untagged>"),
                        asset = %asset.name,
                        "selected release"
                    );
                    return Ok(asset.clone());
                }
            }

            if !listing.has_next {
                return Err(DeployError::NoEligibleRelease(repo.to_string()));
            }
        }

        Err(DeployError::UnboundedListing {
            repo: repo.to_string(),
            pages: MAX_PAGES,
        })
    }
}
