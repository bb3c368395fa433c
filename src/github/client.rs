use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::release::{Release, ReleaseAsset};
use crate::repository::{AssetFetcher, ReleasePage, ReleaseSource};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use std::io::Read;
use std::time::Duration;
use tracing::debug;
use url::Url;

const PAGE_SIZE: u32 = 100;
const API_VERSION: &str = "2022-11-28";

/// Blocking client for the GitHub releases API.
///
/// Built once from [`DeployConfig`] and handed to whatever needs release
/// metadata or asset bytes.
pub struct GitHubClient {
    client: Client,
    api_base: Url,
}

impl GitHubClient {
    pub fn new(config: &DeployConfig) -> Result<Self> {
        let client = Self::build_client(config.token.as_deref())?;

        let mut api_base = config.api_url.clone();
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        Ok(Self { client, api_base })
    }

    fn build_client(token: Option<&str>) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| DeployError::Config("Token contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Client::builder()
            .user_agent(concat!("static-site-deployer/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(DeployError::Network)
    }

    fn releases_url(&self, repo: &str, page: u32) -> Result<Url> {
        let mut url = self
            .api_base
            .join(&format!("repos/{repo}/releases"))
            .map_err(|e| DeployError::Config(format!("Invalid release URL for {repo}: {e}")))?;

        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());

        Ok(url)
    }
}

impl ReleaseSource for GitHubClient {
    fn fetch_release_page(&self, repo: &str, page: u32) -> Result<ReleasePage> {
        let url = self.releases_url(repo, page)?;
        debug!(%url, "fetching releases");

        let response = self.client.get(url).send()?.error_for_status()?;

        let has_next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .is_some_and(link_has_next);

        let body = response.bytes()?;
        let releases: Vec<Release> = serde_json::from_slice(&body)?;

        Ok(ReleasePage { releases, has_next })
    }
}

impl AssetFetcher for GitHubClient {
    fn open_asset(&self, asset: &ReleaseAsset, timeout: Duration) -> Result<Box<dyn Read + Send>> {
        debug!(url = %asset.url, ?timeout, "downloading asset");

        let response = self
            .client
            .get(&asset.url)
            .header(ACCEPT, "application/octet-stream")
            .timeout(timeout)
            .send()
            .map_err(|e| DeployError::Download(format!("{}: {e}", asset.name)))?;

        if !response.status().is_success() {
            return Err(DeployError::Download(format!(
                "{}: HTTP {}",
                asset.name,
                response.status()
            )));
        }

        Ok(Box::new(response))
    }
}

/// Whether an RFC 8288 `Link` header advertises a `rel="next"` page.
fn link_has_next(header: &str) -> bool {
    header.split(',').any(|link| {
        link.split(';').skip(1).any(|param| {
            let param = param.trim();
            match param.split_once('=') {
                Some((key, value)) => {
                    key.trim().eq_ignore_ascii_case("rel")
                        && value
                            .trim()
                            .trim_matches('"')
                            .split_whitespace()
                            .any(|rel| rel.eq_ignore_ascii_case("next"))
                }
                None => false,
            }
        })
    })
}
