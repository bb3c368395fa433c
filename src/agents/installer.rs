use crate::agents::extractor::{Extractor, TarballExtractor};
use crate::agents::layout::ASSET_ID_FILE;
use crate::error::{DeployError, Result};
use crate::release::ReleaseAsset;
use crate::repository::AssetFetcher;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Downloads a release asset and unpacks it into its versioned directory.
pub struct ArtifactInstaller {
    fetcher: Arc<dyn AssetFetcher>,
    extractor: Box<dyn Extractor>,
    download_timeout: Duration,
}

impl ArtifactInstaller {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, download_timeout: Duration) -> Self {
        Self::with_extractor(fetcher, Box::new(TarballExtractor), download_timeout)
    }

    pub fn with_extractor(
        fetcher: Arc<dyn AssetFetcher>,
        extractor: Box<dyn Extractor>,
        download_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            download_timeout,
        }
    }

    /// Install `asset` under `releases_dir`, returning the release directory.
    ///
    /// The `.asset_id` marker is written last; a directory without one was
    /// never fully installed.
    pub fn install(&self, asset: &ReleaseAsset, releases_dir: &Path) -> Result<PathBuf> {
        let name = release_name(&asset.name)?;
        let release_dir = releases_dir.join(name);

        self.prepare_release_dir(&release_dir)?;

        let body = self.fetcher.open_asset(asset, self.download_timeout)?;
        let mut stream = DownloadStream::new(body);

        let progress = download_progress(&asset.name);
        let extracted = {
            let mut reader = progress.wrap_read(&mut stream);
            self.extractor.extract(&mut reader, &release_dir)
        };
        progress.finish_and_clear();

        // The extractor only sees an io::Error; a failure of the body itself
        // is a download problem, not a bad archive.
        if let Some(cause) = stream.failure.take() {
            return Err(DeployError::Download(format!("{}: {cause}", asset.name)));
        }
        let entries = extracted?;

        debug!(entries, dir = %release_dir.display(), "extraction complete");

        fs::write(release_dir.join(ASSET_ID_FILE), format!("{}\n", asset.id))?;
        info!(asset_id = %asset.id, release = name, "release installed");

        Ok(release_dir)
    }

    fn prepare_release_dir(&self, release_dir: &Path) -> Result<()> {
        if !release_dir.exists() {
            fs::create_dir_all(release_dir)?;
            return Ok(());
        }

        if !release_dir.is_dir() {
            return Err(DeployError::Io(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("'{}' exists and is not a directory", release_dir.display()),
            )));
        }

        // Re-extracting over an existing install: drop the marker first so a
        // failure part-way leaves the directory flagged as incomplete.
        match fs::remove_file(release_dir.join(ASSET_ID_FILE)) {
            Ok(()) => warn!(dir = %release_dir.display(), "re-installing over existing release"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(dir = %release_dir.display(), "reusing partially installed release directory")
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }
}

/// Strip the `.tar.gz`-style double extension from an asset filename.
pub fn release_name(filename: &str) -> Result<&str> {
    let naming_error = || DeployError::Naming(filename.to_string());

    let mut parts = filename.rsplitn(3, '.');
    let (_ext, _compression, name) = (
        parts.next().ok_or_else(naming_error)?,
        parts.next().ok_or_else(naming_error)?,
        parts.next().ok_or_else(naming_error)?,
    );

    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return Err(naming_error());
    }

    Ok(name)
}

/// Response body reader that remembers the first transport error it hit.
struct DownloadStream<R> {
    inner: R,
    failure: Option<io::Error>,
}

impl<R: Read> DownloadStream<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            failure: None,
        }
    }
}

impl<R: Read> Read for DownloadStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Err(e) if e.kind() != ErrorKind::Interrupted => {
                if self.failure.is_none() {
                    self.failure = Some(io::Error::new(e.kind(), e.to_string()));
                }
                Err(e)
            }
            other => other,
        }
    }
}

fn download_progress(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner} {msg} {bytes} ({bytes_per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Downloading {name}"));
    pb
}
