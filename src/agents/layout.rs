use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const ASSET_ID_FILE: &str = ".asset_id";
pub const CURRENT_PATH: &str = "current";
pub const RELEASES_PATH: &str = "releases";
pub const RELEASE_PREFIX: &str = "website-v";

/// On-disk layout of a deployment rooted at the deploy path:
///
/// ```text
/// <deploy_path>/
///   releases/website-v<X.Y.Z>/   extracted release + .asset_id marker
///   current -> releases/website-v<X.Y.Z>
/// ```
#[derive(Debug, Clone)]
pub struct DeployLayout {
    root: PathBuf,
}

impl DeployLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.root.join(RELEASES_PATH)
    }

    pub fn current_link(&self) -> PathBuf {
        self.root.join(CURRENT_PATH)
    }

    pub fn is_deployed(&self) -> bool {
        self.root.is_dir()
    }

    /// Asset ID recorded for the live release, if any.
    ///
    /// A missing marker, a dangling or non-directory `current` and a blank
    /// marker all read as `None`.
    pub fn deployed_asset_id(&self) -> Result<Option<String>> {
        read_asset_id(&self.current_link())
    }

    /// Resolved target of `current`, if it is a symlink.
    pub fn current_target(&self) -> Option<PathBuf> {
        let link = self.current_link();
        let target = fs::read_link(&link).ok()?;
        let absolute = if target.is_absolute() {
            target
        } else {
            self.root.join(target)
        };
        Some(absolute.canonicalize().unwrap_or(absolute))
    }
}

/// Reads the `.asset_id` marker of a release directory.
pub fn read_asset_id(release_dir: &Path) -> Result<Option<String>> {
    match fs::read_to_string(release_dir.join(ASSET_ID_FILE)) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)),
        // `current` left behind as a plain file has no marker either.
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
