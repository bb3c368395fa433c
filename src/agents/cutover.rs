use crate::error::{DeployError, Result};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repoints the `current` symlink at a release directory.
pub struct CutoverManager {
    current_link: PathBuf,
}

impl CutoverManager {
    pub fn new<P: AsRef<Path>>(current_link: P) -> Self {
        Self {
            current_link: current_link.as_ref().to_path_buf(),
        }
    }

    /// Point `current` at `release_dir`.
    ///
    /// The link target is stored relative to the link's own directory when the
    /// release lives beneath it, so the deploy directory can be moved as a whole.
    /// Anything at `current` other than a symlink is left alone and reported.
    pub fn cutover(&self, release_dir: &Path) -> Result<()> {
        if !release_dir.is_dir() {
            return Err(DeployError::Io(Error::new(
                ErrorKind::NotFound,
                format!("Release directory '{}' does not exist", release_dir.display()),
            )));
        }

        if fs::symlink_metadata(&self.current_link).is_ok_and(|meta| !meta.file_type().is_symlink()) {
            return Err(DeployError::Io(Error::new(
                ErrorKind::AlreadyExists,
                format!(
                    "'{}' exists and is not a symlink; refusing to replace it",
                    self.current_link.display()
                ),
            )));
        }

        let target = self.link_target(release_dir);
        debug!(link = %self.current_link.display(), target = %target.display(), "switching current");
        replace_symlink(&target, &self.current_link)?;

        Ok(())
    }

    fn link_target(&self, release_dir: &Path) -> PathBuf {
        self.current_link
            .parent()
            .and_then(|base| release_dir.strip_prefix(base).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| release_dir.to_path_buf())
    }
}

/// Create a fresh symlink beside `link` and rename it into place, which
/// replaces the old link in one step.
#[cfg(unix)]
fn replace_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    let file_name = link
        .file_name()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "symlink path has no file name"))?;
    let staging = link.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    if fs::symlink_metadata(&staging).is_ok() {
        fs::remove_file(&staging)?;
    }

    std::os::unix::fs::symlink(target, &staging)?;
    if let Err(e) = fs::rename(&staging, link) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}

/// Unlink then link; readers may briefly see no `current`.
#[cfg(windows)]
fn replace_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_dir(link).or_else(|_| fs::remove_file(link))?;
    }
    std::os::windows::fs::symlink_dir(target, link)
}
