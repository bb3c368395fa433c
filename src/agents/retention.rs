use crate::agents::layout::RELEASE_PREFIX;
use crate::error::{DeployError, Result};
use crate::release::{SemanticVersion, VersionComparator};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A `website-v<X.Y.Z>` directory under `releases/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRelease {
    pub name: String,
    pub version: SemanticVersion,
    pub path: PathBuf,
}

/// What a cleanup pass would do, computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupPlan {
    /// Not more than `keep` releases are installed; nothing is even sorted.
    TooFewReleases { found: usize },
    /// Releases sorted newest first and split at `keep`.
    Prune {
        retained: Vec<InstalledRelease>,
        remove: Vec<InstalledRelease>,
    },
}

impl CleanupPlan {
    pub fn removals(&self) -> &[InstalledRelease] {
        match self {
            CleanupPlan::TooFewReleases { .. } => &[],
            CleanupPlan::Prune { remove, .. } => remove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    TooFewReleases { found: usize },
    Removed(usize),
}

/// Keeps the newest `keep` release directories by version and deletes the rest.
///
/// Does not look at `current`: the caller must make sure the live release is
/// among the newest `keep`.
pub struct RetentionManager {
    releases_dir: PathBuf,
    keep: usize,
}

impl RetentionManager {
    pub fn new<P: AsRef<Path>>(releases_dir: P, keep: usize) -> Self {
        Self {
            releases_dir: releases_dir.as_ref().to_path_buf(),
            keep,
        }
    }

    /// Directories under `releases/` carrying the release prefix, unsorted.
    pub fn list_release_dirs(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.releases_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && entry.file_name().to_string_lossy().starts_with(RELEASE_PREFIX) {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }

    /// Decide which releases to drop. Any unparseable directory name fails
    /// the whole plan rather than being skipped.
    pub fn plan(&self) -> Result<CleanupPlan> {
        let dirs = self.list_release_dirs()?;

        if dirs.len() <= self.keep {
            return Ok(CleanupPlan::TooFewReleases { found: dirs.len() });
        }

        let mut releases = dirs
            .into_iter()
            .map(parse_release_dir)
            .collect::<Result<Vec<_>>>()?;

        releases.sort_by(|a, b| VersionComparator::newest_first(&a.version, &b.version));

        let remove = releases.split_off(self.keep);
        Ok(CleanupPlan::Prune {
            retained: releases,
            remove,
        })
    }

    /// Delete everything the plan marks for removal.
    pub fn apply(&self, plan: &CleanupPlan) -> Result<CleanupOutcome> {
        match plan {
            CleanupPlan::TooFewReleases { found } => {
                Ok(CleanupOutcome::TooFewReleases { found: *found })
            }
            CleanupPlan::Prune { remove, .. } => {
                for release in remove {
                    debug!(dir = %release.path.display(), "removing historic release");
                    fs::remove_dir_all(&release.path)?;
                }
                Ok(CleanupOutcome::Removed(remove.len()))
            }
        }
    }

    pub fn cleanup(&self) -> Result<CleanupOutcome> {
        let plan = self.plan()?;
        self.apply(&plan)
    }
}

fn parse_release_dir(path: PathBuf) -> Result<InstalledRelease> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let version = name
        .strip_prefix(RELEASE_PREFIX)
        .ok_or_else(|| DeployError::InvalidVersion(name.clone()))
        .and_then(SemanticVersion::parse)?;

    Ok(InstalledRelease {
        name,
        version,
        path,
    })
}
