use crate::agents::layout::DeployLayout;
use crate::error::Result;
use crate::repository::ReleaseSelector;
use std::fmt;
use tracing::debug;

/// Result of comparing the deployed asset with the newest published one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessStatus {
    UpToDate,
    OutOfDate { deployed: String, latest: String },
    NoAssetRecorded,
    NotDeployed,
}

impl FreshnessStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            FreshnessStatus::UpToDate => 0,
            FreshnessStatus::OutOfDate { .. } => 1,
            FreshnessStatus::NoAssetRecorded => 2,
            FreshnessStatus::NotDeployed => 3,
        }
    }
}

impl fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessStatus::UpToDate => f.write_str("Assets up to date"),
            FreshnessStatus::OutOfDate { .. } => f.write_str("Assets out of date"),
            FreshnessStatus::NoAssetRecorded => f.write_str("No assets currently deployed"),
            FreshnessStatus::NotDeployed => f.write_str("Website not deployed"),
        }
    }
}

/// Read-only check of whether the live release is the latest one.
pub struct FreshnessChecker<'a> {
    selector: &'a ReleaseSelector,
}

impl<'a> FreshnessChecker<'a> {
    pub fn new(selector: &'a ReleaseSelector) -> Self {
        Self { selector }
    }

    /// Local state is inspected first; the hosting service is only queried
    /// once a deployed asset ID is known.
    pub fn check(&self, repo: &str, layout: &DeployLayout) -> Result<FreshnessStatus> {
        if !layout.is_deployed() {
            return Ok(FreshnessStatus::NotDeployed);
        }

        let Some(deployed) = layout.deployed_asset_id()? else {
            return Ok(FreshnessStatus::NoAssetRecorded);
        };

        let latest = self.selector.latest_asset(repo)?;
        debug!(%deployed, latest = %latest.id, "comparing asset ids");

        if latest.id.as_str() == deployed {
            Ok(FreshnessStatus::UpToDate)
        } else {
            Ok(FreshnessStatus::OutOfDate {
                deployed,
                latest: latest.id.to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::agents::layout::ASSET_ID_FILE;
    use crate::error::DeployError;
    use crate::repository::selector::tests::{FakeReleaseSource, asset, release};
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn selector_with_latest(id: &str) -> (ReleaseSelector, Arc<FakeReleaseSource>) {
        let source = Arc::new(FakeReleaseSource::new(vec![vec![release(
            false,
            false,
            vec![asset(id, "website-v1.0.0.tar.gz")],
        )]]));
        (ReleaseSelector::new(source.clone()), source)
    }

    fn deploy_with_marker(root: &Path, marker: Option<&str>) {
        let release = root.join("releases/website-v1.0.0");
        fs::create_dir_all(&release).unwrap();
        if let Some(contents) = marker {
            fs::write(release.join(ASSET_ID_FILE), contents).unwrap();
        }
        std::os::unix::fs::symlink("releases/website-v1.0.0", root.join("current")).unwrap();
    }

    #[test]
    fn missing_deploy_path_is_not_deployed() {
        let dir = tempdir().unwrap();
        let (selector, source) = selector_with_latest("1");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path().join("missing")))
            .unwrap();

        assert_eq!(status, FreshnessStatus::NotDeployed);
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_marker_is_no_asset_recorded() {
        let dir = tempdir().unwrap();
        deploy_with_marker(dir.path(), None);
        let (selector, source) = selector_with_latest("1");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap();

        assert_eq!(status, FreshnessStatus::NoAssetRecorded);
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn plain_file_at_current_is_no_asset_recorded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("current"), "not a release").unwrap();
        let (selector, source) = selector_with_latest("1");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap();

        assert_eq!(status, FreshnessStatus::NoAssetRecorded);
        assert_eq!(status.to_string(), "No assets currently deployed");
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn blank_marker_is_no_asset_recorded() {
        let dir = tempdir().unwrap();
        deploy_with_marker(dir.path(), Some("  \n"));
        let (selector, _) = selector_with_latest("1");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap();
        assert_eq!(status, FreshnessStatus::NoAssetRecorded);
    }

    #[test]
    fn matching_id_is_up_to_date() {
        let dir = tempdir().unwrap();
        deploy_with_marker(dir.path(), Some("42\n"));
        let (selector, _) = selector_with_latest("42");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap();
        assert_eq!(status, FreshnessStatus::UpToDate);
        assert_eq!(status.exit_code(), 0);
    }

    #[test]
    fn different_id_is_out_of_date() {
        let dir = tempdir().unwrap();
        deploy_with_marker(dir.path(), Some("41"));
        let (selector, _) = selector_with_latest("42");

        let status = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap();
        assert_eq!(
            status,
            FreshnessStatus::OutOfDate {
                deployed: "41".into(),
                latest: "42".into()
            }
        );
        assert_eq!(status.to_string(), "Assets out of date");
    }

    #[test]
    fn no_eligible_release_is_an_error() {
        let dir = tempdir().unwrap();
        deploy_with_marker(dir.path(), Some("41"));
        let selector = ReleaseSelector::new(Arc::new(FakeReleaseSource::new(Vec::new())));

        let err = FreshnessChecker::new(&selector)
            .check("o/r", &DeployLayout::new(dir.path()))
            .unwrap_err();
        assert!(matches!(err, DeployError::NoEligibleRelease(_)));
    }

    #[test]
    fn statuses_have_distinct_exit_codes() {
        let statuses = [
            FreshnessStatus::UpToDate,
            FreshnessStatus::OutOfDate {
                deployed: "a".into(),
                latest: "b".into(),
            },
            FreshnessStatus::NoAssetRecorded,
            FreshnessStatus::NotDeployed,
        ];
        let codes: HashSet<_> = statuses.iter().map(FreshnessStatus::exit_code).collect();
        assert_eq!(codes.len(), statuses.len());
    }
}
