use crate::agents::{
    ArtifactInstaller, CleanupOutcome, CleanupPlan, CutoverManager, DeployLayout,
    FreshnessChecker, FreshnessStatus, RetentionManager,
};
use crate::config::{DeployConfig, validate_repo};
use crate::error::Result;
use crate::repository::{ReleaseSelector, RepositoryFactory};
use crate::utils::PathValidator;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary of a completed `update`.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub release_name: String,
    pub release_dir: PathBuf,
    pub cleanup: CleanupOutcome,
}

/// Execute the check workflow (read-only)
pub fn execute_check<P: AsRef<Path>>(
    repo: &str,
    deploy_path: P,
    config: &DeployConfig,
) -> Result<FreshnessStatus> {
    let repo = validate_repo(repo)?;
    let deploy_path = PathValidator::validate_deploy_path(deploy_path)?;

    let (source, _) = RepositoryFactory::create_github(config)?;
    let selector = ReleaseSelector::new(source);

    let status = FreshnessChecker::new(&selector).check(repo, &DeployLayout::new(&deploy_path))?;
    print_status(&status);

    Ok(status)
}

fn print_status(status: &FreshnessStatus) {
    match status {
        FreshnessStatus::UpToDate => println!("{}", status.to_string().green()),
        FreshnessStatus::OutOfDate { deployed, latest } => {
            eprintln!("{}", status.to_string().yellow());
            info!(%deployed, %latest, "newer release available");
        }
        FreshnessStatus::NoAssetRecorded | FreshnessStatus::NotDeployed => {
            eprintln!("{}", status.to_string().yellow())
        }
    }
}

/// Execute the update workflow: select, install, cut over, prune
pub fn execute_update<P: AsRef<Path>>(
    repo: &str,
    deploy_path: P,
    config: &DeployConfig,
) -> Result<()> {
    let repo = validate_repo(repo)?;
    let deploy_path = PathValidator::validate_deploy_path(deploy_path)?;
    fs::create_dir_all(&deploy_path)?;
    let layout = DeployLayout::new(deploy_path.canonicalize()?);

    let (source, fetcher) = RepositoryFactory::create_github(config)?;
    let selector = ReleaseSelector::new(source);
    let installer = ArtifactInstaller::new(fetcher, config.download_timeout);

    let report = run_update(&selector, &installer, &layout, repo, config.keep)?;
    print_update_report(&report);

    Ok(())
}

pub(crate) fn run_update(
    selector: &ReleaseSelector,
    installer: &ArtifactInstaller,
    layout: &DeployLayout,
    repo: &str,
    keep: usize,
) -> Result<UpdateReport> {
    let asset = selector.latest_asset(repo)?;
    info!(asset = %asset.name, id = %asset.id, "latest release asset");

    let release_dir = installer.install(&asset, &layout.releases_dir())?;
    CutoverManager::new(layout.current_link()).cutover(&release_dir)?;

    let release_name = release_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", format!("Deployed {release_name}").green());

    let retention = RetentionManager::new(layout.releases_dir(), keep);
    let plan = retention.plan()?;
    warn_if_removing_current(layout, &plan);
    let cleanup = retention.apply(&plan)?;

    Ok(UpdateReport {
        release_name,
        release_dir,
        cleanup,
    })
}

fn print_update_report(report: &UpdateReport) {
    info!(dir = %report.release_dir.display(), release = %report.release_name, "update complete");
    print_cleanup_outcome(&report.cleanup);
}

fn print_cleanup_outcome(outcome: &CleanupOutcome) {
    match outcome {
        CleanupOutcome::TooFewReleases { .. } => println!(
            "{}",
            "Did not run clean up (too few historic releases)".dimmed()
        ),
        CleanupOutcome::Removed(0) => println!("{}", "No clean up required".dimmed()),
        CleanupOutcome::Removed(n) => println!("Cleaned up {n} historic releases"),
    }
}

/// Execute the cleanup workflow on its own, optionally as a dry run
pub fn execute_cleanup<P: AsRef<Path>>(deploy_path: P, keep: usize, dry_run: bool) -> Result<()> {
    let deploy_path = PathValidator::validate_deploy_path(deploy_path)?;
    let layout = DeployLayout::new(&deploy_path);

    let retention = RetentionManager::new(layout.releases_dir(), keep);
    let plan = retention.plan()?;
    warn_if_removing_current(&layout, &plan);

    if dry_run {
        print_cleanup_plan(&plan);
        return Ok(());
    }

    let outcome = retention.apply(&plan)?;
    print_cleanup_outcome(&outcome);
    Ok(())
}

fn print_cleanup_plan(plan: &CleanupPlan) {
    match plan {
        CleanupPlan::TooFewReleases { found } => println!(
            "{}",
            format!("Nothing to clean up ({found} releases installed)").dimmed()
        ),
        CleanupPlan::Prune { retained, remove } => {
            for release in retained {
                println!("  {} {}", "keep".green(), release.name);
            }
            for release in remove {
                println!("  {} {}", "remove".red(), release.name);
            }
            println!("Would clean up {} historic releases", remove.len());
        }
    }
}

/// Retention never consults `current`; flag the case where it is about to
/// delete the live release so the operator sees why the site went away.
fn warn_if_removing_current(layout: &DeployLayout, plan: &CleanupPlan) {
    let Some(current) = layout.current_target() else {
        return;
    };

    for release in plan.removals() {
        let candidate = release.path.canonicalize().unwrap_or_else(|_| release.path.clone());
        if candidate == current {
            warn!(
                release = %release.name,
                "cleanup will remove the release that current points to; a newer version directory exists"
            );
        }
    }
}
