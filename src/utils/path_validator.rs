use crate::error::{DeployError, Result};
use std::path::{Component, Path, PathBuf};

const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

/// Provides safe path validation helpers to avoid traversal and host intrusion.
pub struct PathValidator;

impl PathValidator {
    /// Rejects deploy paths inside system directories.
    ///
    /// The path does not need to exist yet; when it does, its canonical form is
    /// checked as well so symlinks can't sneak around the check.
    pub fn validate_deploy_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(DeployError::Config("Deploy path is empty".to_string()));
        }

        Self::reject_system_path(path)?;

        match path.canonicalize() {
            Ok(canonical) => {
                Self::reject_system_path(&canonical)?;
                Ok(canonical)
            }
            Err(_) => Ok(path.to_path_buf()),
        }
    }

    fn reject_system_path(path: &Path) -> Result<()> {
        for forbidden in FORBIDDEN {
            let forbidden_path = Path::new(forbidden);

            if path.starts_with(forbidden_path) {
                return Err(DeployError::Config(format!(
                    "Deploying into system directory '{}' is not allowed",
                    forbidden
                )));
            }

            if let Ok(canonical_forbidden) = forbidden_path.canonicalize() {
                if path.starts_with(&canonical_forbidden) {
                    return Err(DeployError::Config(format!(
                        "Deploying into system directory '{}' is not allowed",
                        forbidden
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolves an archive entry path beneath `base_dir`, rejecting absolute
    /// paths and any `..` component.
    ///
    /// Purely lexical: the target usually doesn't exist yet.
    pub fn resolve_entry_path(entry: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let entry = entry.as_ref();
        let mut resolved = base_dir.as_ref().to_path_buf();

        for component in entry.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DeployError::Extraction(format!(
                        "Archive entry '{}' escapes the release directory",
                        entry.display()
                    )));
                }
            }
        }

        Ok(resolved)
    }
}
