use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Can't parse version: {0}")]
    InvalidVersion(String),

    #[error("Unable to find matching release in {0}")]
    NoEligibleRelease(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Release listing for {repo} did not end after {pages} pages")]
    UnboundedListing { repo: String, pages: u32 },

    #[error("Asset name '{0}' is not of the form <name>.tar.gz")]
    Naming(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed release listing: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    /// Process exit code for this failure, loosely following sysexits.h.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Config(_) => 78,
            DeployError::InvalidVersion(_)
            | DeployError::Naming(_)
            | DeployError::Extraction(_)
            | DeployError::Json(_) => 65,
            DeployError::NoEligibleRelease(_) => 66,
            DeployError::Network(_)
            | DeployError::Download(_)
            | DeployError::UnboundedListing { .. } => 69,
            DeployError::Io(_) => 74,
        }
    }
}

impl From<reqwest::Error> for DeployError {
    fn from(err: reqwest::Error) -> Self {
        DeployError::Network(err)
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let config = DeployError::Config("x".into()).exit_code();
        let version = DeployError::InvalidVersion("x".into()).exit_code();
        let release = DeployError::NoEligibleRelease("x".into()).exit_code();
        let download = DeployError::Download("x".into()).exit_code();
        let io = DeployError::Io(std::io::Error::other("x")).exit_code();

        let codes = [config, version, release, download, io];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
            assert_ne!(*a, 0);
        }
    }

    #[test]
    fn naming_error_mentions_expected_shape() {
        let err = DeployError::Naming("website".into());
        assert!(err.to_string().contains("<name>.tar.gz"));
    }
}
