pub mod version;

pub use version::{SemanticVersion, VersionComparator};

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Opaque asset identifier, stable across queries.
///
/// The hosting API reports it as a number; string IDs are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId(String);

impl AssetId {
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => AssetId(n.to_string()),
            RawId::Text(s) => AssetId(s),
        })
    }
}

/// A downloadable file attached to a release. Does not contain all fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub id: AssetId,
    pub name: String,
    pub url: String,
}

/// A published release. Does not contain all fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Not a draft, not a prerelease, and carries at least one asset
    pub fn is_eligible(&self) -> bool {
        !self.draft && !self.prerelease && !self.assets.is_empty()
    }

    /// The asset a deployment uses; by convention the first one
    pub fn primary_asset(&self) -> Option<&ReleaseAsset> {
        self.assets.first()
    }
}
