use crate::error::{DeployError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // `\d` would also accept non-ASCII digits, which `u64::from_str` rejects.
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("version pattern is valid")
});

/// A `major.minor.patch` release version.
///
/// Ordering is numeric per component, so `1.10.0` sorts above `1.2.0`.
/// Pre-release and build suffixes are not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || DeployError::InvalidVersion(version.to_string());

        let captures = VERSION_RE.captures(version).ok_or_else(invalid)?;
        let component = |idx: usize| -> Result<u64> {
            captures[idx].parse::<u64>().map_err(|_| invalid())
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }
}

impl FromStr for SemanticVersion {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Numeric comparison: major first, then minor, then patch
    pub fn compare(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
        a.cmp(b)
    }

    /// Ordering for `sort_by` that puts the newest version first
    pub fn newest_first(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
        Self::compare(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u64, minor: u64, patch: u64) -> SemanticVersion {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(
            SemanticVersion::parse("1.2.3").unwrap(),
            v(1, 2, 3)
        );
        assert_eq!(
            SemanticVersion::parse("0.0.0").unwrap(),
            v(0, 0, 0)
        );
    }

    #[test]
    fn leading_zeros_are_parsed_as_integers() {
        assert_eq!(
            SemanticVersion::parse("01.2.03").unwrap(),
            v(1, 2, 3)
        );
    }

    #[test]
    fn rejects_malformed_versions() {
        for input in [
            "",
            "1",
            "1.2",
            "1.2.3.4",
            "v1.2.3",
            "1.2.3-alpha",
            "1.2.3+build",
            " 1.2.3",
            "1.2.3\n",
            "1.a.3",
            "1..3",
            "-1.2.3",
            "١.2.3",
            "99999999999999999999999.0.0",
        ] {
            let err = SemanticVersion::parse(input).unwrap_err();
            assert!(
                matches!(err, DeployError::InvalidVersion(ref v) if v == input),
                "expected InvalidVersion for {input:?}"
            );
        }
    }

    fn compare(a: &str, b: &str) -> Ordering {
        VersionComparator::compare(
            &SemanticVersion::parse(a).unwrap(),
            &SemanticVersion::parse(b).unwrap(),
        )
    }

    #[test]
    fn comparison_is_numeric_not_lexicographic() {
        assert_eq!(compare("1.10.0", "1.2.0"), Ordering::Greater);
        assert_eq!(compare("2.0.0", "10.0.0"), Ordering::Less);
        assert_eq!(compare("1.0.9", "1.0.10"), Ordering::Less);
        assert_eq!(compare("3.1.4", "03.1.4"), Ordering::Equal);
    }

    #[test]
    fn comparison_orders_major_before_minor_before_patch() {
        assert_eq!(compare("2.0.0", "1.99.99"), Ordering::Greater);
        assert_eq!(compare("1.2.0", "1.1.99"), Ordering::Greater);
        assert_eq!(compare("1.1.2", "1.1.1"), Ordering::Greater);
    }

    #[test]
    fn ordering_is_antisymmetric_and_transitive() {
        let samples: Vec<SemanticVersion> = ["0.0.1", "0.1.0", "1.0.0", "1.2.0", "1.10.0", "2.0.0"]
            .iter()
            .map(|v| SemanticVersion::parse(v).unwrap())
            .collect();

        for a in &samples {
            for b in &samples {
                assert_eq!(
                    VersionComparator::compare(a, b),
                    VersionComparator::compare(b, a).reverse()
                );
                for c in &samples {
                    if a < b && b < c {
                        assert!(a < c);
                    }
                }
            }
        }
    }

    #[test]
    fn sorts_newest_first() {
        let mut versions = vec![
            v(1, 0, 0),
            v(1, 10, 0),
            v(1, 2, 0),
        ];
        versions.sort_by(VersionComparator::newest_first);
        assert_eq!(
            versions,
            vec![
                v(1, 10, 0),
                v(1, 2, 0),
                v(1, 0, 0),
            ]
        );
    }

    #[test]
    fn display_round_trips() {
        let version = v(4, 5, 6);
        assert_eq!(version.to_string().parse::<SemanticVersion>().unwrap(), version);
    }
}
