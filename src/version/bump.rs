//! Semantic version increment arithmetic.

use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Which semantic-version component a release increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum VersionBump {
    /// Bump patch version (0.1.0 -> 0.1.1)
    Patch,
    /// Bump minor version (0.1.0 -> 0.2.0)
    Minor,
    /// Bump major version (0.1.0 -> 1.0.0)
    Major,
}

impl VersionBump {
    /// Apply this bump to `version`.
    ///
    /// Pre-release and build metadata are always dropped.
    pub fn apply(self, version: &Version) -> Version {
        let (major, minor, patch) = match self {
            VersionBump::Major => (version.major + 1, 0, 0),
            VersionBump::Minor => (version.major, version.minor + 1, 0),
            VersionBump::Patch => (version.major, version.minor, version.patch + 1),
        };
        Version {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
            build: BuildMetadata::EMPTY,
        }
    }

    /// Lowercase name as typed on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a version the way tags are usually written.
///
/// Accepts surrounding whitespace and a single leading `v`, `V` or `=`.
pub fn parse_lenient(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let unprefixed = trimmed
        .strip_prefix(['v', 'V', '='])
        .unwrap_or(trimmed);
    Version::parse(unprefixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_minor_resets_patch() {
        assert_eq!(VersionBump::Minor.apply(&v("1.2.3")), v("1.3.0"));
    }

    #[test]
    fn test_major_from_zero_series() {
        assert_eq!(VersionBump::Major.apply(&v("0.9.9")), v("1.0.0"));
    }

    #[test]
    fn test_patch_drops_prerelease_and_build() {
        assert_eq!(VersionBump::Patch.apply(&v("1.2.3-rc.1+build.5")), v("1.2.4"));
    }

    #[test]
    fn test_bump_is_strictly_greater() {
        let samples = ["0.0.0", "0.1.0", "1.2.3", "1.2.3-alpha", "9.99.999", "2.0.0+meta"];
        for sample in samples {
            let current = v(sample);
            for bump in [VersionBump::Patch, VersionBump::Minor, VersionBump::Major] {
                let next = bump.apply(&current);
                assert!(next > current, "{bump} of {current} gave {next}");
                assert_eq!(next, bump.apply(&current));
                assert!(Version::parse(&next.to_string()).is_ok());
            }
        }
    }

    #[test]
    fn test_parse_lenient_accepts_tag_prefix() {
        assert_eq!(parse_lenient("v1.2.3\n").unwrap(), v("1.2.3"));
        assert_eq!(parse_lenient("=0.1.0").unwrap(), v("0.1.0"));
        assert!(parse_lenient("release-1").is_err());
        assert!(parse_lenient("vv1.0.0").is_err());
    }
}
