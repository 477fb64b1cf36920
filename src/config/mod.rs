//! Static release configuration.
//!
//! Loaded from a JSON file (default `.release-pilot.json` at the repository
//! root). Every key is optional:
//!
//! ```json
//! {
//!   "preRelease": "cargo test",
//!   "postRelease": { "template": "./notify.sh {version}" },
//!   "changelogCommand": "git log --oneline",
//!   "releaseBranch": "main",
//!   "remote": "origin",
//!   "tagPrefix": "v"
//! }
//! ```

mod hook;

pub use hook::HookCommand;

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up at the repository root when no path is given
pub const DEFAULT_CONFIG_FILE: &str = ".release-pilot.json";

/// Branch releases are cut from when nothing else is configured
pub const DEFAULT_RELEASE_BRANCH: &str = "master";

/// Remote pushed to when nothing else is configured
pub const DEFAULT_REMOTE: &str = "origin";

/// Prefix prepended to versions to form tag names
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// User-supplied hooks and repository conventions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StaticConfig {
    /// Command run before the version bump
    #[serde(default)]
    pub pre_release: Option<HookCommand>,
    /// Command run after the remote release is created
    #[serde(default)]
    pub post_release: Option<HookCommand>,
    /// Replacement for the default merge-commit changelog query
    #[serde(default, alias = "changelogCmd")]
    pub changelog_command: Option<HookCommand>,
    /// Branch releases must be cut from
    #[serde(default)]
    pub release_branch: Option<String>,
    /// Remote to sync with and push to
    #[serde(default)]
    pub remote: Option<String>,
    /// Tag name prefix
    #[serde(default)]
    pub tag_prefix: Option<String>,
}

impl StaticConfig {
    /// Parse configuration from a JSON string
    pub fn from_json(path: &Path, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Otherwise the default file
    /// in `repo_root` is used when present, and defaults apply when it is not.
    pub fn load(repo_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                path.to_path_buf()
            }
            None => {
                let candidate = repo_root.join(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    log::debug!("no {} found, using defaults", candidate.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Self::from_json(&path, &json)
    }

    /// Configured release branch or the default
    pub fn release_branch(&self) -> &str {
        self.release_branch
            .as_deref()
            .unwrap_or(DEFAULT_RELEASE_BRANCH)
    }

    /// Configured remote or the default
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    /// Configured tag prefix or the default
    pub fn tag_prefix(&self) -> &str {
        self.tag_prefix.as_deref().unwrap_or(DEFAULT_TAG_PREFIX)
    }

    /// Tag name for `version`
    pub fn tag_for(&self, version: &semver::Version) -> String {
        format!("{}{}", self.tag_prefix(), version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = StaticConfig::from_json(Path::new("x.json"), "{}").unwrap();
        assert!(config.pre_release.is_none());
        assert_eq!(config.release_branch(), "master");
        assert_eq!(config.remote(), "origin");
        assert_eq!(config.tag_for(&semver::Version::new(1, 3, 0)), "v1.3.0");
    }

    #[test]
    fn test_parses_literal_and_template_hooks() {
        let config = StaticConfig::from_json(
            Path::new("x.json"),
            r#"{
                "preRelease": "cargo test",
                "postRelease": { "template": "./notify.sh {version}" },
                "changelogCmd": "git log --oneline",
                "releaseBranch": "main",
                "tagPrefix": ""
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.pre_release.as_ref().unwrap().resolve("1.3.0"),
            "cargo test"
        );
        assert_eq!(
            config.post_release.as_ref().unwrap().resolve("1.3.0"),
            "./notify.sh 1.3.0"
        );
        assert_eq!(
            config.changelog_command.as_ref().unwrap().resolve("v1.2.3"),
            "git log --oneline"
        );
        assert_eq!(config.release_branch(), "main");
        assert_eq!(config.tag_for(&semver::Version::new(2, 0, 0)), "2.0.0");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = StaticConfig::from_json(Path::new("x.json"), r#"{"preRelase": "typo"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("x.json"));
    }

    #[test]
    fn test_load_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StaticConfig::load(dir.path(), None).unwrap();
        assert!(config.changelog_command.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(StaticConfig::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_load_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"remote": "upstream"}"#,
        )
        .unwrap();
        let config = StaticConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.remote(), "upstream");
    }
}
