//! Error types for release_pilot operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release_pilot operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_pilot operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Repository preconditions not met
    #[error("Guard violation: {0}")]
    Guard(#[from] GuardError),

    /// Version resolution errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Operator declined or interrupted the confirmation
    #[error("Release aborted: {reason}")]
    UserAborted {
        /// What the operator answered, or why the prompt failed
        reason: String,
    },

    /// Changelog query errors
    #[error("Changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    /// Pre/post release hook errors
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    /// Bump, push or remote release errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Owner/project could not be derived from the remote URL
    #[error("Could not resolve repository identity from remote '{remote}': {reason}")]
    RemoteIdentityUnresolved {
        /// Remote name or URL that was inspected
        remote: String,
        /// Reason for the error
        reason: String,
    },

    /// Git command errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Static configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Release context discipline errors
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository guard errors
#[derive(Error, Debug)]
pub enum GuardError {
    /// HEAD is not the release branch
    #[error("You must be on the '{expected}' branch to create a release (currently on '{actual}')")]
    NotOnReleaseBranch {
        /// Configured release branch
        expected: String,
        /// Branch HEAD points to
        actual: String,
    },

    /// Tracked files are modified or staged
    #[error("You have uncommitted changes, clean your state before releasing: {}", .paths.join(", "))]
    UncommittedChanges {
        /// Paths reported by git status
        paths: Vec<String>,
    },
}

/// Version resolution errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Latest tag is not a semantic version
    #[error("Current version is not a semver version: '{version}' ({reason})")]
    InvalidCurrentVersion {
        /// Raw version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Computed next version failed validation
    #[error("Next version is not a valid release version: '{version}' ({reason})")]
    InvalidNextVersion {
        /// Computed version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Operator typed an invalid starting version
    #[error("Invalid semver format for starting version '{input}': {reason}")]
    InvalidBootstrapVersion {
        /// What the operator typed
        input: String,
        /// Reason for the error
        reason: String,
    },

    /// A version field was read before it was resolved
    #[error("{field} has not been resolved yet")]
    Missing {
        /// Context field name
        field: &'static str,
    },

    /// Bumping the manifest would not produce the version being released
    #[error("Cargo.toml is at {manifest}, which bumps to {bumped} instead of {expected}")]
    ManifestMismatch {
        /// Version found in the manifest
        manifest: semver::Version,
        /// What the requested bump yields from the manifest version
        bumped: semver::Version,
        /// Version resolved from the tags
        expected: semver::Version,
    },

    /// Version could not be read from the package manifest
    #[error("Failed to read version from {path}: {reason}")]
    ManifestVersion {
        /// Path to Cargo.toml
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Changelog errors
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// Changelog command failed
    #[error("Changelog generation failed for `{command}`: {reason}")]
    GenerationFailed {
        /// Command that was run
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// Which hook failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Runs before any mutation
    Pre,
    /// Runs after the release is published
    Post,
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStage::Pre => f.write_str("pre-release"),
            HookStage::Post => f.write_str("post-release"),
        }
    }
}

/// Hook errors
#[derive(Error, Debug)]
pub enum HookError {
    /// Hook exited with a non-zero status
    #[error("{stage} hook `{command}` exited with {}: {output}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    Failed {
        /// Pre or post
        stage: HookStage,
        /// Resolved command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured stderr (or stdout when stderr is empty)
        output: String,
    },

    /// Hook process could not be started
    #[error("{stage} hook `{command}` could not be started: {reason}")]
    SpawnFailed {
        /// Pre or post
        stage: HookStage,
        /// Resolved command line
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl HookError {
    /// Stage of the failing hook
    pub fn stage(&self) -> HookStage {
        match self {
            HookError::Failed { stage, .. } | HookError::SpawnFailed { stage, .. } => *stage,
        }
    }
}

/// Publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Version bump tool failed
    #[error("Version bump to '{tag}' failed: {reason}")]
    BumpFailed {
        /// Tag being created
        tag: String,
        /// Reason for the error
        reason: String,
    },

    /// Push of branch or tags failed
    #[error("Git push failed: {reason}")]
    PushFailed {
        /// Reason for the error
        reason: String,
    },

    /// Remote release API call failed
    #[error("Creating remote release '{tag}' failed: {reason}")]
    ReleaseApiFailed {
        /// Release tag
        tag: String,
        /// Reason for the error
        reason: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// git executable is not on PATH
    #[error("git executable not found on PATH: {reason}")]
    NotInstalled {
        /// Reason for the error
        reason: String,
    },

    /// Command could not be spawned
    #[error("Failed to run `{command}`: {reason}")]
    SpawnFailed {
        /// Command line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Command exited with a non-zero status
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Captured stderr
        stderr: String,
    },
}

/// Static configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit config file is missing
    #[error("Configuration file not found: {path}")]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Config file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        /// Path to the file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse configuration {path}: {source}")]
    Parse {
        /// Path to the file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Release API client could not be built
    #[error("Release API client setup failed: {reason}")]
    ApiClient {
        /// Reason for the error
        reason: String,
    },
}

/// Single-writer discipline violations on the release context
#[derive(Error, Debug)]
pub enum ContextError {
    /// A write-once field was written twice
    #[error("{field} was already set by an earlier step")]
    FieldAlreadySet {
        /// Context field name
        field: &'static str,
    },

    /// A field was written before the field it depends on
    #[error("{field} cannot be set before {requires}")]
    OutOfOrder {
        /// Field being written
        field: &'static str,
        /// Field that must be written first
        requires: &'static str,
    },

    /// A field was read before any step wrote it
    #[error("{field} is not available yet")]
    Missing {
        /// Context field name
        field: &'static str,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Guard(GuardError::NotOnReleaseBranch { expected, .. }) => vec![
                format!("Switch to the release branch: git checkout {expected}"),
                "Pass --ignore-branch to release from the current branch".to_string(),
            ],
            ReleaseError::Guard(GuardError::UncommittedChanges { .. }) => vec![
                "Commit pending changes: git commit -am 'message'".to_string(),
                "Stash changes temporarily: git stash".to_string(),
                "Pass --ignore-unclean to release anyway".to_string(),
            ],
            ReleaseError::Version(VersionError::InvalidCurrentVersion { .. }) => vec![
                "Check the latest tag: git describe --abbrev=0 --tags".to_string(),
                "Tag names must be semantic versions, optionally prefixed with 'v'".to_string(),
            ],
            ReleaseError::Publish(PublishError::PushFailed { .. }) => vec![
                "The version bump commit and tag exist locally; push them manually once the remote is reachable".to_string(),
                "Verify git remote URL: git remote -v".to_string(),
            ],
            ReleaseError::Publish(PublishError::ReleaseApiFailed { .. }) => vec![
                "The tag is already pushed; create the release from the web UI".to_string(),
                "Check GH_TOKEN or GITHUB_TOKEN has repository write access".to_string(),
            ],
            ReleaseError::Hook(err) if err.stage() == HookStage::Post => vec![
                "The release is published; rerun the post-release command manually".to_string(),
            ],
            ReleaseError::RemoteIdentityUnresolved { .. } => vec![
                "Verify git remote URL: git remote -v".to_string(),
                "Pass --remote to pick another remote".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// True when the release itself is already published despite the error
    pub fn is_post_release(&self) -> bool {
        matches!(self, ReleaseError::Hook(err) if err.stage() == HookStage::Post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_failure_message_names_stage_and_status() {
        let err = ReleaseError::from(HookError::Failed {
            stage: HookStage::Post,
            command: "./notify.sh".to_string(),
            code: Some(3),
            output: "boom".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Hook error: post-release hook `./notify.sh` exited with status 3: boom"
        );
        assert!(err.is_post_release());
    }

    #[test]
    fn test_pre_hook_is_not_post_release() {
        let err = ReleaseError::from(HookError::SpawnFailed {
            stage: HookStage::Pre,
            command: "missing".to_string(),
            reason: "not found".to_string(),
        });
        assert!(!err.is_post_release());
    }

    #[test]
    fn test_guard_suggestions_mention_branch() {
        let err = ReleaseError::from(GuardError::NotOnReleaseBranch {
            expected: "main".to_string(),
            actual: "feature".to_string(),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("git checkout main"));
    }
}
