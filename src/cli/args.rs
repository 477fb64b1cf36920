//! Command line argument parsing and validation.

use crate::error::{CliError, Result};
use crate::version::VersionBump;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fallback environment variable for the GitHub token
pub const GITHUB_TOKEN_FALLBACK_ENV: &str = "GITHUB_TOKEN";

/// Cut a tagged, pushed and published release of a git repository
#[derive(Parser, Debug)]
#[command(
    name = "release_pilot",
    version,
    about = "Cut a tagged, pushed and published release of a git repository",
    long_about = "Check the repository, compute the next semantic version, confirm, \
then bump, tag, push and create the remote release.

Usage:
  release_pilot release minor
  release_pilot --dry-run release patch
  release_pilot changelog --since v1.2.0
  release_pilot init"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Describe every side effect instead of performing it
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Release even with uncommitted changes to tracked files
    #[arg(short = 'i', long, alias = "ignore-not-staged", global = true)]
    pub ignore_unclean: bool,

    /// Release from whatever branch HEAD is on
    #[arg(long, global = true)]
    pub ignore_branch: bool,

    /// Skip pulling the release branch and fetching tags
    #[arg(long, global = true)]
    pub no_sync: bool,

    /// Release branch (overrides `releaseBranch`)
    #[arg(long, value_name = "NAME", global = true)]
    pub branch: Option<String>,

    /// Remote to sync with and push to (overrides `remote`)
    #[arg(long, value_name = "NAME", global = true)]
    pub remote: Option<String>,

    /// Configuration file (default: <repo>/.release-pilot.json)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Repository to release
    #[arg(long, value_name = "PATH", default_value = ".", global = true)]
    pub repo: PathBuf,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Token for the GitHub releases API (falls back to GITHUB_TOKEN)
    #[arg(
        long,
        value_name = "TOKEN",
        env = "GH_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub github_token: Option<String>,

    /// Create the GitHub release as a draft
    #[arg(long, global = true)]
    pub draft: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Release the next patch, minor or major version
    #[command(visible_alias = "add", alias = "create")]
    Release {
        /// Which part of the version to increment
        #[arg(value_enum)]
        bump: VersionBump,
    },

    /// Print the changelog of merges since the current version
    Changelog {
        /// Start from this version or tag instead of the latest tag
        #[arg(long, value_name = "VERSION")]
        since: Option<String>,
    },

    /// Tag and publish the version already in Cargo.toml as the first release
    Init,
}

impl Command {
    /// Name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release { .. } => "release",
            Command::Changelog { .. } => "changelog",
            Command::Init => "init",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(CliError::InvalidArguments {
                reason: reason.to_string(),
            }
            .into())
        };

        if self.branch.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return invalid("--branch cannot be empty");
        }
        if self.remote.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return invalid("--remote cannot be empty");
        }
        if let Command::Changelog { since: Some(since) } = &self.command
            && since.trim().is_empty()
        {
            return invalid("--since cannot be empty");
        }
        Ok(())
    }

    /// Token from `--github-token`/`GH_TOKEN`, else `GITHUB_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var(GITHUB_TOKEN_FALLBACK_ENV).ok())
            .filter(|token| !token.trim().is_empty())
    }
}
