//! `changelog` command execution.

use super::helpers::{open_workspace, release_context};
use crate::changelog::ChangelogGenerator;
use crate::cli::{Args, OutputManager};
use crate::context::{CurrentVersion, ReleaseTarget};
use crate::error::{Result, VersionError};
use crate::git::GitRepository;
use crate::prompt::TerminalPrompter;
use crate::version::{VersionOracle, parse_lenient};

/// Print the changelog since `since` (or the latest tag)
pub(super) async fn execute_changelog(
    args: &Args,
    since: Option<&str>,
    output: &OutputManager,
) -> Result<i32> {
    let workspace = open_workspace(args)?;
    let mut ctx = release_context(args, ReleaseTarget::Current, workspace.config.clone());

    if let Some(since) = since.map(str::trim) {
        let version = parse_lenient(since).map_err(|e| VersionError::InvalidCurrentVersion {
            version: since.to_string(),
            reason: e.to_string(),
        })?;
        // A bare version names the tag carrying the configured prefix
        let tag = if since == version.to_string() {
            workspace.config.tag_for(&version)
        } else {
            since.to_string()
        };
        ctx = ctx.with_current_version(CurrentVersion::tagged(version, tag))?;
    }

    let git = GitRepository::new(&workspace.runner);
    let ctx = VersionOracle::new(&git, &TerminalPrompter, output)
        .resolve_current(ctx)
        .await?;
    let text = ChangelogGenerator::new(&workspace.runner)
        .generate(&ctx)
        .await?;

    output.always(&text)?;
    Ok(0)
}
