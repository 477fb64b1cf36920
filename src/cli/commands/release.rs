//! `release` and `init` command execution.

use super::helpers::{Workspace, open_workspace, release_context, remote_host};
use crate::cli::{Args, OutputManager};
use crate::context::{CurrentVersion, ReleaseContext, ReleaseTarget};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::git::GitRepository;
use crate::github::{GitHubReleaseConfig, GitHubReleases};
use crate::pipeline::ReleasePipeline;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::publish::{ManifestBumper, ManualReleases, ReleaseApi, VersionBumpTool};
use crate::version::{VersionBump, read_manifest_version};

/// Release the next `bump` version
pub(super) async fn execute_release(
    args: &Args,
    bump: VersionBump,
    output: &OutputManager,
) -> Result<i32> {
    let workspace = open_workspace(args)?;
    let ctx = release_context(args, ReleaseTarget::Next(bump), workspace.config.clone());
    run_pipeline(args, &workspace, ctx, output).await
}

/// Release the manifest's current version as the first release
pub(super) async fn execute_init(args: &Args, output: &OutputManager) -> Result<i32> {
    let workspace = open_workspace(args)?;
    let version = read_manifest_version(&workspace.root.join("Cargo.toml"))?;
    let _ = output.info(&format!(
        "Releasing {version} from Cargo.toml as the first release"
    ));

    let ctx = release_context(args, ReleaseTarget::Current, workspace.config.clone())
        .with_current_version(CurrentVersion::untagged(version))?;
    run_pipeline(args, &workspace, ctx, output).await
}

async fn run_pipeline(
    args: &Args,
    workspace: &Workspace,
    ctx: ReleaseContext,
    output: &OutputManager,
) -> Result<i32> {
    let bumper = ManifestBumper::new(GitRepository::new(&workspace.runner), &workspace.root);

    match args.github_token() {
        Some(token) => {
            let mut config = GitHubReleaseConfig::new(token);
            if let Some(host) = remote_host(workspace).await {
                config.host = host;
            }
            config.draft = args.draft;
            let api = GitHubReleases::new(config)?;
            let pipeline =
                ReleasePipeline::new(&workspace.runner, TerminalPrompter, bumper, api, output)
                    .with_sync(!args.no_sync);
            drive(pipeline, ctx, output).await
        }
        None => {
            if !args.dry_run {
                let _ = output.warn(
                    "No GH_TOKEN or GITHUB_TOKEN set, the release page must be filled in by hand",
                );
            }
            let pipeline = ReleasePipeline::new(
                &workspace.runner,
                TerminalPrompter,
                bumper,
                ManualReleases,
                output,
            )
            .with_sync(!args.no_sync);
            drive(pipeline, ctx, output).await
        }
    }
}

async fn drive<R, P, B, A>(
    pipeline: ReleasePipeline<'_, R, P, B, A>,
    ctx: ReleaseContext,
    output: &OutputManager,
) -> Result<i32>
where
    R: CommandRunner,
    P: Prompter,
    B: VersionBumpTool,
    A: ReleaseApi,
{
    match pipeline.run(ctx).await {
        Ok(report) => {
            let message = if report.dry_run {
                format!("Dry run complete, {} would be released", report.tag)
            } else {
                format!("Released {}", report.tag)
            };
            let _ = output.success(&message);
            Ok(0)
        }
        Err(failure) => {
            log::debug!("release stopped before phase: {}", failure.failed_in);
            if let Some(link) = &failure.release_link {
                let _ = output.warn(&format!(
                    "The release is published at {link}, but a later step failed"
                ));
            }
            Err(failure.error)
        }
    }
}
