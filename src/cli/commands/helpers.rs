//! Shared helper functions for command execution.

use crate::cli::{Args, OutputManager};
use crate::config::StaticConfig;
use crate::context::{ReleaseContext, ReleaseTarget};
use crate::error::{ReleaseError, Result};
use crate::exec::SystemRunner;
use crate::git::{GitRepository, RemoteIdentity};
use std::path::PathBuf;

/// Repository the command operates on
pub(super) struct Workspace {
    /// Absolute repository root
    pub root: PathBuf,
    /// Runner rooted at `root`
    pub runner: SystemRunner,
    /// Static configuration with CLI overrides applied
    pub config: StaticConfig,
}

/// Resolve the repository, locate git and load configuration
pub(super) fn open_workspace(args: &Args) -> Result<Workspace> {
    let root = std::fs::canonicalize(&args.repo)?;
    let runner = SystemRunner::new(&root)?;

    let mut config = StaticConfig::load(&root, args.config.as_deref())?;
    if let Some(branch) = &args.branch {
        config.release_branch = Some(branch.clone());
    }
    if let Some(remote) = &args.remote {
        config.remote = Some(remote.clone());
    }
    log::debug!(
        "repository {} (branch {}, remote {})",
        root.display(),
        config.release_branch(),
        config.remote()
    );

    Ok(Workspace {
        root,
        runner,
        config,
    })
}

/// Context carrying the global flags
pub(super) fn release_context(
    args: &Args,
    target: ReleaseTarget,
    config: StaticConfig,
) -> ReleaseContext {
    ReleaseContext::new(target)
        .with_dry_run(args.dry_run)
        .with_ignore_unclean_state(args.ignore_unclean)
        .with_ignore_branch_check(args.ignore_branch)
        .with_static_config(config)
}

/// Host of the configured remote, when it can be read
pub(super) async fn remote_host(workspace: &Workspace) -> Option<String> {
    let git = GitRepository::new(&workspace.runner);
    let url = git.remote_url(workspace.config.remote()).await.ok()?;
    RemoteIdentity::parse(&url).ok().map(|identity| identity.host)
}

/// Print recovery suggestions for `error`
pub(super) fn print_suggestions(output: &OutputManager, error: &ReleaseError) {
    let suggestions = error.recovery_suggestions();
    if suggestions.is_empty() || output.is_quiet() {
        return;
    }
    let _ = output.println("\n💡 Recovery suggestions:");
    for suggestion in suggestions {
        let _ = output.indent(&format!("• {suggestion}"));
    }
}
