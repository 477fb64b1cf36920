//! Repository preconditions checked before anything is released.

use crate::context::ReleaseContext;
use crate::error::{GuardError, Result};
use crate::events::EventSink;
use crate::exec::CommandRunner;
use crate::git::GitRepository;

/// Verifies branch and working tree, then syncs with the remote
pub struct RepositoryGuard<'a, R> {
    git: &'a GitRepository<R>,
    events: &'a dyn EventSink,
}

impl<'a, R: CommandRunner> RepositoryGuard<'a, R> {
    /// Create a guard
    pub fn new(git: &'a GitRepository<R>, events: &'a dyn EventSink) -> Self {
        Self { git, events }
    }

    /// Check the release branch, then the working tree.
    ///
    /// A disabled check issues no git command at all.
    pub async fn verify(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        if !ctx.ignore_branch_check() {
            let expected = ctx.static_config().release_branch();
            self.events
                .progress(&format!("Checking that HEAD is on {expected}"));
            let actual = self.git.current_branch().await?;
            if actual != expected {
                return Err(GuardError::NotOnReleaseBranch {
                    expected: expected.to_string(),
                    actual,
                }
                .into());
            }
        }

        if !ctx.ignore_unclean_state() {
            self.events.progress("Checking for uncommitted changes");
            let paths = self.git.modified_paths().await?;
            if !paths.is_empty() {
                return Err(GuardError::UncommittedChanges { paths }.into());
            }
        }

        Ok(ctx)
    }

    /// Pull the release branch and fetch tags.
    ///
    /// Runs in dry-run mode too, so the resolved versions match a real run.
    pub async fn sync(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        let config = ctx.static_config();
        let (remote, branch) = (config.remote(), config.release_branch());

        if ctx.dry_run() {
            self.events.warning(&format!(
                "Dry run still pulls {branch} from {remote} and fetches tags \
                 (pass --no-sync to skip)"
            ));
        }

        self.events
            .progress(&format!("Pulling {branch} from {remote}"));
        self.git.pull(remote, branch).await?;
        self.events.progress("Fetching tags");
        self.git.fetch_tags().await?;
        Ok(ctx)
    }
}
