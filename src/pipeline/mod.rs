//! The release pipeline orchestrator.
//!
//! A run is a fixed sequence of steps over one [`ReleaseContext`]:
//!
//! ```text
//! guard -> versions -> confirm -> pre hook -> bump -> push -> publish -> post hook
//! ```
//!
//! Each step takes the context by value and hands it back on success. The
//! first error ends the run; nothing is retried and nothing is rolled back.

mod phase;

pub use phase::ReleasePhase;

use crate::confirm::ConfirmationGate;
use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::events::{EventSink, ReleaseEvent};
use crate::exec::CommandRunner;
use crate::git::GitRepository;
use crate::guard::RepositoryGuard;
use crate::hooks::HookRunner;
use crate::prompt::Prompter;
use crate::publish::{ReleaseApi, VersionBumpTool, VersionPublisher};
use crate::version::VersionOracle;
use semver::Version;
use std::future::Future;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Version before the release
    pub current_version: Version,
    /// Version released
    pub next_version: Version,
    /// Tag the release is published under
    pub tag: String,
    /// Link to the remote release (the would-be link in dry run)
    pub release_link: String,
    /// Whether side effects were only described
    pub dry_run: bool,
}

/// A run that stopped early
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ReleaseFailure {
    /// Error returned by the failing step
    pub error: ReleaseError,
    /// Phase the failing step would have entered
    pub failed_in: ReleasePhase,
    /// Release link produced before the failure, if any
    pub release_link: Option<String>,
}

impl ReleaseFailure {
    /// True when the remote release exists despite the failure
    pub fn is_post_release(&self) -> bool {
        self.release_link.is_some() && self.error.is_post_release()
    }
}

/// Sequences the release steps over a single context
pub struct ReleasePipeline<'a, R, P, B, A> {
    git: GitRepository<R>,
    prompter: P,
    bump_tool: B,
    api: A,
    events: &'a dyn EventSink,
    sync: bool,
}

impl<'a, R, P, B, A> ReleasePipeline<'a, R, P, B, A>
where
    R: CommandRunner,
    P: Prompter,
    B: VersionBumpTool,
    A: ReleaseApi,
{
    /// Create a pipeline; remote sync is on by default
    pub fn new(runner: R, prompter: P, bump_tool: B, api: A, events: &'a dyn EventSink) -> Self {
        Self {
            git: GitRepository::new(runner),
            prompter,
            bump_tool,
            api,
            events,
            sync: true,
        }
    }

    /// Enable or disable pulling and fetching tags after the guard checks
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Run every step in order
    pub async fn run(&self, ctx: ReleaseContext) -> std::result::Result<ReleaseReport, ReleaseFailure> {
        let guard = &RepositoryGuard::new(&self.git, self.events);
        let oracle = &VersionOracle::new(&self.git, &self.prompter, self.events);
        let gate = &ConfirmationGate::new(self.git.runner(), &self.prompter, self.events);
        let hooks = &HookRunner::new(self.git.runner(), self.events);
        let publisher =
            &VersionPublisher::new(&self.git, &self.bump_tool, &self.api, self.events);
        let sync = self.sync;

        let ctx = self
            .advance(ctx, ReleasePhase::Guarded, move |ctx| async move {
                let ctx = guard.verify(ctx).await?;
                if sync {
                    guard.sync(ctx).await
                } else {
                    Ok(ctx)
                }
            })
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::VersionResolved, move |ctx| async move {
                let ctx = oracle.resolve_current(ctx).await?;
                oracle.resolve_next(ctx).await
            })
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::Confirmed, move |ctx| gate.confirm(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::PreHooked, move |ctx| hooks.run_pre(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::Bumped, move |ctx| publisher.bump(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::Pushed, move |ctx| publisher.push(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::Published, move |ctx| publisher.publish(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::PostHooked, move |ctx| hooks.run_post(ctx))
            .await?;
        let ctx = self
            .advance(ctx, ReleasePhase::Done, |ctx| async move { Ok(ctx) })
            .await?;

        report(&ctx).map_err(|error| ReleaseFailure {
            error,
            failed_in: ReleasePhase::Done,
            release_link: ctx.release_link().map(str::to_string),
        })
    }

    async fn advance<F, Fut>(
        &self,
        ctx: ReleaseContext,
        phase: ReleasePhase,
        step: F,
    ) -> std::result::Result<ReleaseContext, ReleaseFailure>
    where
        F: FnOnce(ReleaseContext) -> Fut,
        Fut: Future<Output = Result<ReleaseContext>>,
    {
        let release_link = ctx.release_link().map(str::to_string);

        match step(ctx).await {
            Ok(mut ctx) => {
                log::info!("entered phase: {phase}");
                ctx.enter(phase);
                self.events.emit(&ReleaseEvent::Phase(phase));
                Ok(ctx)
            }
            Err(error) => {
                log::info!("failed before phase: {phase}");
                self.events.emit(&ReleaseEvent::Phase(ReleasePhase::Failed));
                Err(ReleaseFailure {
                    error,
                    failed_in: phase,
                    release_link,
                })
            }
        }
    }
}

fn report(ctx: &ReleaseContext) -> Result<ReleaseReport> {
    Ok(ReleaseReport {
        current_version: ctx.require_current_version()?.version.clone(),
        next_version: ctx.require_next_version()?.clone(),
        tag: ctx.release_tag()?,
        release_link: ctx
            .release_link()
            .map(str::to_string)
            .ok_or(crate::error::ContextError::Missing {
                field: "release link",
            })?,
        dry_run: ctx.dry_run(),
    })
}
