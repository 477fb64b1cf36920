//! Operator confirmation before anything is mutated.

use crate::changelog::ChangelogGenerator;
use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::events::{EventSink, ReleaseEvent};
use crate::exec::CommandRunner;
use crate::prompt::{Prompter, is_affirmative, with_default};

/// Default answer to the confirmation question
pub const CONFIRM_DEFAULT: &str = "Y";

/// Shows what is about to be released and waits for a yes
pub struct ConfirmationGate<'a, R, P> {
    changelog: ChangelogGenerator<'a, R>,
    prompter: &'a P,
    events: &'a dyn EventSink,
}

impl<'a, R: CommandRunner, P: Prompter> ConfirmationGate<'a, R, P> {
    /// Create a gate
    pub fn new(runner: &'a R, prompter: &'a P, events: &'a dyn EventSink) -> Self {
        Self {
            changelog: ChangelogGenerator::new(runner),
            prompter,
            events,
        }
    }

    /// Record the changelog, show the version delta and ask the operator
    pub async fn confirm(&self, mut ctx: ReleaseContext) -> Result<ReleaseContext> {
        let changelog = self.changelog.generate(&ctx).await?;
        ctx.set_changelog(changelog.clone())?;
        self.events.emit(&ReleaseEvent::Changelog(changelog));

        let from = ctx.require_current_version()?.version.clone();
        let to = ctx.require_next_version()?.clone();
        self.events.emit(&ReleaseEvent::VersionDelta { from, to });

        let tag = ctx.release_tag()?;
        let answer = self
            .prompter
            .ask(&format!("Create release {tag}?"), CONFIRM_DEFAULT)
            .await
            .map_err(|e| ReleaseError::UserAborted {
                reason: format!("no answer ({e})"),
            })?;

        let answer = with_default(&answer, CONFIRM_DEFAULT);
        if !is_affirmative(&answer) {
            return Err(ReleaseError::UserAborted {
                reason: format!("answered '{answer}'"),
            });
        }

        log::debug!("release {tag} confirmed");
        Ok(ctx)
    }
}
