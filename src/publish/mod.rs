//! Publishing a resolved release: bump, push, remote release.
//!
//! The [`VersionPublisher`] drives three independent collaborators: a
//! [`VersionBumpTool`] that edits and tags, git for the push, and a
//! [`ReleaseApi`] for the remote release resource. In dry-run mode each step
//! emits the equivalent command instead of running it.

mod bump_tool;
mod release_api;

pub use bump_tool::{BumpRequest, BumpSpec, ManifestBumper, VersionBumpTool};
pub use release_api::{ManualReleases, ReleaseApi, ReleaseRequest};

use crate::context::{ReleaseContext, ReleaseTarget};
use crate::error::{PublishError, ReleaseError, Result};
use crate::events::{EventSink, ReleaseEvent};
use crate::exec::CommandRunner;
use crate::git::{GitRepository, RemoteIdentity, push_invocations};

/// Applies, pushes and publishes the next version
pub struct VersionPublisher<'a, R, B, A> {
    git: &'a GitRepository<R>,
    bump_tool: &'a B,
    api: &'a A,
    events: &'a dyn EventSink,
}

impl<'a, R, B, A> VersionPublisher<'a, R, B, A>
where
    R: CommandRunner,
    B: VersionBumpTool,
    A: ReleaseApi,
{
    /// Create a publisher
    pub fn new(
        git: &'a GitRepository<R>,
        bump_tool: &'a B,
        api: &'a A,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            git,
            bump_tool,
            api,
            events,
        }
    }

    /// Hand the next version to the bump tool
    pub async fn bump(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        let request = bump_request(&ctx)?;

        if ctx.dry_run() {
            self.events.dry_run(&request.to_string());
            return Ok(ctx);
        }

        self.events
            .progress(&format!("Bumping version to {}", request.tag));
        self.bump_tool.bump(&request).await?;
        Ok(ctx)
    }

    /// Push the release branch and its tags
    pub async fn push(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        let config = ctx.static_config();
        let remote = config.remote();
        let branch = config.release_branch();

        if ctx.ignore_branch_check() {
            self.events.warning(&format!(
                "Branch check is disabled: pushing {branch}, which only carries \
                 the release commit if HEAD is on {branch}"
            ));
        }

        if ctx.dry_run() {
            let line = push_invocations(remote, branch)
                .iter()
                .map(|invocation| invocation.command_line())
                .collect::<Vec<_>>()
                .join(" && ");
            self.events.dry_run(&line);
            return Ok(ctx);
        }

        self.events
            .progress(&format!("Pushing {branch} and tags to {remote}"));
        self.git
            .push_with_tags(remote, branch)
            .await
            .map_err(|e| PublishError::PushFailed {
                reason: e.to_string(),
            })?;
        Ok(ctx)
    }

    /// Create the remote release and record its link
    pub async fn publish(&self, mut ctx: ReleaseContext) -> Result<ReleaseContext> {
        let tag = ctx.release_tag()?;
        let remote = ctx.static_config().remote().to_string();
        let identity = self.resolve_identity(&remote).await?;

        let request = ReleaseRequest {
            owner: identity.owner.clone(),
            project: identity.project.clone(),
            tag: tag.clone(),
            title: tag.clone(),
            body: ctx.changelog().unwrap_or_default().to_string(),
        };

        if ctx.dry_run() {
            self.events
                .dry_run(&format!("create release {tag} on {identity}"));
        } else {
            self.events
                .progress(&format!("Creating release {tag} on {identity}"));
            self.api
                .create_release(&request)
                .await
                .map_err(|e| match e {
                    ReleaseError::Publish(PublishError::ReleaseApiFailed { .. }) => e,
                    other => PublishError::ReleaseApiFailed {
                        tag: tag.clone(),
                        reason: other.to_string(),
                    }
                    .into(),
                })?;
        }

        let link = self.api.release_link(&identity, &tag);
        ctx.set_release_link(link.clone())?;
        self.events.emit(&ReleaseEvent::ReleaseLink(link));
        Ok(ctx)
    }

    async fn resolve_identity(&self, remote: &str) -> Result<RemoteIdentity> {
        let unresolved = |reason: String| ReleaseError::RemoteIdentityUnresolved {
            remote: remote.to_string(),
            reason,
        };

        let url = self
            .git
            .remote_url(remote)
            .await
            .map_err(|e| unresolved(e.to_string()))?;
        RemoteIdentity::parse(&url).map_err(unresolved)
    }
}

/// Bump request matching the context's target and next version
pub fn bump_request(ctx: &ReleaseContext) -> Result<BumpRequest> {
    let tag = ctx.release_tag()?;
    let version = ctx.require_next_version()?.clone();
    let spec = match ctx.target() {
        ReleaseTarget::Next(bump) => BumpSpec::Increment(bump),
        ReleaseTarget::Current => BumpSpec::Explicit(version.clone()),
    };
    Ok(BumpRequest {
        spec,
        version,
        commit_message: tag.clone(),
        tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CurrentVersion;
    use crate::exec::{CommandOutput, Invocation};
    use crate::version::VersionBump;
    use semver::Version;
    use std::cell::RefCell;

    struct Remote(&'static str);

    impl CommandRunner for Remote {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            if invocation.command_line().starts_with("git remote get-url") {
                Ok(CommandOutput::ok(self.0))
            } else {
                Ok(CommandOutput::failed(1, "unexpected"))
            }
        }
    }

    #[derive(Default)]
    struct Events(RefCell<Vec<ReleaseEvent>>);

    impl EventSink for Events {
        fn emit(&self, event: &ReleaseEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    struct NoBump;

    impl VersionBumpTool for NoBump {
        async fn bump(&self, _request: &BumpRequest) -> Result<()> {
            panic!("bump tool must not run");
        }
    }

    struct FailingApi;

    impl ReleaseApi for FailingApi {
        async fn create_release(&self, _request: &ReleaseRequest) -> Result<()> {
            Err(std::io::Error::other("boom").into())
        }
    }

    fn resolved(target: ReleaseTarget, dry_run: bool) -> ReleaseContext {
        let mut ctx = ReleaseContext::new(target)
            .with_dry_run(dry_run)
            .with_current_version(CurrentVersion::tagged(Version::new(1, 2, 3), "v1.2.3"))
            .unwrap();
        let next = crate::version::next_version(&Version::new(1, 2, 3), target).unwrap();
        ctx.set_next_version(next).unwrap();
        ctx
    }

    #[test]
    fn test_bump_request_per_target() {
        let ctx = resolved(ReleaseTarget::Next(VersionBump::Minor), false);
        let request = bump_request(&ctx).unwrap();
        assert_eq!(request.spec, BumpSpec::Increment(VersionBump::Minor));
        assert_eq!(request.tag, "v1.3.0");
        assert_eq!(request.commit_message, "v1.3.0");
        assert_eq!(request.version, Version::new(1, 3, 0));

        let ctx = resolved(ReleaseTarget::Current, false);
        let request = bump_request(&ctx).unwrap();
        assert_eq!(request.spec, BumpSpec::Explicit(Version::new(1, 2, 3)));
    }

    #[tokio::test]
    async fn test_dry_run_describes_instead_of_running() {
        let git = GitRepository::new(Remote("git@github.com:acme/widgets.git"));
        let events = Events::default();
        let publisher = VersionPublisher::new(&git, &NoBump, &FailingApi, &events);

        let ctx = resolved(ReleaseTarget::Next(VersionBump::Patch), true);
        let ctx = publisher.bump(ctx).await.unwrap();
        let ctx = publisher.push(ctx).await.unwrap();
        let ctx = publisher.publish(ctx).await.unwrap();

        assert_eq!(
            ctx.release_link(),
            Some("https://github.com/acme/widgets/releases/tag/v1.2.4")
        );
        let events = events.0.borrow();
        assert!(events.contains(&ReleaseEvent::DryRun {
            command: "git push origin master --no-verify && git push origin master --tags --no-verify"
                .to_string()
        }));
    }

    #[tokio::test]
    async fn test_api_failure_maps_to_publish_error() {
        let git = GitRepository::new(Remote("https://github.com/acme/widgets"));
        let events = Events::default();
        let publisher = VersionPublisher::new(&git, &NoBump, &FailingApi, &events);

        let err = publisher
            .publish(resolved(ReleaseTarget::Next(VersionBump::Patch), false))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Publish(PublishError::ReleaseApiFailed { ref tag, .. }) if tag == "v1.2.4"
        ));
    }

    #[tokio::test]
    async fn test_unparseable_remote_fails_even_in_dry_run() {
        let git = GitRepository::new(Remote("/srv/git/widgets"));
        let events = Events::default();
        let publisher = VersionPublisher::new(&git, &NoBump, &FailingApi, &events);

        let err = publisher
            .publish(resolved(ReleaseTarget::Next(VersionBump::Patch), true))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::RemoteIdentityUnresolved { .. }));
    }
}
