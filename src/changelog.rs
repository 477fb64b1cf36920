//! Changelog text for a pending release.

use crate::config::HookCommand;
use crate::context::ReleaseContext;
use crate::error::{ChangelogError, Result};
use crate::exec::{CommandRunner, Invocation};

/// `git log` format producing one bullet per merge: body and short hash
pub const MERGE_LOG_FORMAT: &str = "--pretty=format:* %b (%h)";

/// Builds the changelog from merge commits or a custom command
pub struct ChangelogGenerator<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> ChangelogGenerator<'a, R> {
    /// Create a generator
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Changelog since the current version, trimmed; empty when nothing merged
    pub async fn generate(&self, ctx: &ReleaseContext) -> Result<String> {
        let current = ctx.require_current_version()?;
        let invocation = match &ctx.static_config().changelog_command {
            Some(command) => custom_query(command, &current.reference()),
            None => default_query(current.tag.as_deref()),
        };
        self.run(&invocation).await
    }

    async fn run(&self, invocation: &Invocation) -> Result<String> {
        let failed = |reason: String| ChangelogError::GenerationFailed {
            command: invocation.command_line(),
            reason,
        };

        let out = self
            .runner
            .run(invocation)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !out.success() {
            return Err(failed(out.diagnostic()).into());
        }
        Ok(out.stdout.trim().to_string())
    }
}

/// Merge commits since `since` (every merge reachable from HEAD without one)
pub fn default_query(since: Option<&str>) -> Invocation {
    let range = match since {
        Some(tag) => format!("{tag}..HEAD"),
        None => "HEAD".to_string(),
    };
    Invocation::git(["log", "--merges", MERGE_LOG_FORMAT, range.as_str()])
}

/// Custom changelog command resolved against the current version reference
pub fn custom_query(command: &HookCommand, reference: &str) -> Invocation {
    Invocation::shell(command.resolve(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::context::{CurrentVersion, ReleaseTarget};
    use crate::error::ReleaseError;
    use crate::exec::CommandOutput;
    use crate::version::VersionBump;
    use semver::Version;
    use std::cell::RefCell;

    struct Scripted {
        output: CommandOutput,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(output: CommandOutput) -> Self {
            Self {
                output,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Scripted {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            self.seen.borrow_mut().push(invocation.command_line());
            Ok(self.output.clone())
        }
    }

    fn ctx(current: CurrentVersion, config: StaticConfig) -> ReleaseContext {
        ReleaseContext::new(ReleaseTarget::Next(VersionBump::Patch))
            .with_static_config(config)
            .with_current_version(current)
            .unwrap()
    }

    #[tokio::test]
    async fn test_default_query_bounds_range_by_tag() {
        let runner = Scripted::new(CommandOutput::ok("* Fix parser (abc1234)\n\n"));
        let ctx = ctx(
            CurrentVersion::tagged(Version::new(1, 2, 3), "v1.2.3"),
            StaticConfig::default(),
        );
        let text = ChangelogGenerator::new(&runner).generate(&ctx).await.unwrap();

        assert_eq!(text, "* Fix parser (abc1234)");
        assert_eq!(
            *runner.seen.borrow(),
            vec!["git log --merges '--pretty=format:* %b (%h)' v1.2.3..HEAD".to_string()]
        );
    }

    #[test]
    fn test_default_query_without_tag_uses_head() {
        assert_eq!(
            default_query(None).command_line(),
            "git log --merges '--pretty=format:* %b (%h)' HEAD"
        );
    }

    #[tokio::test]
    async fn test_derived_command_gets_reference() {
        let runner = Scripted::new(CommandOutput::ok(""));
        let config = StaticConfig {
            changelog_command: Some(HookCommand::template("notes --since {version}")),
            ..StaticConfig::default()
        };
        let ctx = ctx(CurrentVersion::untagged(Version::new(0, 1, 0)), config);
        let text = ChangelogGenerator::new(&runner).generate(&ctx).await.unwrap();

        assert_eq!(text, "");
        assert_eq!(
            *runner.seen.borrow(),
            vec!["notes --since 0.1.0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_generation_failure() {
        let runner = Scripted::new(CommandOutput::failed(128, "fatal: bad revision"));
        let ctx = ctx(
            CurrentVersion::tagged(Version::new(1, 0, 0), "v1.0.0"),
            StaticConfig::default(),
        );
        let err = ChangelogGenerator::new(&runner)
            .generate(&ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReleaseError::Changelog(ChangelogError::GenerationFailed { .. })
        ));
        assert!(err.to_string().contains("bad revision"));
    }
}
