//! Pre- and post-release hook execution.

use crate::config::HookCommand;
use crate::context::ReleaseContext;
use crate::error::{HookError, HookStage, Result};
use crate::events::EventSink;
use crate::exec::{CommandRunner, Invocation};

/// Environment variable carrying the version being released
pub const NEXT_VERSION_ENV: &str = "RELEASE_PILOT_NEXT_VERSION";

/// Runs the configured hook commands through the shell
pub struct HookRunner<'a, R> {
    runner: &'a R,
    events: &'a dyn EventSink,
}

impl<'a, R: CommandRunner> HookRunner<'a, R> {
    /// Create a hook runner
    pub fn new(runner: &'a R, events: &'a dyn EventSink) -> Self {
        Self { runner, events }
    }

    /// Run `preRelease`, if configured
    pub async fn run_pre(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        let hook = ctx.static_config().pre_release.clone();
        self.run(HookStage::Pre, hook.as_ref(), ctx).await
    }

    /// Run `postRelease`, if configured
    pub async fn run_post(&self, ctx: ReleaseContext) -> Result<ReleaseContext> {
        let hook = ctx.static_config().post_release.clone();
        self.run(HookStage::Post, hook.as_ref(), ctx).await
    }

    async fn run(
        &self,
        stage: HookStage,
        hook: Option<&HookCommand>,
        ctx: ReleaseContext,
    ) -> Result<ReleaseContext> {
        let Some(hook) = hook else {
            return Ok(ctx);
        };

        let version = ctx.require_next_version()?.to_string();
        let command = hook.resolve(&version);

        if ctx.dry_run() {
            self.events.dry_run(&command);
            return Ok(ctx);
        }

        self.events
            .progress(&format!("Running {stage} hook: {command}"));
        let invocation = Invocation::shell(command.as_str()).env(NEXT_VERSION_ENV, version);
        let out = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| HookError::SpawnFailed {
                stage,
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !out.success() {
            return Err(HookError::Failed {
                stage,
                command,
                code: out.code,
                output: out.diagnostic(),
            }
            .into());
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::context::{CurrentVersion, ReleaseTarget};
    use crate::error::ReleaseError;
    use crate::events::ReleaseEvent;
    use crate::exec::CommandOutput;
    use crate::version::VersionBump;
    use semver::Version;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Shell {
        exit: i32,
        seen: RefCell<Vec<Invocation>>,
    }

    impl CommandRunner for Shell {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            self.seen.borrow_mut().push(invocation.clone());
            if self.exit == 0 {
                Ok(CommandOutput::ok("done"))
            } else {
                Ok(CommandOutput::failed(self.exit, "hook exploded"))
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

    fn ctx(config: StaticConfig, dry_run: bool) -> ReleaseContext {
        let mut ctx = ReleaseContext::new(ReleaseTarget::Next(VersionBump::Patch))
            .with_dry_run(dry_run)
            .with_static_config(config)
            .with_current_version(CurrentVersion::untagged(Version::new(2, 0, 0)))
            .unwrap();
        ctx.set_next_version(Version::new(2, 0, 1)).unwrap();
        ctx
    }

    fn with_hooks() -> StaticConfig {
        StaticConfig {
            pre_release: Some(HookCommand::literal("make dist")),
            post_release: Some(HookCommand::template("notify {version}")),
            ..StaticConfig::default()
        }
    }

    #[tokio::test]
    async fn test_absent_hook_passes_through() {
        let shell = Shell::default();
        HookRunner::new(&shell, &Events::default())
            .run_pre(ctx(StaticConfig::default(), false))
            .await
            .unwrap();
        assert!(shell.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_live_hook_gets_version_env() {
        let shell = Shell::default();
        HookRunner::new(&shell, &Events::default())
            .run_post(ctx(with_hooks(), false))
            .await
            .unwrap();

        let seen = shell.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_shell());
        assert_eq!(seen[0].command_line(), "notify 2.0.1");
        assert_eq!(
            seen[0].envs(),
            &[(NEXT_VERSION_ENV.to_string(), "2.0.1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_dry_run_emits_command_only() {
        let shell = Shell::default();
        let events = Events::default();
        HookRunner::new(&shell, &events)
            .run_pre(ctx(with_hooks(), true))
            .await
            .unwrap();

        assert!(shell.seen.borrow().is_empty());
        assert_eq!(
            *events.0.borrow(),
            vec![ReleaseEvent::DryRun {
                command: "make dist".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_names_stage() {
        let shell = Shell {
            exit: 2,
            ..Shell::default()
        };
        let err = HookRunner::new(&shell, &Events::default())
            .run_pre(ctx(with_hooks(), false))
            .await
            .unwrap_err();

        match err {
            ReleaseError::Hook(HookError::Failed {
                stage,
                code,
                output,
                ..
            }) => {
                assert_eq!(stage, HookStage::Pre);
                assert_eq!(code, Some(2));
                assert_eq!(output, "hook exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
