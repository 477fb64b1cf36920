//! Typed git queries and mutations on top of a [`CommandRunner`].

use crate::error::{GitError, Result};
use crate::exec::{CommandOutput, CommandRunner, Invocation};
use regex::Regex;
use std::sync::LazyLock;

/// Matches git's complaints when `describe` finds no tag at all
static NO_TAGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no names found|no tags can describe|cannot describe anything")
        .expect("no-tags regex is valid")
});

/// Git operations needed by the release pipeline
#[derive(Debug, Clone)]
pub struct GitRepository<R> {
    runner: R,
}

impl<R: CommandRunner> GitRepository<R> {
    /// Wrap a command runner
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Underlying command runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Name of the branch HEAD points to (`HEAD` when detached)
    pub async fn current_branch(&self) -> Result<String> {
        let out = self
            .checked(Invocation::git(["rev-parse", "--abbrev-ref", "HEAD"]))
            .await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Tracked paths with staged or unstaged modifications
    pub async fn modified_paths(&self) -> Result<Vec<String>> {
        let out = self
            .checked(Invocation::git([
                "status",
                "--untracked-files=no",
                "--porcelain",
            ]))
            .await?;
        Ok(out
            .stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.get(3..).unwrap_or(line).trim().to_string())
            .collect())
    }

    /// Most recent tag reachable from HEAD, or `None` when the repository has no tags
    pub async fn latest_tag(&self) -> Result<Option<String>> {
        let invocation = Invocation::git(["describe", "--abbrev=0", "--tags"]);
        let out = self.runner.run(&invocation).await?;
        if out.success() {
            let tag = out.stdout.trim();
            return Ok((!tag.is_empty()).then(|| tag.to_string()));
        }
        if NO_TAGS_RE.is_match(&out.stderr) {
            return Ok(None);
        }
        Err(command_failed(&invocation, &out))
    }

    /// `git pull <remote> <branch>`
    pub async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.checked(Invocation::git(["pull", remote, branch])).await?;
        Ok(())
    }

    /// `git fetch --tags`
    pub async fn fetch_tags(&self) -> Result<()> {
        self.checked(Invocation::git(["fetch", "--tags"])).await?;
        Ok(())
    }

    /// Push the branch, then all tags, skipping local verification hooks
    pub async fn push_with_tags(&self, remote: &str, branch: &str) -> Result<()> {
        for invocation in push_invocations(remote, branch) {
            self.checked(invocation).await?;
        }
        Ok(())
    }

    /// Fetch URL configured for `remote`
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        let out = self
            .checked(Invocation::git(["remote", "get-url", remote]))
            .await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Stage the given paths
    pub async fn add(&self, paths: &[String]) -> Result<()> {
        let mut args = vec!["add".to_string(), "--".to_string()];
        args.extend(paths.iter().cloned());
        self.checked(Invocation::git(args)).await?;
        Ok(())
    }

    /// Whether `path` is in the index
    pub async fn is_tracked(&self, path: &str) -> Result<bool> {
        let invocation = Invocation::git(["ls-files", "--error-unmatch", "--", path]);
        let out = self.runner.run(&invocation).await?;
        match out.code {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(command_failed(&invocation, &out)),
        }
    }

    /// Commit whatever is staged
    pub async fn commit(&self, message: &str) -> Result<()> {
        self.checked(Invocation::git(["commit", "-m", message]))
            .await?;
        Ok(())
    }

    /// Create an annotated tag on HEAD
    pub async fn tag(&self, name: &str, message: &str) -> Result<()> {
        self.checked(Invocation::git(["tag", "-a", name, "-m", message]))
            .await?;
        Ok(())
    }

    /// Run any invocation and fail on non-zero exit
    pub async fn checked(&self, invocation: Invocation) -> Result<CommandOutput> {
        let out = self.runner.run(&invocation).await?;
        if out.success() {
            Ok(out)
        } else {
            Err(command_failed(&invocation, &out))
        }
    }
}

/// The two pushes a release needs, in order
pub fn push_invocations(remote: &str, branch: &str) -> [Invocation; 2] {
    [
        Invocation::git(["push", remote, branch, "--no-verify"]),
        Invocation::git(["push", remote, branch, "--tags", "--no-verify"]),
    ]
}

fn command_failed(invocation: &Invocation, out: &CommandOutput) -> crate::error::ReleaseError {
    GitError::CommandFailed {
        command: invocation.command_line(),
        stderr: out.diagnostic(),
    }
    .into()
}
