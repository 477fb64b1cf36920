//! The version-bump tool: manifest edit, release commit and tag.

use crate::error::{PublishError, ReleaseError, Result, VersionError};
use crate::exec::CommandRunner;
use crate::git::GitRepository;
use crate::version::{VersionBump, read_manifest_version, update_manifest_version};
use semver::Version;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "Cargo.lock";

/// How the bump tool should pick the new version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpSpec {
    /// Increment the manifest's version
    Increment(VersionBump),
    /// Set exactly this version
    Explicit(Version),
}

impl fmt::Display for BumpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpSpec::Increment(bump) => write!(f, "{bump}"),
            BumpSpec::Explicit(version) => write!(f, "{version}"),
        }
    }
}

/// One call to the bump tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpRequest {
    /// Increment kind or explicit version
    pub spec: BumpSpec,
    /// Version the manifest must end up at
    pub version: Version,
    /// Tag to create on the release commit
    pub tag: String,
    /// Release commit message
    pub commit_message: String,
}

impl fmt::Display for BumpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bump {} (commit \"{}\", tag {})",
            self.spec, self.commit_message, self.tag
        )
    }
}

/// Applies a version bump to the working copy and history
pub trait VersionBumpTool {
    /// Mutate the manifest, commit, and tag
    fn bump(&self, request: &BumpRequest) -> impl Future<Output = Result<()>>;
}

impl<T: VersionBumpTool> VersionBumpTool for &T {
    fn bump(&self, request: &BumpRequest) -> impl Future<Output = Result<()>> {
        (**self).bump(request)
    }
}

/// Bumps `Cargo.toml` (and `Cargo.lock`), commits, and tags
#[derive(Debug, Clone)]
pub struct ManifestBumper<R> {
    git: GitRepository<R>,
    repo_root: PathBuf,
}

impl<R: CommandRunner> ManifestBumper<R> {
    /// Bumper for the `Cargo.toml` at the root of the repository `git` runs in
    pub fn new(git: GitRepository<R>, repo_root: impl AsRef<Path>) -> Self {
        Self {
            git,
            repo_root: repo_root.as_ref().to_path_buf(),
        }
    }

    /// Manifest this bumper edits
    pub fn manifest_path(&self) -> PathBuf {
        self.repo_root.join("Cargo.toml")
    }

    fn failed(request: &BumpRequest, err: ReleaseError) -> ReleaseError {
        PublishError::BumpFailed {
            tag: request.tag.clone(),
            reason: err.to_string(),
        }
        .into()
    }

    async fn apply(&self, request: &BumpRequest) -> Result<()> {
        let manifest_path = self.manifest_path();
        let current = read_manifest_version(&manifest_path)?;
        let target = match &request.spec {
            BumpSpec::Increment(bump) => bump.apply(&current),
            BumpSpec::Explicit(version) => version.clone(),
        };
        if target != request.version {
            return Err(VersionError::ManifestMismatch {
                manifest: current,
                bumped: target,
                expected: request.version.clone(),
            }
            .into());
        }

        if target != current {
            // An untracked lock file is rewritten but not staged
            let lock_path = self.repo_root.join(LOCK_FILE);
            let stage_lock = lock_path.exists() && self.git.is_tracked(LOCK_FILE).await?;

            let (_, written) = update_manifest_version(&manifest_path, &target)?;
            log::debug!("manifest version {current} -> {target}");

            let paths: Vec<String> = written
                .iter()
                .filter(|path| stage_lock || **path != lock_path)
                .map(|path| relative_to(path, &self.repo_root))
                .collect();
            self.git.add(&paths).await?;
            self.git.commit(&request.commit_message).await?;
        } else {
            log::debug!("manifest already at {target}, tagging only");
        }

        self.git.tag(&request.tag, &request.commit_message).await
    }
}

impl<R: CommandRunner> VersionBumpTool for ManifestBumper<R> {
    async fn bump(&self, request: &BumpRequest) -> Result<()> {
        self.apply(request)
            .await
            .map_err(|e| Self::failed(request, e))
    }
}

fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
