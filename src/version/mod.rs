//! Version resolution for releases.
//!
//! The [`VersionOracle`] reads the current published version from the latest
//! tag (asking the operator when the repository has none) and derives the
//! next version from the requested bump.

mod bump;
mod manifest;

pub use bump::{VersionBump, parse_lenient};
pub use manifest::{read_manifest_version, update_manifest_version};

use crate::context::{CurrentVersion, ReleaseContext, ReleaseTarget};
use crate::error::{ReleaseError, Result, VersionError};
use crate::events::EventSink;
use crate::exec::CommandRunner;
use crate::git::GitRepository;
use crate::prompt::Prompter;
use semver::Version;

/// Starting version suggested when a repository has no tags yet
pub const BOOTSTRAP_VERSION: &str = "0.1.0";

/// Compute the version a release of `target` should carry
pub fn next_version(current: &Version, target: ReleaseTarget) -> Result<Version> {
    let next = match target {
        ReleaseTarget::Next(bump) => bump.apply(current),
        ReleaseTarget::Current => current.clone(),
    };

    let valid = match target {
        ReleaseTarget::Next(_) => next > *current,
        ReleaseTarget::Current => next == *current,
    };
    if !valid {
        return Err(VersionError::InvalidNextVersion {
            version: next.to_string(),
            reason: format!("does not follow {current} for a {target:?} release"),
        }
        .into());
    }

    // Round-trip through the parser so only canonical versions leave this function
    Version::parse(&next.to_string()).map_err(|e| {
        VersionError::InvalidNextVersion {
            version: next.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Resolves current and next versions
pub struct VersionOracle<'a, R, P> {
    git: &'a GitRepository<R>,
    prompter: &'a P,
    events: &'a dyn EventSink,
}

impl<'a, R: CommandRunner, P: Prompter> VersionOracle<'a, R, P> {
    /// Create an oracle
    pub fn new(git: &'a GitRepository<R>, prompter: &'a P, events: &'a dyn EventSink) -> Self {
        Self {
            git,
            prompter,
            events,
        }
    }

    /// Record the current version unless it is already present
    pub async fn resolve_current(&self, mut ctx: ReleaseContext) -> Result<ReleaseContext> {
        if ctx.current_version().is_some() {
            return Ok(ctx);
        }

        self.events.progress("Resolving current version from tags");
        let current = match self.git.latest_tag().await? {
            Some(tag) => {
                let version =
                    parse_lenient(&tag).map_err(|e| VersionError::InvalidCurrentVersion {
                        version: tag.clone(),
                        reason: e.to_string(),
                    })?;
                CurrentVersion::tagged(version, tag)
            }
            None => {
                self.events
                    .progress("No release tag found, asking for the starting version");
                let input = self
                    .prompter
                    .ask("Current version?", BOOTSTRAP_VERSION)
                    .await
                    .map_err(|e| ReleaseError::UserAborted {
                        reason: format!("no starting version given ({e})"),
                    })?;
                let version =
                    parse_lenient(&input).map_err(|e| VersionError::InvalidBootstrapVersion {
                        input: input.clone(),
                        reason: e.to_string(),
                    })?;
                CurrentVersion::untagged(version)
            }
        };

        log::debug!("current version resolved to {}", current.version);
        ctx.set_current_version(current)?;
        Ok(ctx)
    }

    /// Record the next version derived from the current one
    pub async fn resolve_next(&self, mut ctx: ReleaseContext) -> Result<ReleaseContext> {
        let current = ctx.require_current_version()?.version.clone();
        let next = next_version(&current, ctx.target())?;
        log::debug!("next version resolved to {next}");
        ctx.set_next_version(next)?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_version_scenarios() {
        let minor = ReleaseTarget::Next(VersionBump::Minor);
        let major = ReleaseTarget::Next(VersionBump::Major);
        assert_eq!(
            next_version(&Version::new(1, 2, 3), minor).unwrap(),
            Version::new(1, 3, 0)
        );
        assert_eq!(
            next_version(&Version::new(0, 9, 9), major).unwrap(),
            Version::new(1, 0, 0)
        );
    }

    #[test]
    fn test_current_target_keeps_version() {
        let current = Version::parse("0.4.0").unwrap();
        assert_eq!(
            next_version(&current, ReleaseTarget::Current).unwrap(),
            current
        );
    }

    #[test]
    fn test_next_version_is_deterministic() {
        let current = Version::parse("3.1.4-beta.2").unwrap();
        let target = ReleaseTarget::Next(VersionBump::Patch);
        assert_eq!(
            next_version(&current, target).unwrap(),
            next_version(&current, target).unwrap()
        );
    }
}
