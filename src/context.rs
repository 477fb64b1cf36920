//! The release context threaded through every pipeline step.
//!
//! Fields produced by steps are write-once: each is held in a [`OnceCell`] and
//! a second write is an error. Immutable inputs are fixed at construction.

use crate::config::StaticConfig;
use crate::error::{ContextError, Result, VersionError};
use crate::pipeline::ReleasePhase;
use crate::version::VersionBump;
use semver::Version;
use std::cell::OnceCell;

/// What version the release should carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseTarget {
    /// Increment the current version
    Next(VersionBump),
    /// Release the current version unchanged (first release of a repository)
    Current,
}

/// Current published version and the ref it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentVersion {
    /// Parsed version
    pub version: Version,
    /// Tag name the version was read from, if any
    pub tag: Option<String>,
}

impl CurrentVersion {
    /// Version read from `tag`
    pub fn tagged(version: Version, tag: impl Into<String>) -> Self {
        Self {
            version,
            tag: Some(tag.into()),
        }
    }

    /// Version with no tag behind it
    pub fn untagged(version: Version) -> Self {
        Self { version, tag: None }
    }

    /// Git-facing name: the tag when known, the bare version otherwise
    pub fn reference(&self) -> String {
        self.tag
            .clone()
            .unwrap_or_else(|| self.version.to_string())
    }
}

/// Mutable-by-accretion record passed through the pipeline
#[derive(Debug)]
pub struct ReleaseContext {
    target: ReleaseTarget,
    dry_run: bool,
    ignore_unclean_state: bool,
    ignore_branch_check: bool,
    static_config: StaticConfig,
    phase: ReleasePhase,
    current_version: OnceCell<CurrentVersion>,
    next_version: OnceCell<Version>,
    changelog: OnceCell<String>,
    release_link: OnceCell<String>,
}

impl ReleaseContext {
    /// Empty context for `target`
    pub fn new(target: ReleaseTarget) -> Self {
        Self {
            target,
            dry_run: false,
            ignore_unclean_state: false,
            ignore_branch_check: false,
            static_config: StaticConfig::default(),
            phase: ReleasePhase::Init,
            current_version: OnceCell::new(),
            next_version: OnceCell::new(),
            changelog: OnceCell::new(),
            release_link: OnceCell::new(),
        }
    }

    /// Log intended side effects instead of performing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Skip the clean working tree check
    pub fn with_ignore_unclean_state(mut self, ignore: bool) -> Self {
        self.ignore_unclean_state = ignore;
        self
    }

    /// Skip the release branch check
    pub fn with_ignore_branch_check(mut self, ignore: bool) -> Self {
        self.ignore_branch_check = ignore;
        self
    }

    /// Attach static configuration
    pub fn with_static_config(mut self, config: StaticConfig) -> Self {
        self.static_config = config;
        self
    }

    /// Pre-seed the current version so it is not looked up.
    ///
    /// This counts as the field's single write; seeding twice is an error.
    pub fn with_current_version(mut self, current: CurrentVersion) -> Result<Self> {
        self.set_current_version(current)?;
        Ok(self)
    }

    /// Requested target
    pub fn target(&self) -> ReleaseTarget {
        self.target
    }

    /// Whether side effects are only described
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether the clean tree check is disabled
    pub fn ignore_unclean_state(&self) -> bool {
        self.ignore_unclean_state
    }

    /// Whether the branch check is disabled
    pub fn ignore_branch_check(&self) -> bool {
        self.ignore_branch_check
    }

    /// Static configuration
    pub fn static_config(&self) -> &StaticConfig {
        &self.static_config
    }

    /// Phase the pipeline last entered
    pub fn phase(&self) -> ReleasePhase {
        self.phase
    }

    pub(crate) fn enter(&mut self, phase: ReleasePhase) {
        self.phase = phase;
    }

    /// Current version, if resolved
    pub fn current_version(&self) -> Option<&CurrentVersion> {
        self.current_version.get()
    }

    /// Next version, if resolved
    pub fn next_version(&self) -> Option<&Version> {
        self.next_version.get()
    }

    /// Changelog text, if generated
    pub fn changelog(&self) -> Option<&str> {
        self.changelog.get().map(String::as_str)
    }

    /// Release link, if published
    pub fn release_link(&self) -> Option<&str> {
        self.release_link.get().map(String::as_str)
    }

    /// Current version or an error naming the missing field
    pub fn require_current_version(&self) -> Result<&CurrentVersion> {
        self.current_version
            .get()
            .ok_or_else(|| VersionError::Missing {
                field: "current version",
            }
            .into())
    }

    /// Next version or an error naming the missing field
    pub fn require_next_version(&self) -> Result<&Version> {
        self.next_version.get().ok_or_else(|| {
            VersionError::Missing {
                field: "next version",
            }
            .into()
        })
    }

    /// Tag the release will be published under
    pub fn release_tag(&self) -> Result<String> {
        Ok(self.static_config.tag_for(self.require_next_version()?))
    }

    pub(crate) fn set_current_version(&mut self, current: CurrentVersion) -> Result<()> {
        self.current_version
            .set(current)
            .map_err(|_| ContextError::FieldAlreadySet {
                field: "current version",
            })?;
        Ok(())
    }

    pub(crate) fn set_next_version(&mut self, next: Version) -> Result<()> {
        if self.current_version.get().is_none() {
            return Err(ContextError::OutOfOrder {
                field: "next version",
                requires: "current version",
            }
            .into());
        }
        self.next_version
            .set(next)
            .map_err(|_| ContextError::FieldAlreadySet {
                field: "next version",
            })?;
        Ok(())
    }

    pub(crate) fn set_changelog(&mut self, changelog: String) -> Result<()> {
        self.changelog
            .set(changelog)
            .map_err(|_| ContextError::FieldAlreadySet { field: "changelog" })?;
        Ok(())
    }

    pub(crate) fn set_release_link(&mut self, link: String) -> Result<()> {
        self.release_link
            .set(link)
            .map_err(|_| ContextError::FieldAlreadySet {
                field: "release link",
            })?;
        Ok(())
    }
}
