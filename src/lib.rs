//! # Release Pilot
//!
//! Cut a release of a git repository in one command.
//!
//! A run checks the repository, works out the next semantic version from the
//! latest tag, shows the changelog and asks for confirmation, then bumps the
//! manifest, commits, tags, pushes and creates the remote release.
//!
//! ## Features
//!
//! - **Fail-fast pipeline**: the first failing step stops the run
//! - **Dry run**: every side effect is described instead of performed
//! - **Hooks**: optional pre- and post-release shell commands
//! - **Changelog**: merge commits since the last release, or a custom command
//!
//! ## Usage
//!
//! ```bash
//! release_pilot release minor             # Bump minor version and publish
//! release_pilot --dry-run release patch   # Show what a patch release would do
//! release_pilot changelog                 # Print merges since the latest tag
//! release_pilot init                      # First release of Cargo.toml's version
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod changelog;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod context;
pub mod error;
pub mod events;
pub mod exec;
pub mod git;
pub mod github;
pub mod guard;
pub mod hooks;
pub mod pipeline;
pub mod prompt;
pub mod publish;
pub mod version;

// Re-export main types for public API
pub use config::{HookCommand, StaticConfig};
pub use context::{CurrentVersion, ReleaseContext, ReleaseTarget};
pub use error::{ReleaseError, Result};
pub use events::{EventSink, LogSink, ReleaseEvent};
pub use exec::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use pipeline::{ReleaseFailure, ReleasePhase, ReleasePipeline, ReleaseReport};
pub use prompt::{Prompter, TerminalPrompter};
pub use publish::{
    BumpRequest, BumpSpec, ManifestBumper, ManualReleases, ReleaseApi, ReleaseRequest,
    VersionBumpTool,
};
pub use version::VersionBump;
