//! GitHub integration for release operations

mod release_manager;

pub use release_manager::{GITHUB_API, GitHubReleaseConfig, GitHubReleases};
