//! Remote release creation seam.

use crate::error::Result;
use crate::git::RemoteIdentity;
use std::future::Future;

/// Payload for a remote release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub project: String,
    /// Tag the release points at
    pub tag: String,
    /// Release title
    pub title: String,
    /// Release notes (the changelog)
    pub body: String,
}

/// Creates release resources on the repository host
pub trait ReleaseApi {
    /// Create the release
    fn create_release(&self, request: &ReleaseRequest) -> impl Future<Output = Result<()>>;

    /// Link an operator should follow for `tag`
    fn release_link(&self, identity: &RemoteIdentity, tag: &str) -> String {
        identity.release_url(tag)
    }
}

impl<T: ReleaseApi> ReleaseApi for &T {
    fn create_release(&self, request: &ReleaseRequest) -> impl Future<Output = Result<()>> {
        (**self).create_release(request)
    }

    fn release_link(&self, identity: &RemoteIdentity, tag: &str) -> String {
        (**self).release_link(identity, tag)
    }
}

/// Creates nothing; points the operator at the pre-filled "new release" form.
///
/// Used when no API token is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualReleases;

impl ReleaseApi for ManualReleases {
    async fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        log::info!(
            "no API token configured, release {} for {}/{} must be created by hand",
            request.tag,
            request.owner,
            request.project
        );
        Ok(())
    }

    fn release_link(&self, identity: &RemoteIdentity, tag: &str) -> String {
        identity.new_release_url(tag)
    }
}
