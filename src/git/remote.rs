//! Repository identity derived from a git remote URL.

use std::fmt;
use url::Url;

/// Host, owner and project of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity {
    /// Host name, e.g. `github.com`
    pub host: String,
    /// Owner or organisation
    pub owner: String,
    /// Repository name without `.git`
    pub project: String,
}

impl RemoteIdentity {
    /// Parse owner/project from a git remote URL
    ///
    /// Supports Git URL formats:
    /// - SSH SCP-like: git@github.com:owner/repo.git
    /// - HTTPS: https://github.com/owner/repo.git
    /// - SSH protocol: ssh://git@github.com/owner/repo.git
    pub fn parse(remote_url: &str) -> Result<Self, String> {
        let remote_url = remote_url.trim();
        if remote_url.is_empty() {
            return Err("remote URL is empty".to_string());
        }

        // SCP-like syntax has no scheme and a ':' separating host and path
        if !remote_url.contains("://")
            && let Some((user_host, path)) = remote_url.split_once(':')
        {
            let host = user_host.rsplit('@').next().unwrap_or(user_host);
            return Self::from_parts(host, path, remote_url);
        }

        let url = Url::parse(remote_url).map_err(|e| format!("'{remote_url}' is not a URL: {e}"))?;
        let host = url
            .host_str()
            .ok_or_else(|| format!("'{remote_url}' has no host"))?;
        Self::from_parts(host, url.path(), remote_url)
    }

    fn from_parts(host: &str, path: &str, remote_url: &str) -> Result<Self, String> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [owner, project] if !host.is_empty() => Ok(Self {
                host: host.to_string(),
                owner: owner.to_string(),
                project: project.to_string(),
            }),
            _ => Err(format!(
                "could not parse owner/project from '{remote_url}'"
            )),
        }
    }

    /// Web URL of the repository
    pub fn web_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.project)
    }

    /// Link to the release page for `tag`
    pub fn release_url(&self, tag: &str) -> String {
        format!("{}/releases/tag/{}", self.web_url(), tag)
    }

    /// Link to the pre-filled "new release" form for `tag`
    pub fn new_release_url(&self, tag: &str) -> String {
        format!("{}/releases/new?tag={}", self.web_url(), tag)
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.project)
    }
}
