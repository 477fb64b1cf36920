//! GitHub release creation over the REST API

use crate::error::{ConfigError, PublishError, Result};
use crate::publish::{ReleaseApi, ReleaseRequest};
use serde::Serialize;

/// Public GitHub API endpoint
pub const GITHUB_API: &str = "https://api.github.com";

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// API token with repository write access
    pub token: String,
    /// Host the repository lives on (`github.com` or an Enterprise host)
    pub host: String,
    /// API base URL override
    pub api_base: Option<String>,
    /// Whether to create draft releases
    pub draft: bool,
}

impl GitHubReleaseConfig {
    /// Config for github.com with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            host: "github.com".to_string(),
            api_base: None,
            draft: false,
        }
    }

    /// API base URL for the configured host
    pub fn api_base(&self) -> String {
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        if self.host == "github.com" {
            GITHUB_API.to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }
}

#[derive(Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
}

/// GitHub release client
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    config: GitHubReleaseConfig,
}

impl GitHubReleases {
    /// Create new GitHub release client
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ApiClient {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Endpoint that creates releases for `owner/project`
    pub fn releases_endpoint(&self, owner: &str, project: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.config.api_base(),
            owner,
            project
        )
    }
}

impl ReleaseApi for GitHubReleases {
    async fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        let endpoint = self.releases_endpoint(&request.owner, &request.project);
        log::debug!("POST {endpoint} (tag {})", request.tag);

        let api_failed = |reason: String| PublishError::ReleaseApiFailed {
            tag: request.tag.clone(),
            reason,
        };

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&CreateReleaseBody {
                tag_name: &request.tag,
                name: &request.title,
                body: &request.body,
                draft: self.config.draft,
            })
            .send()
            .await
            .map_err(|e| api_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_failed(format!("{status}: {}", text.trim())).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_for_public_github() {
        let config = GitHubReleaseConfig::new("t");
        assert_eq!(config.api_base(), "https://api.github.com");
    }

    #[test]
    fn test_api_base_for_enterprise_host() {
        let config = GitHubReleaseConfig {
            host: "git.example.com".to_string(),
            ..GitHubReleaseConfig::new("t")
        };
        assert_eq!(config.api_base(), "https://git.example.com/api/v3");
    }

    #[test]
    fn test_endpoint_uses_override() {
        let releases = GitHubReleases::new(GitHubReleaseConfig {
            api_base: Some("http://localhost:9999/".to_string()),
            ..GitHubReleaseConfig::new("t")
        })
        .unwrap();
        assert_eq!(
            releases.releases_endpoint("acme", "widgets"),
            "http://localhost:9999/repos/acme/widgets/releases"
        );
    }
}
