//! Issue-tracker client speaking the GitHub REST API.
//!
//! Creates issues from tasks and lists the repositories the configured
//! token can reach. Repository listing degrades to an empty list on any
//! failure; issue creation reports errors to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use focal_core::{Error, Result};

/// Default API endpoint.
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Media type pinning the v3 REST API.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Configuration for the issue-tracker client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// Personal access token; absent leaves the client disabled.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_URL.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// A repository visible to the configured token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub private: bool,
}

/// Response shape for a created issue.
#[derive(Debug, Deserialize)]
struct CreatedIssue {
    html_url: String,
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct GithubErrorResponse {
    message: String,
}

/// Client for a GitHub-style issue API.
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GithubConfig) -> Result<Self> {
        // The API rejects requests without a User-Agent.
        let client = Client::builder()
            .user_agent("focal")
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing issue-tracker client: url={}, configured={}",
            config.base_url,
            config.token.is_some()
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// Reads `GITHUB_BASE_URL`, `GITHUB_TOKEN`, and `GITHUB_TIMEOUT_SECONDS`.
    /// A missing token leaves the client constructed but disabled.
    pub fn from_env() -> Result<Self> {
        let config = GithubConfig {
            base_url: std::env::var("GITHUB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GITHUB_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok(),
            timeout_seconds: std::env::var("GITHUB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Self::new(config)
    }

    /// Whether an access token is present.
    pub fn is_configured(&self) -> bool {
        self.config.token.is_some()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Open an issue in the given `owner/repo` and return its URL.
    pub async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<String> {
        let token = self.config.token.as_ref().ok_or_else(|| {
            Error::Config("Issue-tracker integration is not configured".to_string())
        })?;

        debug!("Creating issue in {}: {}", repo, title);

        let url = format!(
            "{}/repos/{}/issues",
            self.config.base_url.trim_end_matches('/'),
            repo
        );
        let request = json!({
            "title": title,
            "body": body,
            "labels": labels,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", token))
            .header("Accept", ACCEPT_HEADER)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Sync(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: GithubErrorResponse = response.json().await.unwrap_or(GithubErrorResponse {
                message: "Unknown error".to_string(),
            });
            return Err(Error::Sync(format!(
                "Issue tracker returned {}: {}",
                status, body.message
            )));
        }

        let issue: CreatedIssue = response
            .json()
            .await
            .map_err(|e| Error::Sync(format!("Failed to parse response: {}", e)))?;

        debug!("Created issue {}", issue.html_url);
        Ok(issue.html_url)
    }

    /// List repositories visible to the token.
    ///
    /// Returns an empty list when the client is unconfigured or the
    /// request fails, so callers never surface listing errors.
    pub async fn list_repos(&self) -> Vec<GithubRepo> {
        let token = match &self.config.token {
            Some(token) => token,
            None => {
                warn!("Repository listing skipped: integration not configured");
                return Vec::new();
            }
        };

        let url = format!("{}/user/repos", self.config.base_url.trim_end_matches('/'));
        let response = match self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", token))
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Repository listing failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!("Repository listing returned {}", response.status());
            return Vec::new();
        }

        match response.json().await {
            Ok(repos) => repos,
            Err(e) => {
                warn!("Failed to parse repository listing: {}", e);
                Vec::new()
            }
        }
    }
}
