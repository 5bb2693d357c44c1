pub mod types;

pub use types::{CommentResponse, PrRef, PullRequestDetails};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{GitHubConfig, HttpConfig};

const GITHUB_JSON: &str = "application/vnd.github+json";
const GITHUB_DIFF: &str = "application/vnd.github.v3.diff";
const USER_AGENT: &str = "pr-reviewer";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{status} - {body}")]
    Api { status: u16, body: String },

    #[error("Invalid --repo-name format. Expected 'owner/repo-name', got '{0}'")]
    InvalidRepoName(String),

    #[error("GitHub returned an empty diff")]
    EmptyDiff,
}

/// Build a [`PrRef`] from an `owner/repo` string and a PR number.
///
/// The string must split on `/` into exactly two non-empty parts.
pub fn parse_repo_name(repo_name: &str, number: u64) -> Result<PrRef, PrError> {
    let invalid = || PrError::InvalidRepoName(repo_name.to_string());

    let (owner, repo) = repo_name.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }

    Ok(PrRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

/// The code-hosting side of a review run.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetch the pull request's metadata, including its title.
    async fn fetch_details(&self, pr: &PrRef) -> Result<PullRequestDetails, PrError>;

    /// Fetch the pull request's unified diff.
    async fn fetch_diff(&self, pr: &PrRef) -> Result<String, PrError>;

    /// Post `body` as an issue comment on the pull request.
    ///
    /// A rejected post is not an error: the response is returned either way
    /// and only transport failures produce `Err`.
    async fn post_comment(&self, pr: &PrRef, body: &str) -> Result<CommentResponse, PrError>;
}

/// GitHub REST API client. Every request carries the same token.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(github: &GitHubConfig, http: &HttpConfig) -> Result<Self, PrError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        Ok(Self {
            http: client,
            api_url: github.api_url.trim_end_matches('/').to_string(),
            token: github.token.clone(),
        })
    }

    fn pull_url(&self, pr: &PrRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn comments_url(&self, pr: &PrRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn request(&self, method: Method, url: &str, accept: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, accept)
    }
}

/// Turn a non-200 response into [`PrError::Api`], keeping the body for the report.
async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, PrError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "GitHub API returned an error");
    Err(PrError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    #[instrument(skip(self), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
    async fn fetch_details(&self, pr: &PrRef) -> Result<PullRequestDetails, PrError> {
        debug!("fetching PR metadata from GitHub API");
        let response = self
            .request(Method::GET, &self.pull_url(pr), GITHUB_JSON)
            .send()
            .await?;
        let raw = expect_ok(response).await?.json::<Map<String, Value>>().await?;

        let details = PullRequestDetails::from_metadata(raw);
        debug!(title = %details.title, fields = details.raw.len(), "received PR metadata");
        Ok(details)
    }

    #[instrument(skip(self), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
    async fn fetch_diff(&self, pr: &PrRef) -> Result<String, PrError> {
        debug!("fetching PR diff from GitHub API");
        let response = self
            .request(Method::GET, &self.pull_url(pr), GITHUB_DIFF)
            .send()
            .await?;
        let diff_text = expect_ok(response).await?.text().await?;

        debug!(diff_bytes = diff_text.len(), "received PR diff");
        Ok(diff_text)
    }

    #[instrument(skip(self, body), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number, body_bytes = body.len()))]
    async fn post_comment(&self, pr: &PrRef, body: &str) -> Result<CommentResponse, PrError> {
        debug!("posting review comment");
        let response = self
            .request(Method::POST, &self.comments_url(pr), GITHUB_JSON)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::CREATED {
            debug!("comment created");
        } else {
            warn!(status = status.as_u16(), body = %text, "GitHub rejected the comment");
        }

        Ok(CommentResponse {
            status: status.as_u16(),
            body: text,
        })
    }
}
