use serde_json::{Map, Value};
use std::fmt;

const NO_TITLE: &str = "No Title Available";

/// Identifies the pull request a run works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} PR #{}", self.owner, self.repo, self.number)
    }
}

/// Pull request metadata as returned by `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Clone)]
pub struct PullRequestDetails {
    pub title: String,
    /// The full JSON object.
    pub raw: Map<String, Value>,
}

impl PullRequestDetails {
    pub fn from_metadata(raw: Map<String, Value>) -> Self {
        let title = raw
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(NO_TITLE)
            .to_string();
        Self { title, raw }
    }
}

/// What the hosting API answered when a comment was posted.
/// Returned for rejected posts too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentResponse {
    pub status: u16,
    pub body: String,
}

impl CommentResponse {
    pub fn is_created(&self) -> bool {
        self.status == 201
    }
}
