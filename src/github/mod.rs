//! External collaborators: GitHub and plain HTTP
//!
//! The parser and roster only see the traits below. [`GitHubClient`] is the
//! production implementation; tests substitute in-memory fakes.

pub mod client;
pub mod query;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{GhMeta, Issue, UserProfile};

pub use client::GitHubClient;
pub use query::IssueQuery;

/// Errors talking to GitHub
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Unauthorized request. The GITHUB_TOKEN may be expired or invalid")]
    Unauthorized,

    #[error("API rate limit exceeded and no reset time was reported")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GitHubError {
    /// Errors after which no further request can succeed
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RateLimited)
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Lists review issues
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Every page of issues for the query. With several labels the result
    /// is a superset; see [`crate::parser::filter_issues`].
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>, GitHubError>;
}

/// Fetches the handles listed by one contributor source
#[async_trait]
pub trait ContributorSource: Send + Sync {
    async fn contributor_logins(&self, url: &str) -> Result<Vec<String>, GitHubError>;
}

/// Looks up a GitHub user's public profile
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// A 401 is [`GitHubError::Unauthorized`], never a per-handle skip
    async fn get_user_info(&self, handle: &str) -> Result<UserProfile, GitHubError>;
}

/// Looks up repository statistics
#[async_trait]
pub trait RepoMetrics: Send + Sync {
    /// `None` when the repository is missing, private, or otherwise
    /// unavailable
    async fn get_repo_meta(&self, owner: &str, repo: &str) -> Result<Option<GhMeta>, GitHubError>;
}

/// Probes whether a URL resolves
#[async_trait]
pub trait LinkChecker: Send + Sync {
    async fn check_url(&self, url: &str) -> bool;
}

/// Accepts every URL. Used when liveness checks are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllLinks;

#[async_trait]
impl LinkChecker for AcceptAllLinks {
    async fn check_url(&self, _url: &str) -> bool {
        true
    }
}
