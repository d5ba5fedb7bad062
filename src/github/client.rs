//! GitHub REST/GraphQL client
//!
//! Handles token auth, `Link` header pagination and the `X-RateLimit-*`
//! headers. The token is passed in by the caller; nothing here reads the
//! environment.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, LINK};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{
    ContributorSource, GitHubError, IssueQuery, IssueSource, LinkChecker, ProfileLookup,
    RepoMetrics,
};
use crate::models::{GhMeta, Issue, UserProfile};

pub const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("reviewmeta/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

const REPO_METRICS_QUERY: &str = r#"
query($owner: String!, $name: String!) {
    repository(owner: $owner, name: $name) {
        name
        description
        homepageUrl
        createdAt
        stargazers { totalCount }
        watchers { totalCount }
        issues(states: OPEN) { totalCount }
        forks { totalCount }
        defaultBranchRef {
            target {
                ... on Commit {
                    history(first: 1) {
                        edges { node { committedDate } }
                    }
                }
            }
        }
    }
}
"#;

/// GitHub API client
pub struct GitHubClient {
    http_client: reqwest::Client,
    token: Option<String>,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self, GitHubError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::warn!("No GITHUB_TOKEN set; requests are unauthenticated and heavily rate limited");
        }

        Ok(Self {
            http_client,
            token,
            api_base: GITHUB_API_URL.to_string(),
        })
    }

    /// Point the client at another API root (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    /// GET `url`, waiting out an exhausted rate limit once
    async fn send_get(&self, url: &str) -> Result<Response, GitHubError> {
        let mut waited = false;
        loop {
            tracing::debug!(url = %url, "GET");
            let response = self.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(GitHubError::Unauthorized);
            }
            if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
                match rate_limit_wait(response.headers()) {
                    Some(wait) if !waited => {
                        tracing::warn!("Rate limit reached, sleeping {:?}", wait);
                        tokio::time::sleep(wait).await;
                        waited = true;
                        continue;
                    }
                    Some(_) => return Err(GitHubError::RateLimited),
                    None if is_rate_limited(response.headers()) => {
                        return Err(GitHubError::RateLimited)
                    }
                    None => {}
                }
            }
            if status == StatusCode::NOT_FOUND {
                return Err(GitHubError::NotFound(url.to_string()));
            }

            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api(status.as_u16(), text));
        }
    }

    /// GET every page of a JSON array endpoint
    async fn get_pages<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, GitHubError> {
        let mut results = Vec::new();
        let mut next = Some(url.to_string());

        while let Some(url) = next {
            let response = self.send_get(&url).await?;
            let headers = response.headers().clone();
            let page: Vec<T> = response
                .json()
                .await
                .map_err(|e| GitHubError::Parse(e.to_string()))?;
            results.extend(page);

            next = headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);
            if let Some(wait) = rate_limit_wait(&headers) {
                tracing::warn!("Rate limit exhausted, sleeping {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        Ok(results)
    }

    async fn contrib_count(&self, owner: &str, repo: &str) -> Result<Option<u64>, GitHubError> {
        let url = format!("{}/repos/{}/{}/contributors?per_page=100", self.api_base, owner, repo);
        match self.get_pages::<Value>(&url).await {
            Ok(contributors) if !contributors.is_empty() => Ok(Some(contributors.len() as u64)),
            Ok(_) | Err(GitHubError::NotFound(_)) => {
                tracing::warn!("Repository not found: {}. Did the repo URL change?", url);
                Ok(None)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!("Could not count contributors for {}/{}: {}", owner, repo, e);
                Ok(None)
            }
        }
    }

    async fn graphql_metrics(&self, owner: &str, repo: &str) -> Result<Option<GhMeta>, GitHubError> {
        let mut request = self
            .http_client
            .post(format!("{}/graphql", self.api_base))
            .json(&json!({
                "query": REPO_METRICS_QUERY,
                "variables": { "owner": owner, "name": repo },
            }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(GitHubError::Unauthorized),
            StatusCode::NOT_FOUND => {
                tracing::warn!("Repository not found: {}/{}. Did the repo URL change?", owner, repo);
                return Ok(None);
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!("You may have hit an API limit for repository: {}/{}", owner, repo);
                return Ok(None);
            }
            other => {
                tracing::warn!("Unexpected HTTP error: {} for repository: {}/{}", other, owner, repo);
                return Ok(None);
            }
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))?;
        let Some(repository) = body.data.and_then(|d| d.repository) else {
            tracing::warn!(
                "Repository metrics not available (it may not be on GitHub?): {}/{}",
                owner,
                repo
            );
            return Ok(None);
        };

        Ok(Some(repository.into_meta()))
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>, GitHubError> {
        let issues: Vec<Issue> = self.get_pages(&query.endpoint(&self.api_base)).await?;
        tracing::info!("Fetched {} issues from {}/{}", issues.len(), query.org, query.repo);
        Ok(issues)
    }
}

#[async_trait]
impl ContributorSource for GitHubClient {
    async fn contributor_logins(&self, url: &str) -> Result<Vec<String>, GitHubError> {
        let value: Value = self
            .send_get(url)
            .await?
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))?;
        logins_from_listing(&value)
            .ok_or_else(|| GitHubError::Parse(format!("No contributor list in {}", url)))
    }
}

#[async_trait]
impl ProfileLookup for GitHubClient {
    async fn get_user_info(&self, handle: &str) -> Result<UserProfile, GitHubError> {
        let url = format!("{}/users/{}", self.api_base, handle.trim());
        self.send_get(&url)
            .await?
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RepoMetrics for GitHubClient {
    async fn get_repo_meta(&self, owner: &str, repo: &str) -> Result<Option<GhMeta>, GitHubError> {
        let Some(mut meta) = self.graphql_metrics(owner, repo).await? else {
            return Ok(None);
        };
        meta.contrib_count = self.contrib_count(owner, repo).await?;
        Ok(Some(meta.with_clean_dates()))
    }
}

#[async_trait]
impl LinkChecker for GitHubClient {
    async fn check_url(&self, url: &str) -> bool {
        match self.http_client.get(url).send().await {
            Ok(response) => {
                tracing::debug!(url = %url, status = %response.status(), "Checked URL");
                response.status().is_success()
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "URL did not resolve");
                false
            }
        }
    }
}

/// `<url>; rel="next"` out of a `Link` header
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let (url, params) = part.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| url.trim().trim_start_matches('<').trim_end_matches('>').to_string())
    })
}

/// Logins out of a contributor listing: either `{"contributors": [...]}`
/// (all-contributors format) or a bare array of `{login}` objects
pub fn logins_from_listing(value: &Value) -> Option<Vec<String>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => map.get("contributors")?.as_array()?,
        _ => return None,
    };
    Some(
        entries
            .iter()
            .filter_map(|entry| entry.get("login")?.as_str())
            .map(str::to_string)
            .collect(),
    )
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    header_u64(headers, "x-ratelimit-remaining") == Some(0)
}

/// How long to wait when the rate limit is exhausted and a reset time is known
fn rate_limit_wait(headers: &HeaderMap) -> Option<Duration> {
    if !is_rate_limited(headers) {
        return None;
    }
    let reset = header_u64(headers, "x-ratelimit-reset")?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Some(Duration::from_secs(reset.saturating_sub(now) + 1))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    repository: Option<GraphQlRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRepository {
    name: String,
    description: Option<String>,
    homepage_url: Option<String>,
    created_at: String,
    stargazers: TotalCount,
    watchers: TotalCount,
    issues: TotalCount,
    forks: TotalCount,
    default_branch_ref: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

impl GraphQlRepository {
    fn into_meta(self) -> GhMeta {
        let last_commit = self
            .default_branch_ref
            .as_ref()
            .and_then(|r| r.pointer("/target/history/edges/0/node/committedDate"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        GhMeta {
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            stargazers_count: self.stargazers.total_count,
            watchers_count: self.watchers.total_count,
            open_issues_count: self.issues.total_count,
            forks_count: self.forks.total_count,
            documentation: self.homepage_url.filter(|u| !u.trim().is_empty()),
            contrib_count: None,
            last_commit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_creation() {
        assert!(GitHubClient::new(Some("token".to_string())).is_ok());
        assert!(GitHubClient::new(None).is_ok());
    }

    #[test]
    fn test_next_page_url() {
        let header = r#"<https://api.github.com/repositories/1/issues?page=2>; rel="next", <https://api.github.com/repositories/1/issues?page=5>; rel="last""#;
        assert_eq!(
            next_page_url(header),
            Some("https://api.github.com/repositories/1/issues?page=2".to_string())
        );
        assert_eq!(
            next_page_url(r#"<https://x/issues?page=1>; rel="prev""#),
            None
        );
    }

    #[test]
    fn test_logins_from_listing() {
        let rc = json!({"projectName": "x", "contributors": [{"login": "a"}, {"login": "B"}, {"name": "no login"}]});
        assert_eq!(logins_from_listing(&rc), Some(vec!["a".to_string(), "B".to_string()]));

        let bare = json!([{"login": "c"}]);
        assert_eq!(logins_from_listing(&bare), Some(vec!["c".to_string()]));

        assert_eq!(logins_from_listing(&json!({"other": 1})), None);
    }

    #[test]
    fn test_rate_limit_wait() {
        let mut headers = HeaderMap::new();
        assert_eq!(rate_limit_wait(&headers), None);

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert_eq!(rate_limit_wait(&headers), None);
        assert!(is_rate_limited(&headers));

        headers.insert("x-ratelimit-reset", HeaderValue::from_static("0"));
        assert_eq!(rate_limit_wait(&headers), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_graphql_repository_into_meta() {
        let body: GraphQlResponse = serde_json::from_value(json!({
            "data": {"repository": {
                "name": "sunpy",
                "description": "SunPy",
                "homepageUrl": "https://sunpy.org",
                "createdAt": "2011-06-19T10:24:15Z",
                "stargazers": {"totalCount": 860},
                "watchers": {"totalCount": 44},
                "issues": {"totalCount": 400},
                "forks": {"totalCount": 570},
                "defaultBranchRef": {"target": {"history": {"edges": [
                    {"node": {"committedDate": "2024-02-21T15:00:00Z"}}
                ]}}}
            }}
        }))
        .unwrap();

        let meta = body.data.unwrap().repository.unwrap().into_meta().with_clean_dates();
        assert_eq!(meta.created_at, "2011-06-19");
        assert_eq!(meta.last_commit, "2024-02-21");
        assert_eq!(meta.forks_count, 570);
        assert_eq!(meta.documentation.as_deref(), Some("https://sunpy.org"));
    }
}
