use chrono::NaiveDate;

use super::GitHubError;

/// Which review issues to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub org: String,
    pub repo: String,
    /// Issues carrying any of these labels. Empty means all issues.
    pub labels: Vec<String>,
    /// Only issues updated on or after this date
    pub since: Option<NaiveDate>,
}

impl IssueQuery {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            labels: Vec::new(),
            since: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since;
        self
    }

    /// Parse a `YYYY-MM-DD` cutoff date
    pub fn parse_since(since: &str) -> Result<NaiveDate, GitHubError> {
        NaiveDate::parse_from_str(since.trim(), "%Y-%m-%d").map_err(|_| {
            GitHubError::InvalidRequest(format!(
                "Invalid since date '{}'. Please use YYYY-MM-DD.",
                since
            ))
        })
    }

    /// REST endpoint for the first page.
    ///
    /// The REST API ANDs multiple labels, so the label parameter is only sent
    /// when exactly one label is wanted. Callers filter the rest client-side.
    pub fn endpoint(&self, api_base: &str) -> String {
        let mut params = vec!["state=all".to_string(), "per_page=100".to_string()];
        if let [label] = self.labels.as_slice() {
            params.push(format!("labels={}", encode_label(label)));
        }
        if let Some(since) = self.since {
            params.push(format!("since={}", since.format("%Y-%m-%d")));
        }
        format!(
            "{}/repos/{}/{}/issues?{}",
            api_base.trim_end_matches('/'),
            self.org,
            self.repo,
            params.join("&")
        )
    }
}

/// Percent-encode the characters review labels actually contain
fn encode_label(label: &str) -> String {
    label
        .replace('%', "%25")
        .replace(' ', "%20")
        .replace('/', "%2F")
        .replace('&', "%26")
        .replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "https://api.github.com";

    #[test]
    fn test_endpoint_no_labels() {
        let query = IssueQuery::new("pyOpenSci", "software-submission");
        assert_eq!(
            query.endpoint(API),
            "https://api.github.com/repos/pyOpenSci/software-submission/issues?state=all&per_page=100"
        );
    }

    #[test]
    fn test_endpoint_single_label() {
        let query = IssueQuery::new("pyOpenSci", "software-submission")
            .with_labels(vec!["6/pyOS-approved".to_string()]);
        assert!(query.endpoint(API).ends_with("&labels=6%2FpyOS-approved"));
    }

    #[test]
    fn test_endpoint_many_labels_omits_param() {
        let query = IssueQuery::new("o", "r")
            .with_labels(vec!["a".to_string(), "b".to_string()]);
        assert!(!query.endpoint(API).contains("labels="));
    }

    #[test]
    fn test_endpoint_since() {
        let since = IssueQuery::parse_since("2024-01-31").unwrap();
        let query = IssueQuery::new("o", "r").with_since(Some(since));
        assert!(query.endpoint(API).ends_with("&since=2024-01-31"));
    }

    #[test]
    fn test_parse_since_rejects_other_formats() {
        assert!(IssueQuery::parse_since("01/31/2024").is_err());
    }
}
