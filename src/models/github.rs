//! Shapes exchanged with GitHub
//!
//! These mirror the subset of the REST/GraphQL payloads the parser and the
//! roster consume. Unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::clean::clean_date;

/// An issue label. The API returns objects, hand-written fixtures often use
/// bare strings; both deserialize.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Plain(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match LabelRepr::deserialize(deserializer)? {
            LabelRepr::Plain(name) => Label::new(name),
            LabelRepr::Full { name, description } => Label { name, description },
        })
    }
}

/// A review issue as returned by the issues endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// API URL of the issue
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Issue {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }

    /// True if the issue carries any of `wanted` (OR semantics, case-insensitive)
    pub fn has_any_label(&self, wanted: &[String]) -> bool {
        wanted.is_empty()
            || self
                .labels
                .iter()
                .any(|l| wanted.iter().any(|w| w.eq_ignore_ascii_case(&l.name)))
    }

    /// Browser URL for the issue
    pub fn html_link(&self) -> String {
        self.url
            .replace("https://api.github.com/repos/", "https://github.com/")
    }
}

/// Public profile of a GitHub user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub mastodon_username: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
}

/// Repository health snapshot attached to a published review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GhMeta {
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub open_issues_count: u64,
    pub forks_count: u64,
    pub documentation: Option<String>,
    pub contrib_count: Option<u64>,
    pub last_commit: String,
}

impl GhMeta {
    /// Normalize the two timestamps to `YYYY-MM-DD`
    pub fn with_clean_dates(mut self) -> Self {
        self.created_at = clean_date(Some(&self.created_at));
        self.last_commit = clean_date(Some(&self.last_commit));
        self
    }
}
