use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::github::GhMeta;

const GITHUB_PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "https://www.github.com/",
    "github.com/",
];

/// A participant named in a review issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewUser {
    /// Display name, empty when the issue only gives a handle
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// GitHub handle with its original casing
    pub github_username: String,
}

impl ReviewUser {
    /// Build a user, stripping link syntax from both parts
    pub fn new(name: impl Into<String>, github_username: impl Into<String>) -> Self {
        Self {
            name: demarkdown_name(&name.into()),
            github_username: deurl_username(&github_username.into()),
        }
    }

    /// Whether a display name is on file
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

fn demarkdown_name(name: &str) -> String {
    name.replace(['[', ']'], "").trim().to_string()
}

/// Reduce `[handle](https://github.com/handle)` or a profile URL to the handle
fn deurl_username(handle: &str) -> String {
    let mut handle = handle.trim();
    if let Some((label, _)) = handle.split_once("](") {
        handle = label;
    }
    let mut handle = handle.replace(['[', ']'], "");
    for prefix in GITHUB_PREFIXES {
        if let Some(rest) = handle.strip_prefix(prefix) {
            handle = rest.to_string();
        }
    }
    handle.trim().trim_end_matches('/').to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Holder for a review role that is singular in some template eras and plural
/// in others.
///
/// Internally always a list. Serializes as `null` when empty, as a single
/// mapping when it holds one user, and as a sequence otherwise, which is the
/// shape the published package file has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team(Vec<ReviewUser>);

impl Team {
    pub fn new(users: Vec<ReviewUser>) -> Self {
        Self(users)
    }

    /// The single-user view of the role (first listed user)
    pub fn single(&self) -> Option<&ReviewUser> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewUser> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ReviewUser> {
        self.0.iter_mut()
    }

    pub fn users(&self) -> &[ReviewUser] {
        &self.0
    }

    pub fn into_users(self) -> Vec<ReviewUser> {
        self.0
    }
}

impl From<Vec<ReviewUser>> for Team {
    fn from(users: Vec<ReviewUser>) -> Self {
        Self(users)
    }
}

impl From<ReviewUser> for Team {
    fn from(user: ReviewUser) -> Self {
        Self(vec![user])
    }
}

impl<'a> IntoIterator for &'a Team {
    type Item = &'a ReviewUser;
    type IntoIter = std::slice::Iter<'a, ReviewUser>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [] => serializer.serialize_none(),
            [only] => only.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TeamRepr {
    One(ReviewUser),
    Many(Vec<ReviewUser>),
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<TeamRepr>::deserialize(deserializer)? {
            None => Team::default(),
            Some(TeamRepr::One(user)) => Team(vec![user]),
            Some(TeamRepr::Many(users)) => Team(users),
        })
    }
}

/// One software submission's review state, as published in the package file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub package_name: String,
    #[serde(default)]
    pub package_description: String,
    #[serde(default)]
    pub submitting_author: Option<ReviewUser>,
    #[serde(default, deserialize_with = "listify_users")]
    pub all_current_maintainers: Vec<ReviewUser>,
    pub repository_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_submitted: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub editor: Team,
    #[serde(default)]
    pub eic: Team,
    #[serde(default)]
    pub reviewers: Vec<ReviewUser>,
    #[serde(default)]
    pub archive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_accepted: Option<String>,
    #[serde(default = "missing_date")]
    pub date_accepted: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issue_link: String,
    #[serde(default)]
    pub joss: Option<String>,
    #[serde(default)]
    pub partners: Option<Vec<String>>,
    #[serde(default)]
    pub gh_meta: Option<GhMeta>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn missing_date() -> String {
    "missing".to_string()
}

fn default_active() -> bool {
    true
}

fn listify_users<'de, D>(deserializer: D) -> Result<Vec<ReviewUser>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Team::deserialize(deserializer)?.into_users())
}

impl ReviewRecord {
    /// `owner/repo` when the repository lives on github.com
    pub fn github_repo(&self) -> Option<(String, String)> {
        let rest = self
            .repository_link
            .strip_prefix("https://github.com/")
            .or_else(|| self.repository_link.strip_prefix("https://www.github.com/"))?;
        let mut parts = rest.split('/').filter(|p| !p.is_empty());
        let owner = parts.next()?;
        let repo = parts.next()?;
        Some((owner.to_string(), repo.trim_end_matches(".git").to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_user_strips_github_url() {
        let user = ReviewUser::new("[Jane Doe]", "https://github.com/janedoe");
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.github_username, "janedoe");
    }

    #[test]
    fn test_review_user_strips_markdown_link() {
        let user = ReviewUser::new("", "[janedoe](https://github.com/janedoe)");
        assert_eq!(user.github_username, "janedoe");
    }

    #[test]
    fn test_team_serializes_by_cardinality() {
        let empty = Team::default();
        assert_eq!(serde_yaml::to_string(&empty).unwrap().trim(), "null");

        let one = Team::from(ReviewUser::new("", "cmarmo"));
        let yaml = serde_yaml::to_string(&one).unwrap();
        assert!(yaml.starts_with("name:"));

        let two = Team::new(vec![ReviewUser::new("", "a"), ReviewUser::new("", "b")]);
        let yaml = serde_yaml::to_string(&two).unwrap();
        assert!(yaml.starts_with("- name:"));
    }

    #[test]
    fn test_team_deserializes_either_shape() {
        let one: Team = serde_yaml::from_str("name: ''\ngithub_username: cmarmo\n").unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.single().unwrap().github_username, "cmarmo");

        let many: Team = serde_yaml::from_str(
            "- name: A\n  github_username: a\n- name: null\n  github_username: b\n",
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many.users()[1].name, "");

        let none: Team = serde_yaml::from_str("null").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_github_repo_pair() {
        let yaml = r#"
package_name: sunpy
repository_link: https://github.com/sunpy/sunpy
created_at: 2023-10-30T18:45:06Z
updated_at: 2024-02-22T01:24:31Z
"#;
        let record: ReviewRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            record.github_repo(),
            Some(("sunpy".to_string(), "sunpy".to_string()))
        );
        assert_eq!(record.date_accepted, "missing");
        assert!(record.active);
    }
}
