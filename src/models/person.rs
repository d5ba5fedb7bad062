//! Roster entry for one contributor
//!
//! The published roster is hand-edited alongside this tool, so hydration is
//! lenient: package/role collections may be missing, `null`, a single string
//! or a list containing nulls, and keys this crate does not model are kept
//! verbatim in `extra` so that re-exporting never drops them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::github::UserProfile;

/// Which membership set of a [`PersonModel`] to update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonSet {
    ContributorType,
    PackagesEic,
    PackagesEditor,
    PackagesSubmitted,
    PackagesReviewed,
}

impl PersonSet {
    pub fn name(&self) -> &'static str {
        match self {
            PersonSet::ContributorType => "contributor_type",
            PersonSet::PackagesEic => "packages_eic",
            PersonSet::PackagesEditor => "packages_editor",
            PersonSet::PackagesSubmitted => "packages_submitted",
            PersonSet::PackagesReviewed => "packages_reviewed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonModel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "login")]
    pub github_username: String,
    #[serde(default, alias = "id")]
    pub github_image_id: Option<u64>,
    #[serde(default, deserialize_with = "strip_newlines")]
    pub bio: Option<String>,
    #[serde(default, alias = "company")]
    pub organization: Option<String>,
    #[serde(default, alias = "blog")]
    pub website: Option<String>,
    #[serde(default, alias = "twitter_username")]
    pub twitter: Option<String>,
    #[serde(default, alias = "mastodon_username")]
    pub mastodon: Option<String>,
    #[serde(default)]
    pub orcidid: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub contributor_type: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub packages_eic: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub packages_editor: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub packages_submitted: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub packages_reviewed: BTreeSet<String>,
    /// Roster keys not modelled here (titles, board flags, sort order, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PersonModel {
    /// Hydrate a first-seen contributor from their GitHub profile
    pub fn from_profile(profile: UserProfile) -> Self {
        let mut person = Self {
            github_username: profile.login.clone(),
            ..Default::default()
        };
        person.apply_profile(profile, true);
        person
    }

    /// Overwrite profile fields from GitHub.
    ///
    /// `mastodon` is only taken when `include_mastodon` is set since the
    /// profile API does not reliably expose it; `name` is only taken when the
    /// roster has none on file.
    pub fn apply_profile(&mut self, profile: UserProfile, include_mastodon: bool) {
        if !self.has_name() {
            self.name = non_empty(profile.name);
        }
        self.github_username = profile.login;
        if profile.id.is_some() {
            self.github_image_id = profile.id;
        }
        self.bio = non_empty(profile.bio).map(|b| b.replace(['\r', '\n'], ""));
        self.organization = non_empty(profile.company);
        self.website = non_empty(profile.blog);
        self.twitter = non_empty(profile.twitter_username);
        self.location = non_empty(profile.location);
        self.email = non_empty(profile.email);
        if include_mastodon {
            self.mastodon = non_empty(profile.mastodon_username);
        }
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Union `values` into one of the membership sets. Re-adding is a no-op.
    pub fn add_unique_value<I, S>(&mut self, set: PersonSet, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = self.set_mut(set);
        target.extend(values.into_iter().map(Into::into));
    }

    pub fn set(&self, set: PersonSet) -> &BTreeSet<String> {
        match set {
            PersonSet::ContributorType => &self.contributor_type,
            PersonSet::PackagesEic => &self.packages_eic,
            PersonSet::PackagesEditor => &self.packages_editor,
            PersonSet::PackagesSubmitted => &self.packages_submitted,
            PersonSet::PackagesReviewed => &self.packages_reviewed,
        }
    }

    fn set_mut(&mut self, set: PersonSet) -> &mut BTreeSet<String> {
        match set {
            PersonSet::ContributorType => &mut self.contributor_type,
            PersonSet::PackagesEic => &mut self.packages_eic,
            PersonSet::PackagesEditor => &mut self.packages_editor,
            PersonSet::PackagesSubmitted => &mut self.packages_submitted,
            PersonSet::PackagesReviewed => &mut self.packages_reviewed,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn strip_newlines<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.replace(['\r', '\n'], "")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SetRepr {
    One(String),
    Many(Vec<Option<String>>),
}

/// Accept `null`, `"x"`, or `[x, null, y]`; lower-case every member
fn lenient_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<SetRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(SetRepr::One(value)) => vec![value],
        Some(SetRepr::Many(values)) => values.into_iter().flatten().collect(),
    };
    Ok(values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER_ENTRY: &str = r#"
name: First Last
github_username: GhId
github_image_id: 7649194
title: [Editor]
board: true
contributor_type:
  - Editor
  - peer-review
packages_editor:
  - pygmt
  - null
packages_submitted: earthpy
packages_reviewed:
bio: "line one\r\nline two"
"#;

    #[test]
    fn test_hydrate_lenient_sets() {
        let person: PersonModel = serde_yaml::from_str(ROSTER_ENTRY).unwrap();
        assert_eq!(
            person.contributor_type.iter().collect::<Vec<_>>(),
            vec!["editor", "peer-review"]
        );
        assert_eq!(person.packages_editor.len(), 1);
        assert!(person.packages_submitted.contains("earthpy"));
        assert!(person.packages_reviewed.is_empty());
        assert_eq!(person.bio.as_deref(), Some("line oneline two"));
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let person: PersonModel = serde_yaml::from_str(ROSTER_ENTRY).unwrap();
        assert!(person.extra.contains_key("title"));
        assert!(person.extra.contains_key("board"));

        let yaml = serde_yaml::to_string(&person).unwrap();
        assert!(yaml.contains("board: true"));
        assert!(yaml.contains("- editor\n- peer-review"));
    }

    #[test]
    fn test_add_unique_value_is_idempotent() {
        let mut person = PersonModel::default();
        person.add_unique_value(PersonSet::ContributorType, ["reviewer", "peer-review"]);
        let once = person.clone();
        person.add_unique_value(PersonSet::ContributorType, ["reviewer", "peer-review"]);
        assert_eq!(person, once);
        assert_eq!(person.set(PersonSet::ContributorType).len(), 2);
    }

    #[test]
    fn test_from_profile_aliases() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"login": "chayadecacao", "id": 123456, "name": "Chaya", "company": "Cacao",
                "blog": "cacao.example", "twitter_username": "cacao", "mastodon_username": null}"#,
        )
        .unwrap();
        let person = PersonModel::from_profile(profile);
        assert_eq!(person.github_username, "chayadecacao");
        assert_eq!(person.github_image_id, Some(123456));
        assert_eq!(person.organization.as_deref(), Some("Cacao"));
        assert_eq!(person.website.as_deref(), Some("cacao.example"));
        assert_eq!(person.twitter.as_deref(), Some("cacao"));
        assert!(person.mastodon.is_none());
    }

    #[test]
    fn test_apply_profile_keeps_name_and_mastodon() {
        let mut person = PersonModel {
            name: Some("Preferred Name".to_string()),
            github_username: "user".to_string(),
            mastodon: Some("@user@fosstodon.org".to_string()),
            ..Default::default()
        };
        let profile = UserProfile {
            login: "user".to_string(),
            name: Some("GitHub Name".to_string()),
            location: Some("Earth".to_string()),
            ..Default::default()
        };
        person.apply_profile(profile, false);
        assert_eq!(person.name.as_deref(), Some("Preferred Name"));
        assert_eq!(person.mastodon.as_deref(), Some("@user@fosstodon.org"));
        assert_eq!(person.location.as_deref(), Some("Earth"));
    }
}
