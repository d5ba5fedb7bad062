//! Contributor identity merge
//!
//! The roster is keyed by [`roster_key`] (lower-cased handle). Every
//! operation here unions into sets, so re-running any of them over the same
//! input leaves the roster unchanged.

use chrono::Local;
use std::collections::BTreeMap;

use super::roles::{ContributionCategory, ReviewRole};
use crate::github::{GitHubError, LinkChecker, ProfileLookup};
use crate::models::{PersonModel, PersonSet, ReviewRecord, ReviewUser};
use crate::utils::clean::roster_key;
use crate::validator::format_url;

/// Handles listed by one contributor source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceListing {
    pub category: ContributionCategory,
    pub logins: Vec<String>,
}

impl SourceListing {
    pub fn new(category: ContributionCategory, logins: Vec<String>) -> Self {
        Self { category, logins }
    }
}

/// What a merge pass changed
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Handles inserted for the first time
    pub added: Vec<String>,
    /// Handles whose profile lookup failed, with the reason
    pub skipped: BTreeMap<String, GitHubError>,
}

impl MergeReport {
    pub fn merge(&mut self, other: MergeReport) {
        self.added.extend(other.added);
        self.skipped.extend(other.skipped);
    }
}

/// The published contributor roster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    people: BTreeMap<String, PersonModel>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from roster entries; a later entry for the same handle wins
    pub fn from_people(people: impl IntoIterator<Item = PersonModel>) -> Self {
        let mut roster = Self::new();
        for person in people {
            roster.insert(person);
        }
        roster
    }

    pub fn insert(&mut self, person: PersonModel) -> String {
        let key = roster_key(&person.github_username);
        self.people.insert(key.clone(), person);
        key
    }

    pub fn get(&self, handle: &str) -> Option<&PersonModel> {
        self.people.get(&roster_key(handle))
    }

    pub fn get_mut(&mut self, handle: &str) -> Option<&mut PersonModel> {
        self.people.get_mut(&roster_key(handle))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.people.contains_key(&roster_key(handle))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.people.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonModel)> {
        self.people.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries in roster-key order
    pub fn into_people(self) -> Vec<PersonModel> {
        self.people.into_values().collect()
    }

    /// Make sure `handle` is on the roster, looking them up if not.
    ///
    /// Returns `Ok(true)` when a new entry was created.
    pub async fn ensure_person(
        &mut self,
        handle: &str,
        lookup: &dyn ProfileLookup,
        checker: &dyn LinkChecker,
    ) -> Result<bool, GitHubError> {
        if self.contains(handle) {
            return Ok(false);
        }

        tracing::info!("Found a new contributor: {}", handle);
        let profile = lookup.get_user_info(handle).await?;
        let mut person = PersonModel::from_profile(profile);
        if person.github_username.is_empty() {
            person.github_username = handle.to_string();
        }
        person.date_added = Some(Local::now().format("%Y-%m-%d").to_string());
        if let Some(website) = person.website.take() {
            person.website = format_url(&website, checker).await;
        }

        let key = roster_key(handle);
        self.people.insert(key, person);
        Ok(true)
    }

    /// Merge contributor-source listings into the roster.
    ///
    /// New handles are looked up and inserted, then every listed handle gets
    /// the listing's category in `contributor_type`. A failed lookup skips
    /// that handle; authentication and rate-limit failures abort.
    pub async fn combine_sources(
        &mut self,
        listings: &[SourceListing],
        lookup: &dyn ProfileLookup,
        checker: &dyn LinkChecker,
    ) -> Result<MergeReport, GitHubError> {
        let mut report = MergeReport::default();

        for listing in listings {
            for login in &listing.logins {
                let key = roster_key(login);
                if key.is_empty() {
                    continue;
                }
                match self.ensure_person(&key, lookup, checker).await {
                    Ok(true) => report.added.push(key.clone()),
                    Ok(false) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        tracing::error!("Could not add {}: {}", login, e);
                        report.skipped.insert(key, e);
                        continue;
                    }
                }
                if let Some(person) = self.people.get_mut(&key) {
                    person.add_unique_value(PersonSet::ContributorType, [listing.category.label()]);
                }
            }
        }

        Ok(report)
    }

    /// Credit `package` to `handle` for `role`.
    ///
    /// Returns false when `handle` is not on the roster.
    pub fn attribute_package(&mut self, handle: &str, role: ReviewRole, package: &str) -> bool {
        let Some(person) = self.get_mut(handle) else {
            return false;
        };
        person.add_unique_value(role.package_set(), [package.to_lowercase()]);
        person.add_unique_value(PersonSet::ContributorType, role.contributor_types().iter().copied());
        true
    }

    /// Copy the roster's name for `user` into a review user that has none.
    ///
    /// Only the review user changes; the roster is read-only here.
    pub fn backfill_name(&self, user: &mut ReviewUser) -> bool {
        if user.has_name() {
            return false;
        }
        match self.get(&user.github_username).and_then(|p| p.name.clone()) {
            Some(name) if !name.trim().is_empty() => {
                user.name = name;
                true
            }
            _ => false,
        }
    }

    /// Re-fetch every profile from GitHub.
    ///
    /// Overwrites all profile fields except `mastodon`, and `name` unless
    /// the roster has none on file.
    pub async fn refresh_profiles(
        &mut self,
        lookup: &dyn ProfileLookup,
        checker: &dyn LinkChecker,
    ) -> Result<MergeReport, GitHubError> {
        let mut report = MergeReport::default();
        let mut renamed = Vec::new();

        for (key, person) in self.people.iter_mut() {
            tracing::debug!("Refreshing {}", key);
            let previous = person.github_username.clone();
            match lookup.get_user_info(&previous).await {
                Ok(profile) => {
                    person.apply_profile(profile, false);
                    if let Some(website) = person.website.take() {
                        person.website = format_url(&website, checker).await;
                    }
                    let new_key = roster_key(&person.github_username);
                    if new_key != *key {
                        renamed.push((key.clone(), new_key, previous));
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not refresh {}: {}", key, e);
                    report.skipped.insert(key.clone(), e);
                }
            }
        }

        for (old_key, new_key, previous) in renamed {
            if self.people.contains_key(&new_key) {
                tracing::warn!(
                    "{} is now {} on GitHub, which is already on the roster; keeping the old handle",
                    old_key,
                    new_key
                );
                if let Some(person) = self.people.get_mut(&old_key) {
                    person.github_username = previous;
                }
            } else if let Some(person) = self.people.remove(&old_key) {
                tracing::info!("{} is now {} on GitHub", old_key, new_key);
                self.people.insert(new_key, person);
            }
        }

        Ok(report)
    }

    /// Credit everyone on a review team and back-fill names on the record
    pub async fn process_review_team(
        &mut self,
        record: &mut ReviewRecord,
        lookup: &dyn ProfileLookup,
        checker: &dyn LinkChecker,
    ) -> Result<MergeReport, GitHubError> {
        let mut report = MergeReport::default();
        let package = record.package_name.clone();

        for role in ReviewRole::ALL {
            let handles: Vec<String> = role
                .users_mut(record)
                .iter()
                .map(|u| roster_key(&u.github_username))
                .filter(|h| !h.is_empty())
                .collect();

            for handle in &handles {
                match self.ensure_person(handle, lookup, checker).await {
                    Ok(true) => report.added.push(handle.clone()),
                    Ok(false) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        tracing::error!(
                            "Error processing new contributor {}. Skipping this user: {}",
                            handle,
                            e
                        );
                        report.skipped.insert(handle.clone(), e);
                        continue;
                    }
                }
                self.attribute_package(handle, role, &package);
            }

            for user in role.users_mut(record) {
                self.backfill_name(user);
            }
        }

        Ok(report)
    }
}
