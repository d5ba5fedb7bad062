//! Review roles and contribution categories
//!
//! Each role a person can hold in a review maps to one package set on their
//! roster entry plus the contributor-type labels it earns.

use crate::models::{PersonSet, ReviewRecord, ReviewUser};

/// A seat on a review team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRole {
    Reviewers,
    Editor,
    SubmittingAuthor,
    AllCurrentMaintainers,
    Eic,
}

impl ReviewRole {
    pub const ALL: [ReviewRole; 5] = [
        ReviewRole::Reviewers,
        ReviewRole::Editor,
        ReviewRole::SubmittingAuthor,
        ReviewRole::AllCurrentMaintainers,
        ReviewRole::Eic,
    ];

    /// Package set credited for this role
    pub fn package_set(&self) -> PersonSet {
        match self {
            ReviewRole::Reviewers => PersonSet::PackagesReviewed,
            ReviewRole::Editor => PersonSet::PackagesEditor,
            ReviewRole::SubmittingAuthor | ReviewRole::AllCurrentMaintainers => {
                PersonSet::PackagesSubmitted
            }
            ReviewRole::Eic => PersonSet::PackagesEic,
        }
    }

    /// Contributor-type labels earned by this role
    pub fn contributor_types(&self) -> &'static [&'static str] {
        match self {
            ReviewRole::Reviewers => &["reviewer", "peer-review"],
            ReviewRole::Editor => &["editor", "peer-review"],
            ReviewRole::SubmittingAuthor => &["maintainer", "submitting-author", "peer-review"],
            ReviewRole::AllCurrentMaintainers => &["maintainer", "peer-review"],
            ReviewRole::Eic => &["eic", "peer-review"],
        }
    }

    /// Field name on a review record
    pub fn field_name(&self) -> &'static str {
        match self {
            ReviewRole::Reviewers => "reviewers",
            ReviewRole::Editor => "editor",
            ReviewRole::SubmittingAuthor => "submitting_author",
            ReviewRole::AllCurrentMaintainers => "all_current_maintainers",
            ReviewRole::Eic => "eic",
        }
    }

    /// The people holding this role on a review
    pub fn users_mut<'a>(&self, record: &'a mut ReviewRecord) -> Vec<&'a mut ReviewUser> {
        match self {
            ReviewRole::Reviewers => record.reviewers.iter_mut().collect(),
            ReviewRole::Editor => record.editor.iter_mut().collect(),
            ReviewRole::SubmittingAuthor => record.submitting_author.iter_mut().collect(),
            ReviewRole::AllCurrentMaintainers => record.all_current_maintainers.iter_mut().collect(),
            ReviewRole::Eic => record.eic.iter_mut().collect(),
        }
    }
}

/// What kind of contribution a contributor-source listing records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionCategory {
    PeerReviewGuide,
    PackageGuide,
    WebContrib,
    CodeContrib,
    Community,
}

impl ContributionCategory {
    /// Classify a source by the repository named in its URL or path
    pub fn classify(source: &str) -> Self {
        if source.contains("software-peer-review") {
            ContributionCategory::PeerReviewGuide
        } else if source.contains("python-package-guide") {
            ContributionCategory::PackageGuide
        } else if source.contains("pyopensci.github.io") {
            ContributionCategory::WebContrib
        } else if source.contains("pyosmeta") || source.contains("update-web-metadata") {
            ContributionCategory::CodeContrib
        } else {
            ContributionCategory::Community
        }
    }

    /// Contributor-type label stored on roster entries
    pub fn label(&self) -> &'static str {
        match self {
            ContributionCategory::PeerReviewGuide => "peer-review-guide",
            ContributionCategory::PackageGuide => "package-guide",
            ContributionCategory::WebContrib => "web-contrib",
            ContributionCategory::CodeContrib => "code-contrib",
            ContributionCategory::Community => "community",
        }
    }
}

impl std::fmt::Display for ContributionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw URL of a repository's all-contributors file
pub fn contributor_source_url(org: &str, repo: &str, branch: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}/.all-contributorsrc",
        org, repo, branch
    )
}
