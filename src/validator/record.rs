//! Review record assembly
//!
//! Turns parsed header fields, checklist extractions and issue metadata into
//! a [`ReviewRecord`], normalizing every field on the way in. Alias keys from
//! older templates are resolved here.

use crate::github::LinkChecker;
use crate::models::{Issue, RecordError, ReviewRecord, Team};
use crate::parser::checklist::{partner_programs, scope_categories};
use crate::parser::header::HeaderFields;
use crate::utils::clean::{clean_categories, clean_date_accepted, clean_markdown, normalize_repository_link};

use super::links::clean_archive;

const DESCRIPTION_KEYS: &[&str] = &["package_description", "one-line_description_of_package"];
const REPOSITORY_KEYS: &[&str] = &["repository_link", "repository_link_(if_existing)"];
const JOSS_KEYS: &[&str] = &["joss", "joss_doi"];
const VERSION_SUBMITTED_KEYS: &[&str] = &["version_submitted", "version_submitted_for_review"];

/// Label marking a package whose review record is kept for history only
pub const ARCHIVED_LABEL: &str = "archived";

/// Build a validated record for one issue
pub async fn build_record(
    issue: &Issue,
    mut fields: HeaderFields,
    body: &str,
    checker: &dyn LinkChecker,
) -> Result<ReviewRecord, RecordError> {
    let package_name = fields
        .take_text("package_name")
        .map(|name| clean_markdown(name.trim()).trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(RecordError::MissingField("package_name"))?;

    let repository_link = fields
        .take_text_any(REPOSITORY_KEYS)
        .filter(|link| !link.trim().is_empty())
        .ok_or(RecordError::MissingField("repository_link"))?;
    let repository_link = normalize_repository_link(&repository_link)?;

    let archive = match fields.take_text("archive") {
        Some(raw) => clean_archive(&raw, checker).await?,
        None => None,
    };
    let joss = match fields.take_text_any(JOSS_KEYS) {
        Some(raw) => clean_archive(&raw, checker).await?,
        None => None,
    };

    let labels = issue.label_names();
    let active = !labels.iter().any(|l| l.eq_ignore_ascii_case(ARCHIVED_LABEL));

    let record = ReviewRecord {
        package_name,
        package_description: fields
            .take_text_any(DESCRIPTION_KEYS)
            .map(|d| clean_markdown(d.trim()))
            .unwrap_or_default(),
        submitting_author: fields.take_users("submitting_author").into_iter().next(),
        all_current_maintainers: fields.take_users("all_current_maintainers"),
        repository_link,
        version_submitted: non_empty(fields.take_text_any(VERSION_SUBMITTED_KEYS)),
        categories: scope_categories(body).map(clean_categories),
        editor: Team::new(fields.take_users("editor")),
        eic: Team::new(fields.take_users("eic")),
        reviewers: fields.take_users("reviewers"),
        archive,
        version_accepted: non_empty(fields.take_text("version_accepted")),
        date_accepted: clean_date_accepted(fields.take_text("date_accepted").as_deref()),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        issue_link: issue.html_link(),
        joss,
        partners: partner_programs(body),
        gh_meta: None,
        labels,
        active,
    };

    if !fields.is_empty() {
        tracing::debug!(
            package = %record.package_name,
            "Ignoring header fields: {}",
            fields.keys().collect::<Vec<_>>().join(", ")
        );
    }

    Ok(record)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
