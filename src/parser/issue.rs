//! Issue-to-record pipeline
//!
//! `issue body -> header/body split -> header fields + checklists -> record`.
//! A failing issue is recorded against its URL and the batch carries on.

use crate::github::LinkChecker;
use crate::models::{Issue, ParseReport, RecordError, ReviewRecord};
use crate::validator::build_record;

use super::header::{header_as_dict, split_header};

/// Keep issues carrying any of `labels` (all issues when `labels` is empty)
pub fn filter_issues(issues: Vec<Issue>, labels: &[String]) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(|issue| issue.has_any_label(labels))
        .collect()
}

/// Parses review issues into records
pub struct IssueParser<'a> {
    checker: &'a dyn LinkChecker,
}

impl<'a> IssueParser<'a> {
    pub fn new(checker: &'a dyn LinkChecker) -> Self {
        Self { checker }
    }

    /// Parse one issue
    pub async fn parse_issue(&self, issue: &Issue) -> Result<ReviewRecord, RecordError> {
        let (header, body) = split_header(issue.body());
        let fields = header_as_dict(&header);
        build_record(issue, fields, &body, self.checker).await
    }

    /// Parse a batch of issues.
    ///
    /// Records are keyed by package name; a later issue for the same package
    /// replaces an earlier one. Failures are keyed by the issue's browser URL.
    pub async fn parse_issues(&self, issues: &[Issue]) -> ParseReport {
        let mut report = ParseReport::default();

        for issue in issues {
            let link = issue.html_link();
            match self.parse_issue(issue).await {
                Ok(record) => {
                    tracing::debug!(package = %record.package_name, issue = %link, "Parsed review");
                    if let Some(previous) = report.records.insert(record.package_name.clone(), record) {
                        tracing::warn!(
                            "Duplicate review for {}; keeping {}",
                            previous.package_name,
                            link
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(issue = %link, "Failed to parse review: {}", e);
                    report.errors.insert(link, e);
                }
            }
        }

        report
    }
}
