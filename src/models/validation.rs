use std::collections::BTreeMap;

use super::review::ReviewRecord;

/// Why a single review issue could not become a [`ReviewRecord`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid archive value: {0}")]
    InvalidArchive(String),

    #[error("Invalid archive URL (not resolving): {0}")]
    UnreachableArchive(String),

    #[error("Invalid repository link: {0}")]
    InvalidRepositoryLink(String),
}

/// Outcome of parsing a batch of issues.
///
/// Records are keyed by package name, failures by issue URL. A failed issue
/// never aborts the batch.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub records: BTreeMap<String, ReviewRecord>,
    pub errors: BTreeMap<String, RecordError>,
}

impl ParseReport {
    /// Whether the run needs operator attention
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Format all errors for display
    pub fn format_errors(&self) -> String {
        self.errors
            .iter()
            .map(|(url, err)| format!("{}: {}", url, err))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
