//! Link normalization that needs the network
//!
//! Shape checks live in [`crate::utils::clean`]; this module adds the
//! liveness probe through a [`LinkChecker`].

use crate::github::LinkChecker;
use crate::models::RecordError;
use crate::utils::clean::{classify_archive, fix_url_protocol};

/// Normalize an `archive` or `joss` value and make sure it resolves.
///
/// `n/a`, `tbd` and empty values are `None`. A recognizable URL or DOI that
/// does not resolve is an error, as is a value of no recognizable shape.
pub async fn clean_archive(
    raw: &str,
    checker: &dyn LinkChecker,
) -> Result<Option<String>, RecordError> {
    let Some(url) = classify_archive(raw)? else {
        return Ok(None);
    };
    if checker.check_url(&url).await {
        Ok(Some(url))
    } else {
        Err(RecordError::UnreachableArchive(url))
    }
}

/// Upgrade a website URL to https and keep it only if it resolves.
///
/// Blank input comes back as an empty string without a probe.
pub async fn format_url(url: &str, checker: &dyn LinkChecker) -> Option<String> {
    let url = fix_url_protocol(url);
    if url.is_empty() {
        return Some(url);
    }
    if checker.check_url(&url).await {
        Some(url)
    } else {
        tracing::warn!("Oops, url `{}` is not valid, removing it", url);
        None
    }
}
