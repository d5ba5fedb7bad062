//! Text normalizers shared by the issue parser and the roster
//!
//! Everything here is pure and total over its input: malformed dates become
//! the `"missing"` sentinel instead of an error. The one exception is
//! [`classify_archive`], which rejects archive values of no recognizable
//! shape so the offending issue is surfaced to the operator.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::models::RecordError;

/// Sentinel for absent or unparseable dates
pub const MISSING: &str = "missing";

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid DOI regex"));

const ACCEPTED_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%Y/%m/%d"];

const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("data-processing", "data-processing-munging"),
    ("data-validation", "data-validation-testing"),
    ("scientific-software", "scientific-software-wrapper"),
];

/// Reduce a GitHub timestamp (`YYYY-MM-DDTHH:MM:SSZ`) to `YYYY-MM-DD`.
///
/// `None`, `"missing"` and anything unparseable yield `"missing"`.
pub fn clean_date(date: Option<&str>) -> String {
    let Some(date) = date.map(str::trim) else {
        return MISSING.to_string();
    };
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%SZ") {
        return parsed.date().format("%Y-%m-%d").to_string();
    }
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed.date_naive().format("%Y-%m-%d").to_string(),
        Err(_) => MISSING.to_string(),
    }
}

/// Normalize the hand-entered acceptance date of a review.
///
/// Editors have typed `MM/DD/YYYY`, `MM-DD-YYYY` and ISO dates over the
/// years; all become `YYYY-MM-DD`. `TBD` and garbage become `"missing"`.
pub fn clean_date_accepted(date: Option<&str>) -> String {
    let Some(date) = date.map(str::trim).filter(|d| !d.is_empty()) else {
        return MISSING.to_string();
    };
    ACCEPTED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Strip leading and trailing runs of backticks and asterisks
pub fn clean_markdown(txt: &str) -> String {
    txt.trim_matches(|c| c == '`' || c == '*').to_string()
}

/// Remove parentheses and `@` from a name or handle token
pub fn clean_name(token: &str) -> String {
    token.replace(['(', ')', '@'], "").trim().to_string()
}

/// Roster key for a GitHub handle.
///
/// Handles are compared case-insensitively everywhere, and editors
/// occasionally append a name after the handle (`user (Full Name)`), so only
/// the first whitespace-separated token is kept.
pub fn roster_key(handle: &str) -> String {
    handle
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Classify a raw `archive`/`joss` value.
///
/// Returns the candidate URL (`https://doi.org/...` for bare DOIs) or `None`
/// for the `n/a`/`tbd` placeholders. Liveness of the URL is checked by the
/// caller.
pub fn classify_archive(raw: &str) -> Result<Option<String>, RecordError> {
    let archive = raw.trim();
    if archive.is_empty() || ["n/a", "tbd"].iter().any(|p| archive.eq_ignore_ascii_case(p)) {
        return Ok(None);
    }

    if archive.starts_with('[') && archive.ends_with(')') {
        if let Some((_, target)) = archive.rsplit_once("](") {
            return classify_archive(&target[..target.len() - 1]);
        }
    }

    if archive.starts_with("http://") || archive.starts_with("https://") {
        return Ok(Some(archive.to_string()));
    }

    let doi = archive
        .strip_prefix("doi:")
        .or_else(|| archive.strip_prefix("DOI:"))
        .map(str::trim)
        .unwrap_or(archive);
    if DOI_RE.is_match(doi) {
        return Ok(Some(format!("https://doi.org/{}", doi)));
    }

    Err(RecordError::InvalidArchive(raw.trim().to_string()))
}

/// Upgrade a possibly protocol-less or `http://` URL to `https://`.
///
/// Empty input passes through unchanged.
pub fn fix_url_protocol(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Reduce a repository link to `https://host/owner/repo`.
///
/// Accepts markdown links (`[label](url)`), angle-bracketed URLs, missing or
/// `http` protocols, `.git` suffixes, and deep links into the repository.
pub fn normalize_repository_link(raw: &str) -> Result<String, RecordError> {
    let mut link = raw.trim();
    if link.starts_with('[') {
        if let Some((label, target)) = link.split_once("](") {
            let target = target.trim_end_matches(')');
            link = if target.starts_with("http") {
                target
            } else {
                label.trim_start_matches('[')
            };
        }
    }
    let link = link.trim_matches(|c| c == '<' || c == '>').trim();
    let link = link.split(['?', '#']).next().unwrap_or_default();

    let with_protocol = fix_url_protocol(link);
    let Some(rest) = with_protocol.strip_prefix("https://") else {
        return Err(RecordError::InvalidRepositoryLink(raw.to_string()));
    };

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let host = segments
        .next()
        .filter(|h| h.contains('.') && !h.contains(char::is_whitespace))
        .ok_or_else(|| RecordError::InvalidRepositoryLink(raw.to_string()))?;

    let mut normalized = format!("https://{}", host.to_lowercase());
    for segment in segments.take(2) {
        normalized.push('/');
        normalized.push_str(segment.trim_end_matches(".git"));
    }
    Ok(normalized)
}

/// Map legacy category spellings onto the current taxonomy
pub fn clean_categories(categories: Vec<String>) -> Vec<String> {
    categories
        .into_iter()
        .map(|category| {
            CATEGORY_ALIASES
                .iter()
                .find(|(prefix, _)| category.starts_with(prefix))
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or(category)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_date() {
        assert_eq!(clean_date(Some("2024-03-07T12:34:56Z")), "2024-03-07");
        assert_eq!(clean_date(Some("2024-02-28T00:00:00Z")), "2024-02-28");
        assert_eq!(clean_date(None), "missing");
        assert_eq!(clean_date(Some("missing")), "missing");
        assert_eq!(clean_date(Some("")), "missing");
        assert_eq!(clean_date(Some("03/07/2024")), "missing");
        assert_eq!(clean_date(Some("2024-03-07T12:34:56+02:00")), "2024-03-07");
    }

    #[test]
    fn test_clean_date_accepted() {
        assert_eq!(clean_date_accepted(Some("01/18/2024")), "2024-01-18");
        assert_eq!(clean_date_accepted(Some("1/8/2024")), "2024-01-08");
        assert_eq!(clean_date_accepted(Some("2024-03-07")), "2024-03-07");
        assert_eq!(clean_date_accepted(Some("2024/03/07")), "2024-03-07");
        assert_eq!(clean_date_accepted(Some("03-07-2024")), "2024-03-07");
        assert_eq!(clean_date_accepted(Some("TBD")), "missing");
        assert_eq!(clean_date_accepted(Some("missing")), "missing");
        assert_eq!(clean_date_accepted(None), "missing");
    }

    #[test]
    fn test_clean_markdown() {
        let cases = [
            ("*Hello*", "Hello"),
            ("`Code`", "Code"),
            ("**Bold**", "Bold"),
            ("***Strong***", "Strong"),
            ("`*Code*`", "Code"),
            ("`***Code***`", "Code"),
            ("`Code***`", "Code"),
            ("***Code*`", "Code"),
            ("a **b** c", "a **b** c"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_markdown(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("(@username)"), "username");
        assert_eq!(clean_name("(username)"), "username");
        assert_eq!(clean_name("@username"), "username");
        assert_eq!(clean_name(" username "), "username");
    }

    #[test]
    fn test_roster_key() {
        assert_eq!(roster_key("GitHubUserName"), "githubusername");
        assert_eq!(roster_key("username (full name here)"), "username");
        assert_eq!(roster_key("githubusername extra text"), "githubusername");
        assert_eq!(roster_key(""), "");
    }

    #[test]
    fn test_classify_archive_doi_forms() {
        let expected = Some("https://doi.org/10.5281/zenodo.8415866".to_string());
        assert_eq!(classify_archive("10.5281/zenodo.8415866").unwrap(), expected);
        assert_eq!(
            classify_archive("[10.5281/zenodo.8415866](10.5281/zenodo.8415866)").unwrap(),
            expected
        );
        assert_eq!(
            classify_archive("[![DOI](https://zenodo.org/badge/DOI/10.5281/zenodo.8415866.svg)](https://doi.org/10.5281/zenodo.8415866)")
                .unwrap(),
            expected
        );
        assert_eq!(classify_archive("doi:10.5281/zenodo.8415866").unwrap(), expected);
    }

    #[test]
    fn test_classify_archive_placeholders() {
        for placeholder in ["n/a", "N/A", "tbd", "TBD", "", "  "] {
            assert_eq!(classify_archive(placeholder).unwrap(), None);
        }
    }

    #[test]
    fn test_classify_archive_rejects_unknown_shapes() {
        let err = classify_archive("see the zenodo page").unwrap_err();
        assert!(matches!(err, RecordError::InvalidArchive(_)));
    }

    #[test]
    fn test_fix_url_protocol() {
        assert_eq!(fix_url_protocol(""), "");
        assert_eq!(fix_url_protocol("example.com"), "https://example.com");
        assert_eq!(fix_url_protocol("http://example.com"), "https://example.com");
        assert_eq!(fix_url_protocol("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_repository_link() {
        let cases = [
            ("https://github.com/sunpy/sunpy", "https://github.com/sunpy/sunpy"),
            ("https://github.com/sunpy/sunpy/", "https://github.com/sunpy/sunpy"),
            ("http://github.com/sunpy/sunpy.git", "https://github.com/sunpy/sunpy"),
            ("github.com/sunpy/sunpy/tree/main/docs", "https://github.com/sunpy/sunpy"),
            (
                "[https://github.com/sunpy/sunpy](https://github.com/sunpy/sunpy)",
                "https://github.com/sunpy/sunpy",
            ),
            ("[sunpy](https://GitHub.com/sunpy/sunpy)", "https://github.com/sunpy/sunpy"),
            ("<https://gitlab.com/group/proj>", "https://gitlab.com/group/proj"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_repository_link(input).unwrap(), expected, "input: {}", input);
        }
        assert!(normalize_repository_link("not a link").is_err());
    }

    #[test]
    fn test_clean_categories() {
        let cases = [
            (vec!["data-processing"], vec!["data-processing-munging"]),
            (vec!["data-processing/munging"], vec!["data-processing-munging"]),
            (vec!["scientific-software-and-friends"], vec!["scientific-software-wrapper"]),
            (
                vec!["data-processing", "data-extraction"],
                vec!["data-processing-munging", "data-extraction"],
            ),
        ];
        for (input, expected) in cases {
            let input = input.into_iter().map(String::from).collect();
            assert_eq!(clean_categories(input), expected);
        }
    }
}
