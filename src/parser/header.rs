//! Review issue header parsing
//!
//! Review issues open with a block of `Key: value` lines, followed by a
//! horizontal rule and a checklist body. The template has been edited by hand
//! for years, so this module absorbs the drift:
//! - bolded keys (`**Package Name**: x`)
//! - CRLF and bare CR line endings
//! - values containing colons (URLs)
//! - era-specific key spellings (`date_accepted_(month/day/year)`,
//!   `reviewer_1`/`reviewer_2`)

use crate::models::ReviewUser;

use super::users::parse_user_line;

/// Header keys whose values name people
const ROLE_MARKERS: &[&str] = &["submitting", "editor", "eic", "reviewer", "maintainers"];

/// A parsed header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Users(Vec<ReviewUser>),
}

/// Header fields in source order, keyed by canonical field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    entries: Vec<(String, FieldValue)>,
}

impl HeaderFields {
    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Remove a text field; role fields are rendered back to handles
    pub fn take_text(&mut self, key: &str) -> Option<String> {
        match self.remove(key)? {
            FieldValue::Text(text) => Some(text),
            FieldValue::Users(users) => Some(
                users
                    .iter()
                    .map(|u| format!("@{}", u.github_username))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }

    /// Remove a role field; a text value is parsed as a contributor line
    pub fn take_users(&mut self, key: &str) -> Vec<ReviewUser> {
        match self.remove(key) {
            Some(FieldValue::Users(users)) => users,
            Some(FieldValue::Text(text)) => parse_user_line(&text),
            None => Vec::new(),
        }
    }

    /// First of several alias keys that is present, removing all of them
    pub fn take_text_any(&mut self, keys: &[&str]) -> Option<String> {
        let mut found = None;
        for key in keys {
            let value = self.take_text(key);
            if found.is_none() {
                found = value;
            }
        }
        found
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip a BOM and normalize line endings to LF
pub fn normalize_content(content: &str) -> String {
    content
        .strip_prefix('\u{FEFF}')
        .unwrap_or(content)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Split an issue body into `(header, body)` on the first `---` rule line.
///
/// Everything after the first rule is the body, further rules included. With
/// no rule at all the whole text is header. Dashes inside a value
/// (`data---tools`) are not a rule.
pub fn split_header(content: &str) -> (String, String) {
    let content = normalize_content(content);
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if is_rule(line) {
            let body = &content[offset + line.len()..];
            return (content[..offset].to_string(), body.to_string());
        }
        offset += line.len();
    }
    (content, String::new())
}

fn is_rule(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Split `key: value` on the first colon that does not start `://`
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    line.char_indices()
        .filter(|(_, c)| *c == ':')
        .map(|(idx, _)| idx)
        .find(|idx| !line[idx + 1..].starts_with('/'))
        .map(|idx| (&line[..idx], &line[idx + 1..]))
}

/// Canonical field name: lower-case, spaces replaced with underscores
pub fn canonical_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

/// Whether a canonical key names a review role
pub fn is_review_role(key: &str) -> bool {
    let key = key.to_lowercase();
    ROLE_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Parse one header line into a canonical key and typed value
pub fn parse_header_line(line: &str) -> Option<(String, FieldValue)> {
    let line = line.replace("**", "");
    let (key, value) = split_key_value(line.trim())?;
    let key = canonical_key(key);
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = if is_review_role(&key) {
        let users = parse_user_line(value);
        if users.is_empty() {
            tracing::warn!("No GitHub usernames found for {}", key);
        }
        FieldValue::Users(users)
    } else {
        FieldValue::Text(value.to_string())
    };
    Some((key, value))
}

/// Parse a header block into fields.
///
/// Era-specific keys are folded into their canonical form here so later
/// stages never see template versions.
pub fn header_as_dict(header: &str) -> HeaderFields {
    let mut fields = HeaderFields::default();
    for line in normalize_content(header).lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = parse_header_line(line) {
            fields.insert(key, value);
        }
    }
    clean_date_accepted_key(&mut fields);
    coalesce_reviewers(&mut fields);
    fields
}

/// Rename any `date_accepted*` key (e.g. `date_accepted_(month/day/year)`)
/// to `date_accepted`
pub fn clean_date_accepted_key(fields: &mut HeaderFields) {
    for entry in &mut fields.entries {
        if entry.0.starts_with("date_accepted") && entry.0 != "date_accepted" {
            entry.0 = "date_accepted".to_string();
        }
    }
    let mut seen = false;
    fields.entries.retain(|(k, _)| {
        if k != "date_accepted" {
            return true;
        }
        let keep = !seen;
        seen = true;
        keep
    });
}

/// Fold `reviewer_1`, `reviewer_2`, ... and `reviewers` into one `reviewers`
/// list, preserving source order
pub fn coalesce_reviewers(fields: &mut HeaderFields) {
    let Some(first) = fields.entries.iter().position(|(k, _)| k.starts_with("reviewer")) else {
        return;
    };

    let mut reviewers = Vec::new();
    let mut kept = Vec::with_capacity(fields.entries.len());
    for (key, value) in fields.entries.drain(..) {
        if key.starts_with("reviewer") {
            match value {
                FieldValue::Users(users) => reviewers.extend(users),
                FieldValue::Text(text) => reviewers.extend(parse_user_line(&text)),
            }
        } else {
            kept.push((key, value));
        }
    }

    let insert_at = first.min(kept.len());
    kept.insert(insert_at, ("reviewers".to_string(), FieldValue::Users(reviewers)));
    fields.entries = kept;
}
