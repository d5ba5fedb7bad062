//! Contributor-line parsing
//!
//! Review headers name people as `Name (@handle)`, `(@handle)` or `@handle`,
//! comma-separated when a role has several holders.

use crate::models::ReviewUser;
use crate::utils::clean::clean_name;

/// Values editors put in a role field before anyone is assigned
const PLACEHOLDERS: &[&str] = &["tbd", "n/a", "na", "none", "missing", "-"];

/// Parse one `Name (@handle)` token.
///
/// Splits on the first `@`: the left side (if anything survives cleaning)
/// is the display name, the first word on the right the handle. Words after
/// the handle (`@handle (Full Name)`) become the name when the left side is
/// empty. A token without `@` is taken as a bare handle only when it is a
/// single word. Returns `None` when no handle can be recovered.
pub fn parse_user_names(token: &str) -> Option<ReviewUser> {
    let Some((name, rest)) = token.split_once('@') else {
        let handle = clean_name(link_label(token));
        if handle.split_whitespace().count() != 1 {
            return None;
        }
        return is_usable_handle(&handle).then(|| ReviewUser::new("", handle));
    };

    let cleaned = clean_name(link_label(rest));
    let mut words = cleaned.split_whitespace();
    let handle = words.next()?.to_string();
    if !is_usable_handle(&handle) {
        return None;
    }

    let name = clean_name(name).trim_matches(['[', ']']).trim().to_string();
    let name = if name.is_empty() {
        words.collect::<Vec<_>>().join(" ")
    } else {
        name
    };
    Some(ReviewUser::new(name, handle))
}

fn is_usable_handle(handle: &str) -> bool {
    !handle.is_empty() && !PLACEHOLDERS.iter().any(|p| handle.eq_ignore_ascii_case(p))
}

/// `handle](https://github.com/handle)` -> `handle`
fn link_label(token: &str) -> &str {
    token.split_once("](").map_or(token, |(label, _)| label)
}

/// Parse a whole header value into the users it names, dropping entries
/// without a usable handle
pub fn parse_user_line(value: &str) -> Vec<ReviewUser> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let user = parse_user_names(token);
            if user.is_none() {
                tracing::warn!("Could not find a GitHub handle in '{}', skipping it", token);
            }
            user
        })
        .collect()
}
