//! Checked-item extraction from review issue bodies
//!
//! Sections such as `## Scope` list template checkboxes. Only the checked
//! ones matter, and they are reduced to slugs (`Data retrieval` ->
//! `data-retrieval`). Sections come and go between template versions, so a
//! missing heading is a warning, never an error.

use regex::Regex;
use std::sync::LazyLock;

/// Heading of the package category checklist
pub const SCOPE_HEADING: &str = "## Scope";
/// Lines scanned below the first scope checkbox
pub const SCOPE_WINDOW: usize = 10;
/// Heading of the partner program checklist
pub const PARTNERS_HEADING: &str = "## Community Partnerships";
/// Lines scanned below the first partner checkbox
pub const PARTNERS_WINDOW: usize = 3;

static CHECKED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[[xX]\]\s*").expect("valid checkbox regex"));

/// `[Astropy][astropy-ref]` -> `Astropy`
static REFERENCE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\[[^\]]*\]").expect("valid reference regex"));

/// `[^1]`
static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^[^\]]*\]").expect("valid footnote regex"));

/// Extract the checked items of the section titled `heading`.
///
/// Scans at most `window` lines starting at the first checkbox below the
/// heading, stopping early at the next heading. With `keyed`, an item like
/// `Astropy: text` yields only `astropy`.
///
/// Returns `None` when the heading does not occur.
pub fn get_categories(body: &str, heading: &str, window: usize, keyed: bool) -> Option<Vec<String>> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();

    let Some(start) = lines.iter().position(|line| line.contains(heading)) else {
        tracing::warn!("{} not found in the list", heading);
        return None;
    };

    let items = lines[start + 1..]
        .iter()
        .copied()
        .take_while(|line| !line.starts_with('#'))
        .skip_while(|line| !line.starts_with("- ["))
        .take(window)
        .filter(|line| line.to_lowercase().starts_with("- [x]"))
        .map(|line| slugify_item(line, keyed))
        .filter(|item| !item.is_empty())
        .collect();

    Some(items)
}

/// Package categories checked under `## Scope`
pub fn scope_categories(body: &str) -> Option<Vec<String>> {
    get_categories(body, SCOPE_HEADING, SCOPE_WINDOW, false)
}

/// Partner programs checked under `## Community Partnerships`
pub fn partner_programs(body: &str) -> Option<Vec<String>> {
    get_categories(body, PARTNERS_HEADING, PARTNERS_WINDOW, true)
}

fn slugify_item(line: &str, keyed: bool) -> String {
    let item = CHECKED_PREFIX.replace(line, "");
    let item = if keyed {
        let key = item.split_once(':').map_or(item.as_ref(), |(key, _)| key);
        REFERENCE_LINK.replace_all(key, "$1").into_owned()
    } else {
        item.into_owned()
    };
    let item = FOOTNOTE.replace_all(&item, "");

    item.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
