//! Review issue parsing
//!
//! Everything that knows about the issue template lives here. Later stages
//! only see [`crate::models::ReviewRecord`].

pub mod checklist;
pub mod header;
pub mod issue;
pub mod users;

pub use checklist::{get_categories, partner_programs, scope_categories};
pub use header::{header_as_dict, split_header, FieldValue, HeaderFields};
pub use issue::{filter_issues, IssueParser};
pub use users::{parse_user_line, parse_user_names};
