//! Record construction and field validation

pub mod links;
pub mod record;

pub use links::{clean_archive, format_url};
pub use record::{build_record, ARCHIVED_LABEL};
