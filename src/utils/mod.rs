pub mod clean;

pub use clean::{
    classify_archive, clean_categories, clean_date, clean_date_accepted, clean_markdown, clean_name,
    fix_url_protocol, normalize_repository_link, roster_key, MISSING,
};
