//! Contributor roster maintenance

pub mod merge;
pub mod roles;
pub mod sources;

pub use merge::{MergeReport, Roster, SourceListing};
pub use roles::{contributor_source_url, ContributionCategory, ReviewRole};
pub use sources::fetch_listings;
