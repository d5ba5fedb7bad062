// reviewmeta - pyOpenSci review metadata
// Parses software review issues into package records and keeps the contributor roster current

pub mod cli;
pub mod config;
pub mod github;
pub mod models;
pub mod parser;
pub mod roster;
pub mod store;
pub mod utils;
pub mod validator;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::Config;
pub use models::{ParseReport, PersonModel, RecordError, ReviewRecord, ReviewUser};
pub use roster::Roster;
