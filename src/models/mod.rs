pub mod github;
pub mod person;
pub mod review;
pub mod validation;

pub use github::{GhMeta, Issue, Label, UserProfile};
pub use person::{PersonModel, PersonSet};
pub use review::{ReviewRecord, ReviewUser, Team};
pub use validation::{ParseReport, RecordError};
