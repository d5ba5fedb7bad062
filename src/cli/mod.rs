use anyhow::Context;

pub mod contributors;
pub mod progress;
pub mod review_teams;
pub mod reviews;

pub use contributors::UpdateContributorsOptions;
pub use review_teams::UpdateReviewTeamsOptions;
pub use reviews::ProcessReviewsOptions;

/// The GitHub token every subcommand needs
pub fn require_token(token: Option<String>) -> crate::Result<String> {
    token
        .filter(|t| !t.trim().is_empty())
        .context("GITHUB_TOKEN is not set. Export a GitHub token or pass --token")
}
