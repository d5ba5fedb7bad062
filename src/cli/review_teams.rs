//! `reviewmeta update-review-teams`

use colored::Colorize;
use indicatif::ProgressBar;
use std::path::PathBuf;

use super::progress::progress_bar;
use crate::config::Config;
use crate::github::{GitHubClient, GitHubError, LinkChecker, ProfileLookup};
use crate::models::ReviewRecord;
use crate::roster::{MergeReport, Roster};
use crate::store::{load_packages, load_roster, save_packages, save_roster};
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct UpdateReviewTeamsOptions {
    pub roster: Option<PathBuf>,
    pub packages: Option<PathBuf>,
}

/// Credit every review team member on the roster and back-fill names on
/// the records
pub async fn update_review_teams(
    roster: &mut Roster,
    records: &mut [ReviewRecord],
    lookup: &dyn ProfileLookup,
    checker: &dyn LinkChecker,
    pb: &ProgressBar,
) -> std::result::Result<MergeReport, GitHubError> {
    let mut report = MergeReport::default();
    for record in records.iter_mut() {
        pb.set_message(record.package_name.clone());
        report.merge(roster.process_review_team(record, lookup, checker).await?);
        pb.inc(1);
    }
    Ok(report)
}

pub async fn run(options: UpdateReviewTeamsOptions, config: &Config, token: Option<String>) -> Result<()> {
    let roster_path = options
        .roster
        .unwrap_or_else(|| config.output.contributors.clone());
    let packages_path = options
        .packages
        .unwrap_or_else(|| config.output.packages.clone());

    let mut roster = load_roster(&roster_path)?;
    let mut records = load_packages(&packages_path)?;
    let client = GitHubClient::new(Some(super::require_token(token)?))?;

    let pb = progress_bar(records.len(), "Processing review teams");
    let report = update_review_teams(&mut roster, &mut records, &client, &client, &pb).await?;
    pb.finish_and_clear();

    save_roster(&roster_path, &roster)?;
    save_packages(&packages_path, &records)?;

    for (handle, err) in &report.skipped {
        eprintln!("   {} {} {}", "!".yellow(), handle, err.to_string().yellow());
    }
    println!(
        "{}",
        format!(
            "✅ Updated {} review teams; {} new contributors",
            records.len(),
            report.added.len()
        )
        .green()
    );

    Ok(())
}
