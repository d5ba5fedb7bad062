//! `reviewmeta update-contributors`

use colored::Colorize;
use std::path::PathBuf;

use super::progress::spinner;
use crate::config::Config;
use crate::github::{ContributorSource, GitHubClient, GitHubError, LinkChecker, ProfileLookup};
use crate::roster::{fetch_listings, MergeReport, Roster};
use crate::store::{load_roster, save_roster};
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct UpdateContributorsOptions {
    pub roster: Option<PathBuf>,
    pub refresh: bool,
    pub output: Option<PathBuf>,
}

/// Merge every contributor source into `roster`, optionally refreshing all
/// profiles afterwards
pub async fn update_contributors(
    roster: &mut Roster,
    source_urls: &[String],
    source: &dyn ContributorSource,
    lookup: &dyn ProfileLookup,
    checker: &dyn LinkChecker,
    refresh: bool,
) -> std::result::Result<MergeReport, GitHubError> {
    let listings = fetch_listings(source_urls, source).await?;
    let mut report = roster.combine_sources(&listings, lookup, checker).await?;
    if refresh {
        report.merge(roster.refresh_profiles(lookup, checker).await?);
    }
    Ok(report)
}

pub async fn run(options: UpdateContributorsOptions, config: &Config, token: Option<String>) -> Result<()> {
    let roster_path = options
        .roster
        .unwrap_or_else(|| config.output.contributors.clone());
    let output = options.output.unwrap_or_else(|| roster_path.clone());

    let mut roster = load_roster(&roster_path)?;
    let client = GitHubClient::new(Some(super::require_token(token)?))?;

    println!(
        "{}",
        format!("👥 Merging {} contributor sources...", config.contributors.repos.len()).cyan()
    );
    let pb = spinner("Updating contributors");
    let report = update_contributors(
        &mut roster,
        &config.contributors.source_urls(),
        &client,
        &client,
        &client,
        options.refresh,
    )
    .await?;
    pb.finish_and_clear();

    save_roster(&output, &roster)?;

    for handle in &report.added {
        println!("   {} {}", "+".green(), handle);
    }
    for (handle, err) in &report.skipped {
        eprintln!("   {} {} {}", "!".yellow(), handle, err.to_string().yellow());
    }
    println!(
        "{}",
        format!(
            "✅ {} contributors ({} new) written to {}",
            roster.len(),
            report.added.len(),
            output.display()
        )
        .green()
    );

    Ok(())
}
