//! `reviewmeta process-reviews`

use anyhow::anyhow;
use colored::Colorize;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::progress::{progress_bar, spinner};
use crate::config::Config;
use crate::github::{GitHubClient, GitHubError, IssueQuery, IssueSource, LinkChecker, RepoMetrics};
use crate::models::{ParseReport, ReviewRecord};
use crate::parser::{filter_issues, IssueParser};
use crate::store::save_packages;
use crate::validator::format_url;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct ProcessReviewsOptions {
    /// Overrides the configured labels when non-empty
    pub labels: Vec<String>,
    pub since: Option<String>,
    pub output: Option<PathBuf>,
    pub no_metrics: bool,
}

/// Fetch, filter and parse review issues into a report
pub async fn collect_reviews(
    source: &dyn IssueSource,
    checker: &dyn LinkChecker,
    query: &IssueQuery,
) -> std::result::Result<ParseReport, GitHubError> {
    let issues = source.list_issues(query).await?;
    let issues = filter_issues(issues, &query.labels);
    tracing::info!("{} review issues to parse", issues.len());
    Ok(IssueParser::new(checker).parse_issues(&issues).await)
}

/// Attach repository metrics to every record hosted on GitHub.
///
/// A repository whose lookup fails is left without metrics and listed in
/// the returned map, keyed by package name. Only credential and rate-limit
/// failures abort.
pub async fn attach_metrics<'a, I>(
    records: I,
    metrics: &dyn RepoMetrics,
    checker: &dyn LinkChecker,
    pb: &ProgressBar,
) -> std::result::Result<BTreeMap<String, GitHubError>, GitHubError>
where
    I: IntoIterator<Item = &'a mut ReviewRecord>,
{
    let mut failed = BTreeMap::new();
    for record in records {
        pb.set_message(record.package_name.clone());
        match record.github_repo() {
            Some((owner, repo)) => match metrics.get_repo_meta(&owner, &repo).await {
                Ok(mut meta) => {
                    if let Some(meta) = meta.as_mut() {
                        if let Some(doc) = meta.documentation.take() {
                            meta.documentation = format_url(&doc, checker).await;
                        }
                    }
                    record.gh_meta = meta;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not fetch metrics for {}/{}: {}", owner, repo, e);
                    record.gh_meta = None;
                    failed.insert(record.package_name.clone(), e);
                }
            },
            None => tracing::warn!(
                "{} is not hosted on GitHub ({}); skipping metrics",
                record.package_name,
                record.repository_link
            ),
        }
        pb.inc(1);
    }
    Ok(failed)
}

pub async fn run(options: ProcessReviewsOptions, config: &Config, token: Option<String>) -> Result<()> {
    let labels = if options.labels.is_empty() {
        config.github.labels.clone()
    } else {
        options.labels
    };
    let since = options
        .since
        .or_else(|| config.github.since.clone())
        .map(|s| IssueQuery::parse_since(&s))
        .transpose()?;
    let query = IssueQuery::new(&config.github.org, &config.github.review_repo)
        .with_labels(labels)
        .with_since(since);
    let output = options.output.unwrap_or_else(|| config.output.packages.clone());

    let client = GitHubClient::new(Some(super::require_token(token)?))?;

    println!(
        "{}",
        format!("🔍 Fetching review issues from {}/{}...", query.org, query.repo).cyan()
    );
    let pb = spinner("Parsing review issues");
    let mut report = collect_reviews(&client, &client, &query).await?;
    pb.finish_and_clear();

    if !options.no_metrics {
        let pb = progress_bar(report.records.len(), "Fetching repository metrics");
        let failed = attach_metrics(report.records.values_mut(), &client, &client, &pb).await?;
        pb.finish_and_clear();
        for (package, err) in &failed {
            eprintln!("   {} {} {}", "!".yellow(), package, err.to_string().yellow());
        }
    }

    let records: Vec<ReviewRecord> = report.records.values().cloned().collect();
    save_packages(&output, &records)?;
    println!(
        "{}",
        format!("✅ Wrote {} reviews to {}", records.len(), output.display()).green()
    );

    if report.has_errors() {
        eprintln!("{}", "Issues that could not be parsed:".yellow().bold());
        for (url, err) in &report.errors {
            eprintln!("   • {} {}", url, err.to_string().red());
        }
        return Err(anyhow!("{} review issue(s) failed to parse", report.errors.len()));
    }

    Ok(())
}
