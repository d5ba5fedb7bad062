//! Contributor-source listings

use super::merge::SourceListing;
use super::roles::ContributionCategory;
use crate::github::{ContributorSource, GitHubError};

/// Fetch and classify every source URL.
///
/// A source that cannot be fetched is logged and left out; authentication
/// and rate-limit failures abort.
pub async fn fetch_listings(
    urls: &[String],
    source: &dyn ContributorSource,
) -> Result<Vec<SourceListing>, GitHubError> {
    let mut listings = Vec::with_capacity(urls.len());

    for url in urls {
        match source.contributor_logins(url).await {
            Ok(logins) => {
                let category = ContributionCategory::classify(url);
                tracing::info!("{} contributors listed in {} ({})", logins.len(), url, category);
                listings.push(SourceListing::new(category, logins));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::warn!("Skipping contributor source {}: {}", url, e),
        }
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FakeSource;

    #[async_trait]
    impl ContributorSource for FakeSource {
        async fn contributor_logins(&self, url: &str) -> Result<Vec<String>, GitHubError> {
            if url.contains("missing") {
                Err(GitHubError::NotFound(url.to_string()))
            } else if url.contains("locked") {
                Err(GitHubError::Unauthorized)
            } else {
                Ok(vec!["alice".to_string()])
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_listings_skips_missing() {
        let urls = vec![
            "https://raw.githubusercontent.com/o/pyosmeta/main/.all-contributorsrc".to_string(),
            "https://raw.githubusercontent.com/o/missing/main/.all-contributorsrc".to_string(),
        ];
        let listings = fetch_listings(&urls, &FakeSource).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].category, ContributionCategory::CodeContrib);
    }

    #[tokio::test]
    async fn test_fetch_listings_aborts_on_auth() {
        let urls = vec!["https://x/locked/.all-contributorsrc".to_string()];
        assert!(matches!(
            fetch_listings(&urls, &FakeSource).await,
            Err(GitHubError::Unauthorized)
        ));
    }
}
