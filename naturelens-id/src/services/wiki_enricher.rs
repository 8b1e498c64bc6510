//! Wikipedia summary enrichment
//!
//! Fetches a short summary and canonical article link for a subject name.
//! Never fails the caller: a missing article or any transport error
//! degrades to a search-engine link scoped to wikipedia.org.

use async_trait::async_trait;
use naturelens_common::model::Summary;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::services::http::{build_client, ensure_success};
use crate::types::{Enricher, ProviderError};

pub const NO_QUERY_DESCRIPTION: &str = "No valid query provided.";
pub const NOT_FOUND_DESCRIPTION: &str = "No Wikipedia information found. Try searching manually.";
pub const ERROR_DESCRIPTION: &str =
    "Error fetching Wikipedia data. Click the link to search manually.";
pub const NO_SUMMARY_DESCRIPTION: &str = "No description available.";

const SEARCH_URL: &str = "https://www.google.com/search";
const ENCYCLOPEDIA_DOMAIN: &str = "wikipedia.org";

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrls>,
}

#[derive(Debug, Deserialize)]
struct PageUrls {
    page: Option<String>,
}

/// Wikipedia REST summary client
pub struct WikiEnricher {
    http_client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl WikiEnricher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// `<base>/<percent-encoded subject>`
    fn summary_url(&self, subject: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ProviderError::Parse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Parse(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push(subject);
        Ok(url)
    }

    /// `Ok(None)` when the encyclopedia has no article for the subject
    async fn fetch(&self, subject: &str) -> Result<Option<Summary>, ProviderError> {
        let url = self.summary_url(subject)?;
        debug!(subject = %subject, url = %url, "Querying Wikipedia summary API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let page: PageSummary = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if page.title.is_none() {
            return Ok(None);
        }

        Ok(Some(Summary {
            description: page
                .extract
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| NO_SUMMARY_DESCRIPTION.to_string()),
            wikipedia_link: page.content_urls.and_then(|urls| urls.desktop?.page),
        }))
    }
}

#[async_trait]
impl Enricher for WikiEnricher {
    async fn summarize(&self, subject: &str) -> Summary {
        let subject = subject.trim();
        if subject.is_empty() {
            warn!("Wikipedia enrichment skipped: empty subject");
            return Summary {
                description: NO_QUERY_DESCRIPTION.to_string(),
                wikipedia_link: None,
            };
        }

        match self.fetch(subject).await {
            Ok(Some(summary)) => {
                info!(subject = %subject, "Wikipedia summary retrieved");
                summary
            }
            Ok(None) => {
                warn!(subject = %subject, "No Wikipedia article found");
                fallback_summary(subject, NOT_FOUND_DESCRIPTION)
            }
            Err(e) => {
                warn!(subject = %subject, error = %e, "Wikipedia lookup failed");
                fallback_summary(subject, ERROR_DESCRIPTION)
            }
        }
    }
}

/// Search-engine query for `subject` restricted to wikipedia.org
pub fn search_fallback_url(subject: &str) -> String {
    let query = format!("{} site:{}", subject, ENCYCLOPEDIA_DOMAIN);
    Url::parse_with_params(SEARCH_URL, &[("q", query.as_str())])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| SEARCH_URL.to_string())
}

fn fallback_summary(subject: &str, description: &str) -> Summary {
    Summary {
        description: description.to_string(),
        wikipedia_link: Some(search_fallback_url(subject)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enricher(base: &str) -> WikiEnricher {
        WikiEnricher::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_summary_url_encodes_subject() {
        let client = enricher("https://en.wikipedia.org/api/rest_v1/page/summary");
        let url = client.summary_url("House Sparrow").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/House%20Sparrow"
        );
    }

    #[test]
    fn test_summary_url_tolerates_trailing_slash() {
        let client = enricher("http://localhost:1/summary/");
        let url = client.summary_url("Eiffel Tower").unwrap();
        assert_eq!(url.path(), "/summary/Eiffel%20Tower");
    }

    #[test]
    fn test_search_fallback_url() {
        let url = search_fallback_url("Bald Eagle");
        assert!(url.starts_with("https://www.google.com/search?q="));
        assert!(url.contains("Bald+Eagle"));
        assert!(url.contains("wikipedia.org"));
    }

    #[test]
    fn test_search_fallback_url_escapes_reserved_characters() {
        let url = search_fallback_url("Rock & Roll");
        assert!(url.contains("Rock+%26+Roll"));
    }

    #[tokio::test]
    async fn test_empty_subject_short_circuits() {
        // Unroutable base URL: any network attempt would produce the error fallback
        let client = enricher("http://127.0.0.1:1/summary");
        let summary = client.summarize("   ").await;
        assert_eq!(summary.description, NO_QUERY_DESCRIPTION);
        assert!(summary.wikipedia_link.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_degrades_to_search_link() {
        let client = enricher("http://127.0.0.1:1/summary");
        let summary = client.summarize("Tiger").await;
        assert_eq!(summary.description, ERROR_DESCRIPTION);
        assert_eq!(summary.wikipedia_link, Some(search_fallback_url("Tiger")));
    }
}
