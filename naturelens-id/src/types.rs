//! Provider trait definitions for NatureLens identification
//!
//! Three seams, one per kind of upstream:
//! - [`IdentificationProvider`]: image in, [`Outcome`] out (labeler, plant,
//!   vision-LLM)
//! - [`TaxonomyLookup`]: subject name in, partial attributes out
//! - [`Enricher`]: subject name in, encyclopedia [`Summary`] out
//!
//! The orchestrator only sees these traits, so tests swap in counting mocks.

use async_trait::async_trait;
use naturelens_common::model::{Attributes, Summary};
use naturelens_common::{ImageSource, Outcome};
use thiserror::Error;

/// Upstream call failures
///
/// Never crosses an adapter boundary as an error: adapters convert it into
/// an `Outcome::UpstreamError` (or a fallback) and log the detail.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    #[error("Image read error: {0}")]
    Image(String),
}

impl ProviderError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Identifies the subject of an image
///
/// Implementations never fail: every error path resolves to a non-identified
/// [`Outcome`] carrying a user-facing message.
#[async_trait]
pub trait IdentificationProvider: Send + Sync {
    /// Provider identifier for logging (e.g., "GoogleVision", "PlantNet")
    fn provider_id(&self) -> &'static str;

    async fn identify(&self, image: &ImageSource) -> Outcome;
}

/// Structured animal facts by name
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    fn provider_id(&self) -> &'static str;

    /// # Returns
    /// * `Ok(Some(_))` - facts found, absent fields set to placeholders
    /// * `Ok(None)` - upstream knows no such animal
    /// * `Err(_)` - transport, status or payload failure
    async fn lookup(&self, name: &str) -> Result<Option<Attributes>, ProviderError>;
}

/// Encyclopedia summary for a subject
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Always returns a summary, falling back to a search link on failure
    async fn summarize(&self, subject: &str) -> Summary;
}
