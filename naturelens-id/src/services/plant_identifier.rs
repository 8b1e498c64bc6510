//! Pl@ntNet plant identification
//!
//! Uploads the image as a multipart "leaf" organ and takes the top-ranked
//! species. Pl@ntNet reports a 0-1 score; the result carries it as a
//! fraction in `confidence` and as a two-decimal percentage string for
//! display.

use async_trait::async_trait;
use naturelens_common::{Attributes, ImageSource, Identification, Outcome};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::services::http::{build_client, ensure_success};
use crate::services::merge;
use crate::types::{Enricher, IdentificationProvider, ProviderError};

const PROVIDER_ID: &str = "PlantNet";
const ORGAN: &str = "leaf";
const FAILURE_MESSAGE: &str = "Identification failed. Try a clearer image.";
const NO_MATCH_MESSAGE: &str = "No matching plant species found.";

#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    #[serde(default)]
    results: Vec<SpeciesMatch>,
}

#[derive(Debug, Deserialize)]
struct SpeciesMatch {
    score: Option<f64>,
    species: Option<Species>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Species {
    scientific_name_without_author: Option<String>,
    genus: Option<Taxon>,
    family: Option<Taxon>,
    #[serde(default)]
    common_names: Vec<String>,
    vegetation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Taxon {
    scientific_name_without_author: Option<String>,
    scientific_name: Option<String>,
}

impl Taxon {
    fn name(&self) -> Option<String> {
        self.scientific_name_without_author
            .clone()
            .or_else(|| self.scientific_name.clone())
            .filter(|name| !name.trim().is_empty())
    }
}

/// Two-decimal percentage text for a 0-1 score, e.g. 0.87432 -> "87.43"
pub fn format_percent(score: f64) -> String {
    format!("{:.2}", score.clamp(0.0, 1.0) * 100.0)
}

/// Plant identification client
pub struct PlantIdentifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    enricher: Arc<dyn Enricher>,
}

impl PlantIdentifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        enricher: Arc<dyn Enricher>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            endpoint: endpoint.into(),
            api_key,
            timeout_secs: timeout.as_secs(),
            enricher,
        })
    }

    /// `Ok(None)` when Pl@ntNet finds no matching species
    async fn submit(&self, image: &ImageSource) -> Result<Option<IdentifyResponse>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_ID))?;

        let bytes = image
            .read_bytes()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?;

        let part = Part::bytes(bytes)
            .file_name(image.upload_name())
            .mime_str(image.mime_type())
            .map_err(|e| ProviderError::Image(e.to_string()))?;
        let form = Form::new().text("organs", ORGAN).part("images", part);

        debug!(image = %image.uri(), "Querying Pl@ntNet API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("api-key", api_key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        // Pl@ntNet answers 404 "Species not found" for unmatched images
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let parsed = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(Some(parsed))
    }
}

/// Map the top species match to an outcome (before enrichment)
///
/// A match without a species name is still reported, named "N/A", and is
/// enriched like any other match.
fn interpret(response: IdentifyResponse) -> Outcome {
    let Some(top) = response.results.into_iter().next() else {
        return Outcome::unknown(NO_MATCH_MESSAGE);
    };

    let score = top.score.unwrap_or(0.0);
    let species = top.species;
    let scientific_name = species
        .as_ref()
        .and_then(|s| s.scientific_name_without_author.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    let attributes = match species {
        Some(species) => Attributes {
            scientific_name: Some(scientific_name.clone()),
            family: Some(
                species
                    .family
                    .and_then(|f| f.name())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            genus: species.genus.and_then(|g| g.name()),
            plant_type: Some(
                species
                    .vegetation_type
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            common_names: Some(species.common_names).filter(|names| !names.is_empty()),
            ..Default::default()
        },
        None => Attributes {
            scientific_name: Some(scientific_name.clone()),
            family: Some("Unknown".to_string()),
            plant_type: Some("Unknown".to_string()),
            ..Default::default()
        },
    };

    let mut identification = Identification::new(scientific_name, score).with_attributes(attributes);
    identification.confidence_percent = Some(format_percent(score));
    Outcome::Identified(identification)
}

#[async_trait]
impl IdentificationProvider for PlantIdentifier {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn identify(&self, image: &ImageSource) -> Outcome {
        let outcome = match self.submit(image).await {
            Ok(Some(response)) => interpret(response),
            Ok(None) => Outcome::unknown(NO_MATCH_MESSAGE),
            Err(e) => {
                error!(provider = PROVIDER_ID, error = %e, "Pl@ntNet request failed");
                return Outcome::upstream(PROVIDER_ID, e.to_string(), FAILURE_MESSAGE);
            }
        };

        let identification = match outcome {
            Outcome::Identified(identification) => identification,
            other => {
                info!(outcome = %other.name(), "Pl@ntNet returned no identification");
                return other;
            }
        };

        info!(
            name = %identification.name,
            confidence = identification.confidence,
            "Pl@ntNet identification"
        );
        let summary = self.enricher.summarize(&identification.name).await;
        Outcome::Identified(merge::overlay(identification, None, Some(summary)))
    }
}
