//! Google Cloud Vision label and landmark detection
//!
//! Sends the image base64-embedded in an `images:annotate` request asking for
//! labels and landmarks. A landmark, when present, wins over the best label.
//! The chosen name is enriched before returning.

use async_trait::async_trait;
use naturelens_common::model::GeoPoint;
use naturelens_common::{Attributes, ImageSource, Identification, Label, Outcome};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::services::http::{build_client, ensure_success};
use crate::services::merge;
use crate::types::{Enricher, IdentificationProvider, ProviderError};

const MAX_LABELS: u32 = 20;
const MAX_LANDMARKS: u32 = 5;
const PROVIDER_ID: &str = "GoogleVision";
const FAILURE_MESSAGE: &str = "Google Vision API request failed.";

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    landmark_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
    score: Option<f64>,
    #[serde(default)]
    locations: Vec<LocationInfo>,
    #[serde(default)]
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationInfo {
    lat_lng: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Property {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    message: Option<String>,
}

impl EntityAnnotation {
    fn name(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    fn property(&self, key: &str) -> String {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(key))
            .and_then(|p| p.value.clone())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn geo_point(&self) -> Option<GeoPoint> {
        let lat_lng = self.locations.first()?.lat_lng.as_ref()?;
        Some(GeoPoint {
            latitude: lat_lng.latitude?,
            longitude: lat_lng.longitude?,
        })
    }
}

/// Label/landmark detection client
pub struct VisionLabeler {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    enricher: Arc<dyn Enricher>,
}

impl VisionLabeler {
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

    async fn annotate(&self, image: &ImageSource) -> Result<AnnotateImageResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_ID))?;

        let content = image
            .read_base64()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?;

        let body = json!({
            "requests": [{
                "image": { "content": content },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "LANDMARK_DETECTION", "maxResults": MAX_LANDMARKS },
                ],
            }],
        });

        debug!(image = %image.uri(), "Querying Google Vision API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let annotated: AnnotateResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(annotated.responses.into_iter().next().unwrap_or_default())
    }
}

/// Map one annotate response to an outcome (before enrichment)
fn interpret(response: AnnotateImageResponse) -> Outcome {
    if let Some(status) = response.error {
        let message = status
            .message
            .unwrap_or_else(|| FAILURE_MESSAGE.to_string());
        return Outcome::upstream(PROVIDER_ID, message.clone(), message);
    }

    if response.label_annotations.is_empty() && response.landmark_annotations.is_empty() {
        return Outcome::not_recognized("No objects recognized in the image.");
    }

    let mut labels: Vec<Label> = response
        .label_annotations
        .iter()
        .filter_map(|label| Some(Label::new(label.name()?, label.score.unwrap_or(0.0))))
        .collect();
    labels.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let landmark = response
        .landmark_annotations
        .iter()
        .find(|landmark| landmark.name().is_some());

    let identification = match (landmark, labels.first()) {
        (Some(landmark), _) => {
            let point = landmark.geo_point();
            let attributes = Attributes {
                location: point,
                latitude: point.map(|p| p.latitude),
                longitude: point.map(|p| p.longitude),
                built: Some(landmark.property("built")),
                architect: Some(landmark.property("architect")),
                style: Some(landmark.property("style")),
                significance: Some(landmark.property("significance")),
                ..Default::default()
            };
            Identification::new(landmark.name().unwrap_or_default(), landmark.score.unwrap_or(0.0))
                .with_attributes(attributes)
        }
        (None, Some(best)) => Identification::new(best.name.clone(), best.confidence),
        (None, None) => return Outcome::unknown("No usable label found in the image."),
    };

    Outcome::Identified(identification.with_labels(labels))
}

#[async_trait]
impl IdentificationProvider for VisionLabeler {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn identify(&self, image: &ImageSource) -> Outcome {
        let response = match self.annotate(image).await {
            Ok(response) => response,
            Err(e) => {
                error!(provider = PROVIDER_ID, error = %e, "Google Vision request failed");
                return Outcome::upstream(PROVIDER_ID, e.to_string(), FAILURE_MESSAGE);
            }
        };

        match interpret(response) {
            Outcome::Identified(identification) => {
                info!(
                    name = %identification.name,
                    confidence = identification.confidence,
                    labels = identification.labels.len(),
                    "Google Vision identification"
                );
                let summary = self.enricher.summarize(&identification.name).await;
                Outcome::Identified(merge::overlay(identification, None, Some(summary)))
            }
            other => {
                info!(outcome = %other.name(), "Google Vision returned no identification");
                other
            }
        }
    }
}
