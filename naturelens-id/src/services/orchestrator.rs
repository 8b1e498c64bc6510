//! Detection orchestrator
//!
//! Routes one identification request to the provider pipeline for its
//! domain:
//! - flora → plant identifier
//! - landmark → vision labeler
//! - fauna → vision labeler, then either the vision-LLM zoologist (birds and
//!   insects) followed by a taxonomy merge, or a taxonomy lookup by label name
//!
//! Calls within one request are sequential; each stage decides whether the
//! next one runs. Every path resolves to an [`Outcome`], never an error.

use naturelens_common::{DetectionResult, Domain, ImageSource, Identification, Outcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ProviderSettings;
use crate::services::animal_taxonomy::AnimalTaxonomyLookup;
use crate::services::classification::is_pollinator_or_bird;
use crate::services::merge;
use crate::services::plant_identifier::PlantIdentifier;
use crate::services::vision_labeler::VisionLabeler;
use crate::services::wiki_enricher::WikiEnricher;
use crate::services::zoologist_vision::ZoologistVisionProvider;
use crate::types::{Enricher, IdentificationProvider, ProviderError, TaxonomyLookup};

pub const LOW_CONFIDENCE_MESSAGE: &str = "Animal could not be confidently identified.";
pub const ANIMAL_FAILURE_MESSAGE: &str = "Identification failed. Try using a clearer image.";

/// The fixed set of collaborators the orchestrator routes between
#[derive(Clone)]
pub struct Providers {
    pub vision: Arc<dyn IdentificationProvider>,
    pub plant: Arc<dyn IdentificationProvider>,
    pub zoologist: Arc<dyn IdentificationProvider>,
    pub taxonomy: Arc<dyn TaxonomyLookup>,
    pub enricher: Arc<dyn Enricher>,
}

impl Providers {
    /// Build the production HTTP adapters
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let enricher: Arc<dyn Enricher> = Arc::new(WikiEnricher::new(
            settings.endpoints.wikipedia.clone(),
            settings.timeouts.wikipedia,
        )?);

        Ok(Self {
            vision: Arc::new(VisionLabeler::new(
                settings.endpoints.vision.clone(),
                settings.vision_api_key.clone(),
                settings.timeouts.vision,
                Arc::clone(&enricher),
            )?),
            plant: Arc::new(PlantIdentifier::new(
                settings.endpoints.plantnet.clone(),
                settings.plantnet_api_key.clone(),
                settings.timeouts.plantnet,
                Arc::clone(&enricher),
            )?),
            zoologist: Arc::new(ZoologistVisionProvider::new(
                settings.endpoints.zoologist.clone(),
                settings.timeouts.zoologist,
                Arc::clone(&enricher),
            )?),
            taxonomy: Arc::new(AnimalTaxonomyLookup::new(
                settings.endpoints.animal.clone(),
                settings.animal_api_key.clone(),
                settings.timeouts.animal,
            )?),
            enricher,
        })
    }
}

/// Routes identification requests across providers
pub struct DetectionOrchestrator {
    providers: Providers,
    fauna_min_confidence: f64,
}

impl DetectionOrchestrator {
    pub fn new(providers: Providers, fauna_min_confidence: f64) -> Self {
        Self {
            providers,
            fauna_min_confidence,
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self::new(
            Providers::from_settings(settings)?,
            settings.fauna_min_confidence,
        ))
    }

    /// Presentation boundary: raw strings in, legacy record out
    ///
    /// Checks, before any provider is contacted: image URI present, domain
    /// valid, image type supported and file present.
    pub async fn detect_object(&self, image_uri: &str, domain: &str) -> DetectionResult {
        let outcome = if image_uri.trim().is_empty() {
            warn!("detect_object: no image URI provided");
            Outcome::invalid_input("No image URI provided.")
        } else {
            match domain.parse::<Domain>() {
                Ok(domain) => self.identify(image_uri, domain).await,
                Err(e) => {
                    warn!(domain = %domain, error = %e, "detect_object: invalid domain");
                    Outcome::invalid_input("Invalid detection type.")
                }
            }
        };

        outcome.into_result(Some(image_uri))
    }

    /// Identify the subject of `image_uri` within `domain`
    pub async fn identify(&self, image_uri: &str, domain: Domain) -> Outcome {
        let image = match ImageSource::open(image_uri).await {
            Ok(image) => image,
            Err(e) => {
                warn!(image = %image_uri, error = %e, "Image rejected before identification");
                return Outcome::invalid_input(invalid_input_message(e));
            }
        };

        info!(image = %image.uri(), domain = %domain, "Identification started");

        let outcome = match domain {
            Domain::Flora => self.providers.plant.identify(&image).await,
            Domain::Landmark => self.providers.vision.identify(&image).await,
            Domain::Fauna => self.identify_fauna(&image).await,
        };

        info!(
            domain = %domain,
            outcome = %outcome.name(),
            identified = outcome.is_identified(),
            "Identification finished"
        );
        outcome
    }

    async fn identify_fauna(&self, image: &ImageSource) -> Outcome {
        let labeled = match self.providers.vision.identify(image).await {
            Outcome::Identified(identification) => identification,
            other => {
                debug!(outcome = %other.name(), "Labeler stage ended fauna pipeline");
                return other;
            }
        };

        if is_pollinator_or_bird(&labeled.labels) {
            debug!("Bird/insect labels found, routing to vision-LLM");
            return self.identify_with_zoologist(image).await;
        }

        self.identify_by_label(&labeled).await
    }

    /// Vision-LLM naming, then taxonomy facts merged underneath
    async fn identify_with_zoologist(&self, image: &ImageSource) -> Outcome {
        let animal = match self.providers.zoologist.identify(image).await {
            Outcome::Identified(animal) => animal,
            other => return other,
        };

        match self.providers.taxonomy.lookup(&animal.name).await {
            Ok(Some(facts)) => Outcome::Identified(merge::overlay(animal, Some(facts), None)),
            Ok(None) => {
                debug!(name = %animal.name, "No taxonomy facts to merge");
                Outcome::Identified(animal)
            }
            Err(e) => {
                warn!(
                    provider = self.providers.taxonomy.provider_id(),
                    name = %animal.name,
                    error = %e,
                    "Taxonomy lookup failed, keeping vision-LLM result"
                );
                Outcome::Identified(animal)
            }
        }
    }

    /// Taxonomy lookup by the labeler's top label
    ///
    /// The labeler's own summary is discarded; the result carries the
    /// summary fetched here, after the facts are found.
    async fn identify_by_label(&self, labeled: &Identification) -> Outcome {
        let (name, confidence) = match labeled.top_label() {
            Some(label) => (label.name.clone(), label.confidence),
            None => (labeled.name.clone(), labeled.confidence),
        };

        if confidence < self.fauna_min_confidence {
            info!(
                candidate = %name,
                confidence,
                threshold = self.fauna_min_confidence,
                "Fauna candidate below confidence threshold"
            );
            return Outcome::NeedsVerification {
                candidate: name,
                confidence,
                message: LOW_CONFIDENCE_MESSAGE.to_string(),
            };
        }

        match self.providers.taxonomy.lookup(&name).await {
            Ok(Some(facts)) => {
                let summary = self.providers.enricher.summarize(&name).await;
                Outcome::Identified(merge::overlay(
                    Identification::new(name, confidence),
                    Some(facts),
                    Some(summary),
                ))
            }
            Ok(None) => Outcome::unknown(format!("No animal facts found for {}.", name)),
            Err(e) => {
                let provider = self.providers.taxonomy.provider_id();
                warn!(provider, name = %name, error = %e, "Taxonomy lookup failed");
                Outcome::upstream(provider, e.to_string(), ANIMAL_FAILURE_MESSAGE)
            }
        }
    }
}

fn invalid_input_message(err: naturelens_common::Error) -> String {
    match err {
        naturelens_common::Error::InvalidInput(message) => message,
        other => other.to_string(),
    }
}
