//! Identification services
//!
//! One adapter per upstream plus the orchestrator that routes between them:
//! - [`VisionLabeler`]: labels and landmarks (Google Cloud Vision)
//! - [`PlantIdentifier`]: plant species (Pl@ntNet)
//! - [`ZoologistVisionProvider`]: animal naming by a vision LLM (Pollinations)
//! - [`AnimalTaxonomyLookup`]: animal facts by name (API Ninjas)
//! - [`WikiEnricher`]: encyclopedia summaries (Wikipedia REST)

pub mod animal_taxonomy;
pub mod classification;
pub mod http;
pub mod merge;
pub mod orchestrator;
pub mod plant_identifier;
pub mod vision_labeler;
pub mod wiki_enricher;
pub mod zoologist_vision;

pub use animal_taxonomy::AnimalTaxonomyLookup;
pub use classification::is_pollinator_or_bird;
pub use orchestrator::{DetectionOrchestrator, Providers};
pub use plant_identifier::PlantIdentifier;
pub use vision_labeler::VisionLabeler;
pub use wiki_enricher::WikiEnricher;
pub use zoologist_vision::{ZoologistVisionProvider, ZOOLOGIST_CONFIDENCE};
