//! Overlay of partial identification results
//!
//! Field precedence, highest first:
//! 1. Identification provider (name, confidence, description, its own attributes)
//! 2. Taxonomy lookup (fills absent or placeholder attributes)
//! 3. Encyclopedia enrichment (fills description and link)
//!
//! `name` and `confidence` are never taken from taxonomy or enrichment.

use naturelens_common::model::{Attributes, Summary};
use naturelens_common::Identification;

/// Combine an identification with lower-precedence sources
pub fn overlay(
    mut identification: Identification,
    taxonomy: Option<Attributes>,
    summary: Option<Summary>,
) -> Identification {
    if let Some(facts) = taxonomy {
        identification.attributes.fill_from(facts);
    }

    if let Some(summary) = summary {
        let has_description = identification
            .description
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
        if !has_description {
            identification.description = Some(summary.description);
        }
        if identification.wikipedia_link.is_none() {
            identification.wikipedia_link = summary.wikipedia_link;
        }
    }

    identification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Summary {
        Summary {
            description: "The house sparrow is a bird of the sparrow family.".to_string(),
            wikipedia_link: Some("https://en.wikipedia.org/wiki/House_sparrow".to_string()),
        }
    }

    fn taxonomy() -> Attributes {
        Attributes {
            scientific_name: Some("Passer domesticus".to_string()),
            family: Some("Passeridae".to_string()),
            diet: Some("Omnivore".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_fields_never_overridden() {
        let merged = overlay(
            Identification::new("House Sparrow", 0.9).with_description("A small brown bird."),
            Some(taxonomy()),
            Some(summary()),
        );

        assert_eq!(merged.name, "House Sparrow");
        assert_eq!(merged.confidence, 0.9);
        assert_eq!(merged.description.as_deref(), Some("A small brown bird."));
        assert_eq!(
            merged.wikipedia_link.as_deref(),
            Some("https://en.wikipedia.org/wiki/House_sparrow")
        );
        assert_eq!(merged.attributes.family.as_deref(), Some("Passeridae"));
    }

    #[test]
    fn test_enrichment_fills_missing_description() {
        let merged = overlay(Identification::new("House Sparrow", 0.9), None, Some(summary()));
        assert_eq!(merged.description, Some(summary().description));
    }

    #[test]
    fn test_blank_description_counts_as_missing() {
        let merged = overlay(
            Identification::new("House Sparrow", 0.9).with_description("  "),
            None,
            Some(summary()),
        );
        assert_eq!(merged.description, Some(summary().description));
    }

    #[test]
    fn test_provider_attributes_beat_taxonomy() {
        let identification = Identification::new("House Sparrow", 0.9).with_attributes(Attributes {
            diet: Some("Seeds and insects".to_string()),
            habitat: Some("Unknown".to_string()),
            ..Default::default()
        });
        let merged = overlay(
            identification,
            Some(Attributes {
                habitat: Some("Towns and farmland".to_string()),
                ..taxonomy()
            }),
            None,
        );

        assert_eq!(merged.attributes.diet.as_deref(), Some("Seeds and insects"));
        assert_eq!(merged.attributes.habitat.as_deref(), Some("Towns and farmland"));
        assert_eq!(merged.attributes.scientific_name.as_deref(), Some("Passer domesticus"));
    }

    #[test]
    fn test_no_sources_is_identity() {
        let identification = Identification::new("Oak", 0.5);
        assert_eq!(overlay(identification.clone(), None, None), identification);
    }
}
