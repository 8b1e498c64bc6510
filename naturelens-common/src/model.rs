//! Detection result contract
//!
//! Two representations of one identification:
//! - [`Outcome`] is what providers and the orchestrator pass around. Failure
//!   kinds are variants, not magic names.
//! - [`DetectionResult`] is the flat record handed to the presentation layer.
//!   It carries the legacy sentinel names ("Unknown", "Error", ...) that
//!   existing screens key off.
//!
//! The only conversion between the two is [`Outcome::into_result`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Sentinel: provider ran but nothing usable came back
pub const NAME_UNKNOWN: &str = "Unknown";
/// Sentinel: invalid input or upstream failure
pub const NAME_ERROR: &str = "Error";
/// Sentinel: image contained nothing the labeler recognized
pub const NAME_NOT_RECOGNIZED: &str = "Not Recognized";
/// Sentinel: candidate below the acceptance threshold
pub const NAME_NEEDS_VERIFICATION: &str = "Needs Verification";

/// Attribute values that mean "no data" rather than a real fact.
///
/// Display code suppresses fields carrying one of these.
pub const PLACEHOLDER_VALUES: [&str; 3] = ["Unknown", "N/A", "Not Evaluated"];

/// True if `value` is one of [`PLACEHOLDER_VALUES`]
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_VALUES.contains(&value)
}

// ============================================================================
// Domain
// ============================================================================

/// Which provider pipeline handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Flora,
    Fauna,
    Landmark,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Flora, Domain::Fauna, Domain::Landmark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Flora => "flora",
            Domain::Fauna => "fauna",
            Domain::Landmark => "landmark",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flora" => Ok(Domain::Flora),
            "fauna" => Ok(Domain::Fauna),
            "landmark" => Ok(Domain::Landmark),
            _ => Err(Error::InvalidInput("Invalid detection type.".to_string())),
        }
    }
}

// ============================================================================
// Identification payload
// ============================================================================

/// One label from the general-purpose labeler, highest confidence first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub confidence: f64,
}

impl Label {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Geographic point reported for a landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Domain-specific attributes
///
/// Every field is optional. Flora, fauna and landmark providers each fill
/// their own subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    // Shared taxonomy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habitat: Option<String>,

    // Flora
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_names: Option<Vec<String>>,

    // Fauna
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_behavior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    // Landmark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
}

impl Attributes {
    /// Fill gaps in `self` from `other`
    ///
    /// A field of `self` is replaced when it is absent, or when it holds a
    /// placeholder and `other` has a real value. Real values in `self` are
    /// never overwritten.
    pub fn fill_from(&mut self, other: Attributes) {
        fill(&mut self.scientific_name, other.scientific_name);
        fill(&mut self.family, other.family);
        fill(&mut self.genus, other.genus);
        fill(&mut self.habitat, other.habitat);
        fill(&mut self.plant_type, other.plant_type);
        fill(&mut self.common_names, other.common_names);
        fill(&mut self.diet, other.diet);
        fill(&mut self.lifespan, other.lifespan);
        fill(&mut self.conservation_status, other.conservation_status);
        fill(&mut self.prey, other.prey);
        fill(&mut self.group_behavior, other.group_behavior);
        fill(&mut self.top_speed, other.top_speed);
        fill(&mut self.weight, other.weight);
        fill(&mut self.height, other.height);
        fill(&mut self.location, other.location);
        fill(&mut self.latitude, other.latitude);
        fill(&mut self.longitude, other.longitude);
        fill(&mut self.built, other.built);
        fill(&mut self.architect, other.architect);
        fill(&mut self.style, other.style);
        fill(&mut self.significance, other.significance);
    }

    pub fn is_empty(&self) -> bool {
        *self == Attributes::default()
    }
}

/// Values that can stand in for "no data"
trait Placeholder {
    fn is_placeholder(&self) -> bool {
        false
    }
}

impl Placeholder for String {
    fn is_placeholder(&self) -> bool {
        is_placeholder(self)
    }
}

impl Placeholder for Vec<String> {
    fn is_placeholder(&self) -> bool {
        self.is_empty()
    }
}

impl Placeholder for f64 {}
impl Placeholder for GeoPoint {}

fn fill<T: Placeholder>(slot: &mut Option<T>, candidate: Option<T>) {
    let Some(candidate) = candidate else {
        return;
    };
    let replace = match slot.as_ref() {
        None => true,
        Some(current) => current.is_placeholder() && !candidate.is_placeholder(),
    };
    if replace {
        *slot = Some(candidate);
    }
}

/// Encyclopedia enrichment for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub description: String,
    pub wikipedia_link: Option<String>,
}

/// A successful identification
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Canonical subject name
    pub name: String,
    /// Confidence as a fraction in [0, 1]
    pub confidence: f64,
    /// Provider-native percentage text, kept for display (flora only)
    pub confidence_percent: Option<String>,
    pub attributes: Attributes,
    pub description: Option<String>,
    pub wikipedia_link: Option<String>,
    /// Labeler output used for routing; not part of the final result
    pub labels: Vec<Label>,
}

impl Identification {
    /// Create identification with clamped confidence (0.0-1.0)
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            name: name.into(),
            confidence,
            confidence_percent: None,
            attributes: Attributes::default(),
            description: None,
            wikipedia_link: None,
            labels: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    /// Highest-confidence label, if the provider reported any
    pub fn top_label(&self) -> Option<&Label> {
        self.labels.first()
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of one identification attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A usable identification
    Identified(Identification),
    /// Upstream succeeded but saw nothing in the image
    NotRecognized { message: String },
    /// Upstream succeeded but returned no usable match
    Unknown { message: String },
    /// A candidate exists but falls below the acceptance threshold
    NeedsVerification {
        candidate: String,
        confidence: f64,
        message: String,
    },
    /// Request rejected before any provider was contacted
    InvalidInput { message: String },
    /// Network, status or payload failure at a provider
    UpstreamError {
        provider: String,
        detail: String,
        message: String,
    },
}

impl Outcome {
    pub fn not_recognized(message: impl Into<String>) -> Self {
        Outcome::NotRecognized {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Outcome::Unknown {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Outcome::InvalidInput {
            message: message.into(),
        }
    }

    pub fn upstream(
        provider: impl Into<String>,
        detail: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Outcome::UpstreamError {
            provider: provider.into(),
            detail: detail.into(),
            message: message.into(),
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Outcome::Identified(_))
    }

    pub fn identification(&self) -> Option<&Identification> {
        match self {
            Outcome::Identified(identification) => Some(identification),
            _ => None,
        }
    }

    /// Legacy name for this outcome, or the real subject name when identified
    pub fn name(&self) -> &str {
        match self {
            Outcome::Identified(identification) => &identification.name,
            Outcome::NotRecognized { .. } => NAME_NOT_RECOGNIZED,
            Outcome::Unknown { .. } => NAME_UNKNOWN,
            Outcome::NeedsVerification { .. } => NAME_NEEDS_VERIFICATION,
            Outcome::InvalidInput { .. } | Outcome::UpstreamError { .. } => NAME_ERROR,
        }
    }

    /// Map to the flat presentation record
    pub fn into_result(self, image_uri: Option<&str>) -> DetectionResult {
        let image_uri = image_uri.filter(|uri| !uri.is_empty()).map(str::to_string);
        let sentinel = |name: &str, message: String| DetectionResult {
            name: name.to_string(),
            confidence: 0.0,
            message: Some(message),
            image_uri: image_uri.clone(),
            ..DetectionResult::default()
        };

        match self {
            Outcome::Identified(identification) => DetectionResult {
                name: identification.name,
                confidence: identification.confidence,
                confidence_percent: identification.confidence_percent,
                message: None,
                attributes: identification.attributes,
                description: identification.description,
                wikipedia_link: identification.wikipedia_link,
                image_uri: image_uri.clone(),
            },
            Outcome::NotRecognized { message } => sentinel(NAME_NOT_RECOGNIZED, message),
            Outcome::Unknown { message } => sentinel(NAME_UNKNOWN, message),
            Outcome::NeedsVerification { message, .. } => {
                sentinel(NAME_NEEDS_VERIFICATION, message)
            }
            Outcome::InvalidInput { message } => sentinel(NAME_ERROR, message),
            Outcome::UpstreamError { message, .. } => sentinel(NAME_ERROR, message),
        }
    }
}

// ============================================================================
// Presentation record
// ============================================================================

/// Normalized result handed to the presentation layer
///
/// Presentation code keys off `name`, `confidence` and the sentinel names,
/// and must tolerate any optional field being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub name: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl DetectionResult {
    /// True for the reserved non-identification names
    pub fn is_sentinel(&self) -> bool {
        [
            NAME_UNKNOWN,
            NAME_ERROR,
            NAME_NOT_RECOGNIZED,
            NAME_NEEDS_VERIFICATION,
        ]
        .contains(&self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parse_is_case_insensitive() {
        assert_eq!("Flora".parse::<Domain>().unwrap(), Domain::Flora);
        assert_eq!(" fauna ".parse::<Domain>().unwrap(), Domain::Fauna);
        assert_eq!("LANDMARK".parse::<Domain>().unwrap(), Domain::Landmark);
    }

    #[test]
    fn test_domain_parse_rejects_other_values() {
        let err = "mineral".parse::<Domain>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg == "Invalid detection type."));
        assert!("".parse::<Domain>().is_err());
    }

    #[test]
    fn test_identification_clamps_confidence() {
        assert_eq!(Identification::new("x", 1.7).confidence, 1.0);
        assert_eq!(Identification::new("x", -0.2).confidence, 0.0);
        assert_eq!(Identification::new("x", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_fill_keeps_real_values() {
        let mut primary = Attributes {
            diet: Some("Seeds".to_string()),
            habitat: Some("Unknown".to_string()),
            ..Default::default()
        };
        primary.fill_from(Attributes {
            diet: Some("Insects".to_string()),
            habitat: Some("Urban areas".to_string()),
            weight: Some("24-39.5g".to_string()),
            ..Default::default()
        });

        assert_eq!(primary.diet.as_deref(), Some("Seeds"));
        assert_eq!(primary.habitat.as_deref(), Some("Urban areas"));
        assert_eq!(primary.weight.as_deref(), Some("24-39.5g"));
    }

    #[test]
    fn test_fill_does_not_swap_placeholders() {
        let mut primary = Attributes {
            family: Some("N/A".to_string()),
            ..Default::default()
        };
        primary.fill_from(Attributes {
            family: Some("Unknown".to_string()),
            ..Default::default()
        });
        assert_eq!(primary.family.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_sentinel_mapping() {
        let cases = [
            (Outcome::not_recognized("nothing"), NAME_NOT_RECOGNIZED),
            (Outcome::unknown("no match"), NAME_UNKNOWN),
            (Outcome::invalid_input("bad"), NAME_ERROR),
            (Outcome::upstream("Vision", "503", "failed"), NAME_ERROR),
            (
                Outcome::NeedsVerification {
                    candidate: "Tiger".to_string(),
                    confidence: 0.55,
                    message: "low".to_string(),
                },
                NAME_NEEDS_VERIFICATION,
            ),
        ];

        for (outcome, expected) in cases {
            assert_eq!(outcome.name(), expected);
            let result = outcome.into_result(Some("/tmp/a.jpg"));
            assert_eq!(result.name, expected);
            assert_eq!(result.confidence, 0.0);
            assert!(result.message.is_some());
            assert!(result.is_sentinel());
            assert_eq!(result.image_uri.as_deref(), Some("/tmp/a.jpg"));
        }
    }

    #[test]
    fn test_upstream_detail_not_exposed() {
        let result = Outcome::upstream("Vision", "HTTP 500: stack trace", "Vision request failed.")
            .into_result(None);
        assert_eq!(result.message.as_deref(), Some("Vision request failed."));
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("stack trace"));
    }

    #[test]
    fn test_result_json_is_camel_case_and_flat() {
        let identification = Identification {
            wikipedia_link: Some("https://en.wikipedia.org/wiki/Tiger".to_string()),
            ..Identification::new("Tiger", 0.92).with_attributes(Attributes {
                scientific_name: Some("Panthera tigris".to_string()),
                conservation_status: Some("Endangered".to_string()),
                ..Default::default()
            })
        };

        let json = serde_json::to_value(Outcome::Identified(identification).into_result(None))
            .unwrap();
        assert_eq!(json["name"], "Tiger");
        assert_eq!(json["scientificName"], "Panthera tigris");
        assert_eq!(json["conservationStatus"], "Endangered");
        assert_eq!(json["wikipediaLink"], "https://en.wikipedia.org/wiki/Tiger");
        assert!(json.get("message").is_none());
        assert!(json.get("labels").is_none());
    }
}
