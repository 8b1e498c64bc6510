//! API Ninjas animal facts lookup
//!
//! Queries structured animal metadata by name and maps the first match into
//! shared attributes. Absent fields become placeholders ("N/A" for taxonomy,
//! "Unknown" for characteristics, "Not Evaluated" for conservation status)
//! so display code can suppress them uniformly.

use async_trait::async_trait;
use naturelens_common::Attributes;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::services::http::{build_client, ensure_success};
use crate::types::{ProviderError, TaxonomyLookup};

const PROVIDER_ID: &str = "ApiNinjasAnimals";

#[derive(Debug, Default, Deserialize)]
pub struct AnimalRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub taxonomy: AnimalTaxonomy,
    #[serde(default)]
    pub characteristics: AnimalCharacteristics,
    #[serde(default)]
    pub conservation_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnimalTaxonomy {
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnimalCharacteristics {
    pub diet: Option<String>,
    pub lifespan: Option<String>,
    pub habitat: Option<String>,
    pub prey: Option<String>,
    pub group_behavior: Option<String>,
    pub top_speed: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub conservation_status: Option<String>,
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> Option<String> {
    Some(
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| placeholder.to_string()),
    )
}

/// Map one record into attributes, defaulting every absent field
pub fn map_record(record: AnimalRecord) -> Attributes {
    let AnimalRecord {
        taxonomy,
        characteristics,
        conservation_status,
        ..
    } = record;

    Attributes {
        scientific_name: or_placeholder(taxonomy.scientific_name, "N/A"),
        family: or_placeholder(taxonomy.family, "N/A"),
        genus: or_placeholder(taxonomy.genus, "N/A"),
        diet: or_placeholder(characteristics.diet, "Unknown"),
        lifespan: or_placeholder(characteristics.lifespan, "Unknown"),
        habitat: or_placeholder(characteristics.habitat, "Unknown"),
        conservation_status: or_placeholder(
            conservation_status.or(characteristics.conservation_status),
            "Not Evaluated",
        ),
        prey: or_placeholder(characteristics.prey, "Unknown"),
        group_behavior: or_placeholder(characteristics.group_behavior, "Unknown"),
        top_speed: or_placeholder(characteristics.top_speed, "Unknown"),
        weight: or_placeholder(characteristics.weight, "Unknown"),
        height: or_placeholder(characteristics.height, "Unknown"),
        ..Default::default()
    }
}

/// Animal facts client
pub struct AnimalTaxonomyLookup {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl AnimalTaxonomyLookup {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            endpoint: endpoint.into(),
            api_key,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl TaxonomyLookup for AnimalTaxonomyLookup {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn lookup(&self, name: &str) -> Result<Option<Attributes>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_ID))?;

        debug!(name = %name, "Querying animal facts API");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("name", name)])
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let records: Vec<AnimalRecord> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let Some(record) = records.into_iter().next() else {
            info!(name = %name, "No animal facts found");
            return Ok(None);
        };

        info!(
            name = %name,
            matched = %record.name.as_deref().unwrap_or("?"),
            "Animal facts retrieved"
        );
        Ok(Some(map_record(record)))
    }
}
