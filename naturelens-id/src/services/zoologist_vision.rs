//! Vision-LLM animal identification (Pollinations text endpoint)
//!
//! Sends the image as a data URL in an OpenAI-style chat request with a
//! fixed zoologist system prompt asking for a JSON object with `name` and
//! `description`. The model reports no numeric confidence, so successful
//! answers carry [`ZOOLOGIST_CONFIDENCE`].

use async_trait::async_trait;
use naturelens_common::model::NAME_UNKNOWN;
use naturelens_common::{ImageSource, Identification, Outcome};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::services::http::{build_client, ensure_success};
use crate::services::merge;
use crate::types::{Enricher, IdentificationProvider, ProviderError};

/// Confidence assigned to every successful vision-LLM answer
pub const ZOOLOGIST_CONFIDENCE: f64 = 0.9;

const PROVIDER_ID: &str = "Pollinations";
const MODEL: &str = "openai";
const FAILURE_MESSAGE: &str = "Identification failed. Try a clearer image.";
const NO_DESCRIPTION: &str = "No description available.";

const SYSTEM_PROMPT: &str = "You are a zoologist expert. Identify the animal in the image and \
provide its name and a brief description about it. The description should be 2-3 sentences \
maximum, written in simple language that anyone can understand. Include one interesting fact \
about it. Always respond in JSON format with keys 'name' and 'description'.";

const USER_PROMPT: &str = "Please identify this animal and provide its name and a brief description.";

/// The model's answer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ZoologistReply {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Extract the reply object from a response body
///
/// Accepts a bare JSON object, a JSON string wrapping one, an OpenAI-style
/// `choices[0].message.content`, or text with the object inside a
/// markdown code fence.
pub fn parse_reply(body: &str) -> Result<ZoologistReply, ProviderError> {
    let value = match serde_json::from_str::<Value>(body.trim()) {
        Ok(value) => value,
        Err(_) => return parse_embedded_object(body),
    };

    match value {
        Value::Object(ref map) if map.contains_key("choices") => {
            let content = value
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .ok_or_else(|| ProviderError::Parse("Missing message content".to_string()))?;
            parse_embedded_object(content)
        }
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))
        }
        Value::String(text) => parse_embedded_object(&text),
        other => Err(ProviderError::Parse(format!("Unexpected reply: {}", other))),
    }
}

/// Parse the first `{...}` span of free text
fn parse_embedded_object(text: &str) -> Result<ZoologistReply, ProviderError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end])
            .map_err(|e| ProviderError::Parse(e.to_string())),
        _ => Err(ProviderError::Parse("No JSON object in reply".to_string())),
    }
}

/// Map a reply to an outcome (before enrichment)
fn interpret(reply: ZoologistReply) -> Outcome {
    let name = reply
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && name != NAME_UNKNOWN);

    match name {
        Some(name) => {
            let description = reply
                .description
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());
            Outcome::Identified(
                Identification::new(name, ZOOLOGIST_CONFIDENCE).with_description(description),
            )
        }
        None => Outcome::unknown(FAILURE_MESSAGE),
    }
}

/// Vision-LLM zoologist client
pub struct ZoologistVisionProvider {
    http_client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
    enricher: Arc<dyn Enricher>,
}

impl ZoologistVisionProvider {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        enricher: Arc<dyn Enricher>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            endpoint: endpoint.into(),
            timeout_secs: timeout.as_secs(),
            enricher,
        })
    }

    async fn ask(&self, image: &ImageSource) -> Result<ZoologistReply, ProviderError> {
        let data_url = image
            .data_url()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?;

        let body = json!({
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": data_url } },
                    ],
                },
            ],
            "model": MODEL,
            "jsonMode": true,
            "private": true,
        });

        debug!(image = %image.uri(), "Querying vision-LLM zoologist");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let text = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        parse_reply(&text)
    }
}

#[async_trait]
impl IdentificationProvider for ZoologistVisionProvider {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn identify(&self, image: &ImageSource) -> Outcome {
        let reply = match self.ask(image).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(provider = PROVIDER_ID, error = %e, "Vision-LLM request failed");
                return Outcome::upstream(PROVIDER_ID, e.to_string(), FAILURE_MESSAGE);
            }
        };

        match interpret(reply) {
            Outcome::Identified(identification) => {
                info!(name = %identification.name, "Vision-LLM identification");
                let summary = self.enricher.summarize(&identification.name).await;
                Outcome::Identified(merge::overlay(identification, None, Some(summary)))
            }
            other => {
                info!("Vision-LLM could not name the animal");
                other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let reply = parse_reply(r#"{"name": "House Sparrow", "description": "Small bird."}"#).unwrap();
        assert_eq!(reply.name.as_deref(), Some("House Sparrow"));
        assert_eq!(reply.description.as_deref(), Some("Small bird."));
    }

    #[test]
    fn test_parse_json_string_wrapping_object() {
        let body = serde_json::to_string(r#"{"name":"Monarch butterfly","description":"Migrates."}"#)
            .unwrap();
        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.name.as_deref(), Some("Monarch butterfly"));
    }

    #[test]
    fn test_parse_chat_completion() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": "```json\n{\"name\": \"Honey bee\", \"description\": \"Makes honey.\"}\n```"
                }
            }]
        })
        .to_string();
        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.name.as_deref(), Some("Honey bee"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_reply("I cannot see an animal."), Err(ProviderError::Parse(_))));
        assert!(matches!(parse_reply("42"), Err(ProviderError::Parse(_))));
    }

    #[test]
    fn test_interpret_fixed_confidence_and_default_description() {
        let outcome = interpret(ZoologistReply {
            name: Some("Blue Jay".to_string()),
            description: None,
        });
        let identification = outcome.identification().unwrap();
        assert_eq!(identification.confidence, ZOOLOGIST_CONFIDENCE);
        assert_eq!(identification.description.as_deref(), Some(NO_DESCRIPTION));
    }

    #[test]
    fn test_interpret_missing_or_unknown_name() {
        assert!(matches!(interpret(ZoologistReply::default()), Outcome::Unknown { .. }));
        let outcome = interpret(ZoologistReply {
            name: Some("Unknown".to_string()),
            description: Some("Too blurry.".to_string()),
        });
        assert!(matches!(outcome, Outcome::Unknown { .. }));
    }
}
