//! Test Helper Utilities
//!
//! Shared utilities for testing naturelens-id:
//! - Scripted provider doubles that count their calls
//! - Temporary image files
//! - Local axum servers standing in for upstream APIs

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use naturelens_common::model::{Attributes, Summary};
use naturelens_common::{ImageSource, Outcome};
use naturelens_id::services::{DetectionOrchestrator, Providers};
use naturelens_id::types::{Enricher, IdentificationProvider, ProviderError, TaxonomyLookup};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const FAUNA_THRESHOLD: f64 = 0.7;

/// Identification provider returning a fixed outcome
pub struct ScriptedProvider {
    id: &'static str,
    outcome: Outcome,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(id: &'static str, outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentificationProvider for ScriptedProvider {
    fn provider_id(&self) -> &'static str {
        self.id
    }

    async fn identify(&self, _image: &ImageSource) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// What a scripted taxonomy lookup answers
#[derive(Clone)]
pub enum TaxonomyScript {
    Found(Attributes),
    Missing,
    Fails,
}

pub struct ScriptedTaxonomy {
    script: TaxonomyScript,
    queried: Mutex<Vec<String>>,
}

impl ScriptedTaxonomy {
    pub fn new(script: TaxonomyScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.queried.lock().unwrap().len()
    }

    /// Names passed to `lookup`, in call order
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxonomyLookup for ScriptedTaxonomy {
    fn provider_id(&self) -> &'static str {
        "ScriptedTaxonomy"
    }

    async fn lookup(&self, name: &str) -> Result<Option<Attributes>, ProviderError> {
        self.queried.lock().unwrap().push(name.to_string());
        match &self.script {
            TaxonomyScript::Found(attributes) => Ok(Some(attributes.clone())),
            TaxonomyScript::Missing => Ok(None),
            TaxonomyScript::Fails => Err(ProviderError::Status(503, "unavailable".to_string())),
        }
    }
}

/// Enricher answering "Summary of <subject>." with a wiki link
pub struct CountingEnricher {
    calls: AtomicUsize,
}

impl CountingEnricher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enricher for CountingEnricher {
    async fn summarize(&self, subject: &str) -> Summary {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Summary {
            description: format!("Summary of {}.", subject),
            wikipedia_link: Some(format!(
                "https://en.wikipedia.org/wiki/{}",
                subject.replace(' ', "_")
            )),
        }
    }
}

/// Orchestrator wired to scripted doubles, with handles for call counts
pub struct Harness {
    pub vision: Arc<ScriptedProvider>,
    pub plant: Arc<ScriptedProvider>,
    pub zoologist: Arc<ScriptedProvider>,
    pub taxonomy: Arc<ScriptedTaxonomy>,
    pub enricher: Arc<CountingEnricher>,
    pub orchestrator: DetectionOrchestrator,
}

impl Harness {
    pub fn new(
        vision: Outcome,
        plant: Outcome,
        zoologist: Outcome,
        taxonomy: TaxonomyScript,
    ) -> Self {
        let vision = ScriptedProvider::new("ScriptedVision", vision);
        let plant = ScriptedProvider::new("ScriptedPlant", plant);
        let zoologist = ScriptedProvider::new("ScriptedZoologist", zoologist);
        let taxonomy = ScriptedTaxonomy::new(taxonomy);
        let enricher = CountingEnricher::new();

        let providers = Providers {
            vision: vision.clone(),
            plant: plant.clone(),
            zoologist: zoologist.clone(),
            taxonomy: taxonomy.clone(),
            enricher: enricher.clone(),
        };

        Self {
            vision,
            plant,
            zoologist,
            taxonomy,
            enricher,
            orchestrator: DetectionOrchestrator::new(providers, FAUNA_THRESHOLD),
        }
    }

    /// Harness where only the labeler answer matters
    pub fn with_vision(vision: Outcome) -> Self {
        Self::new(
            vision,
            Outcome::unknown("plant"),
            Outcome::unknown("zoologist"),
            TaxonomyScript::Missing,
        )
    }

    /// Calls made to any provider or the enricher
    pub fn total_calls(&self) -> usize {
        self.vision.calls()
            + self.plant.calls()
            + self.zoologist.calls()
            + self.taxonomy.calls()
            + self.enricher.calls()
    }
}

/// Write a small fake image file named `name` into `dir`
pub fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\xFF\xD8\xFF\xE0fake-image-bytes").unwrap();
    path
}

/// Temp dir holding one image file, returned with its path as a string
pub fn temp_image(name: &str) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), name);
    (dir, path.to_string_lossy().into_owned())
}

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
