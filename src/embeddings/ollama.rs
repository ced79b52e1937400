use crate::embeddings::{instructed_query, EmbeddingProvider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Embedding provider backed by the Ollama `/api/embeddings` endpoint
pub struct OllamaEmbeddingProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
    dimension: AtomicUsize, // Use AtomicUsize to allow runtime dimension updates (thread-safe)
    query_instruction: Option<String>,
}

impl OllamaEmbeddingProvider {
    /// Determine embedding dimension from model name
    pub(crate) fn get_dimension_for_model(model: &str) -> usize {
        match model {
            m if m.contains("mxbai-embed") => 1024,
            m if m.contains("e5-large") => 1024,
            m if m.contains("nomic-embed") => 768,
            m if m.contains("e5") => 768,
            // Validated against the first real response
            _ => 768,
        }
    }

    /// Create a provider for `model` served by Ollama
    /// Uses provided dimension, or auto-detects from model name if not provided
    pub fn new(base_url: Option<&str>, model: Option<&str>, dimension: Option<usize>) -> Self {
        let model_name = model.unwrap_or("nomic-embed-text").to_string();
        let dimension = dimension.unwrap_or_else(|| Self::get_dimension_for_model(&model_name));

        Self {
            base_url: base_url
                .unwrap_or("http://127.0.0.1:11434")
                .trim_end_matches('/')
                .to_string(),
            model: model_name,
            client: reqwest::Client::new(),
            dimension: AtomicUsize::new(dimension),
            query_instruction: None,
        }
    }

    /// Prefix queries (not documents) with a task instruction; empty disables it
    pub fn with_query_instruction(mut self, instruction: &str) -> Self {
        let instruction = instruction.trim();
        self.query_instruction = (!instruction.is_empty()).then(|| instruction.to_string());
        self
    }
}

#[derive(Serialize, Deserialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        let content = content.trim();
        if content.is_empty() {
            anyhow::bail!("Cannot generate embedding for empty content");
        }

        let url = format!("{}/api/embeddings", self.base_url);

        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: content.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API returned error {}: {}", status, error_text);
        }

        let embedding_response: OllamaEmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse Ollama embedding response")?;

        if embedding_response.embedding.is_empty() {
            anyhow::bail!(
                "Ollama returned empty embedding (dimension 0). Is '{}' an embedding model?",
                self.model
            );
        }

        let actual_dimension = embedding_response.embedding.len();
        let expected_dimension = self.dimension.load(Ordering::Relaxed);
        if actual_dimension != expected_dimension {
            tracing::info!(
                model = %self.model,
                actual = actual_dimension,
                expected = expected_dimension,
                "embedding dimension differs, updating"
            );
            self.dimension.store(actual_dimension, Ordering::Relaxed);
        }

        Ok(embedding_response.embedding)
    }

    async fn compute_query_embedding(&self, query: &str) -> Result<Vec<f32>> {
        if query.trim().is_empty() {
            anyhow::bail!("Cannot generate embedding for empty content");
        }
        self.compute_embedding(&instructed_query(self.query_instruction.as_deref(), query))
            .await
    }

    fn dimension(&self) -> usize {
        self.dimension.load(Ordering::Relaxed)
    }
}
