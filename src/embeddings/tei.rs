use crate::embeddings::{instructed_query, EmbeddingProvider};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// TEI rejects requests above its `max_client_batch_size` (32 by default)
const MAX_BATCH_SIZE: usize = 32;

/// Text Embeddings Inference (TEI) provider from Hugging Face.
/// Serves pretrained sentence-embedding models such as
/// `intfloat/multilingual-e5-large-instruct` (1024 dims).
pub struct TeiEmbeddingProvider {
    base_url: String,
    client: reqwest::Client,
    dimension: AtomicUsize, // Use AtomicUsize to allow runtime dimension updates (thread-safe)
    query_instruction: Option<String>,
}

impl TeiEmbeddingProvider {
    /// Create a new TEI embedding provider
    /// Default URL: http://127.0.0.1:8080
    pub fn new(base_url: Option<&str>, dimension: Option<usize>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or("http://127.0.0.1:8080")
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
            dimension: AtomicUsize::new(dimension.unwrap_or(1024)),
            query_instruction: None,
        }
    }

    /// Prefix queries (not documents) with a task instruction; empty disables it
    pub fn with_query_instruction(mut self, instruction: &str) -> Self {
        let instruction = instruction.trim();
        self.query_instruction = (!instruction.is_empty()).then(|| instruction.to_string());
        self
    }

    async fn embed_batch(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embed", self.base_url);
        let request = TeiEmbeddingRequest {
            inputs,
            truncate: Some(true),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to TEI server")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("TEI API returned error {}: {}", status, error_text);
        }

        // TEI returns a bare array of arrays, one embedding per input
        let embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .context("Failed to parse TEI embedding response")?;

        if embeddings.len() != request.inputs.len() {
            anyhow::bail!(
                "TEI returned {} embeddings for {} inputs",
                embeddings.len(),
                request.inputs.len()
            );
        }

        if let Some(first) = embeddings.first() {
            if first.is_empty() {
                anyhow::bail!("TEI returned empty embedding (dimension 0)");
            }
            self.track_dimension(first.len());
        }

        Ok(embeddings)
    }

    /// Update the dimension to match what the served model actually returns
    fn track_dimension(&self, actual: usize) {
        let expected = self.dimension.load(Ordering::Relaxed);
        if actual != expected {
            tracing::info!(actual, expected, "TEI embedding dimension differs, updating");
            self.dimension.store(actual, Ordering::Relaxed);
        }
    }
}

#[derive(Serialize)]
struct TeiEmbeddingRequest {
    inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncate: Option<bool>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for TeiEmbeddingProvider {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        let content = content.trim();
        if content.is_empty() {
            anyhow::bail!("Cannot generate embedding for empty content");
        }

        let mut embeddings = self.embed_batch(vec![content.to_string()]).await?;
        Ok(embeddings.remove(0))
    }

    async fn compute_embeddings(&self, contents: &[String]) -> Result<Vec<Vec<f32>>> {
        if contents.iter().any(|c| c.trim().is_empty()) {
            anyhow::bail!("Cannot generate embedding for empty content");
        }

        let mut embeddings = Vec::with_capacity(contents.len());
        for batch in contents.chunks(MAX_BATCH_SIZE) {
            embeddings.extend(self.embed_batch(batch.to_vec()).await?);
        }
        Ok(embeddings)
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
