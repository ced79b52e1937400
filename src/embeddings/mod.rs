pub mod r#trait;
pub mod ollama;
pub mod tei;

pub use ollama::OllamaEmbeddingProvider;
pub use r#trait::EmbeddingProvider;
pub use tei::TeiEmbeddingProvider;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use std::sync::Arc;

/// Query text in the `Instruct: ...\nQuery: ...` form expected by
/// instruction-tuned models such as multilingual-e5-large-instruct
pub(crate) fn instructed_query(instruction: Option<&str>, query: &str) -> String {
    match instruction {
        Some(instruction) => format!("Instruct: {}\nQuery: {}", instruction, query.trim()),
        None => query.to_string(),
    }
}

/// Build the configured embedding provider
pub fn from_config(config: &EmbeddingConfig) -> Arc<dyn EmbeddingProvider> {
    match config.provider {
        EmbeddingBackend::Tei => {
            tracing::info!(model = %config.model, dims = config.dims, "using TEI embeddings");
            Arc::new(
                TeiEmbeddingProvider::new(Some(&config.url), Some(config.dims))
                    .with_query_instruction(&config.query_instruction),
            )
        }
        EmbeddingBackend::Ollama => {
            tracing::info!(model = %config.model, dims = config.dims, "using Ollama embeddings");
            Arc::new(
                OllamaEmbeddingProvider::new(Some(&config.url), Some(&config.model), Some(config.dims))
                    .with_query_instruction(&config.query_instruction),
            )
        }
    }
}
