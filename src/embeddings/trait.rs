use anyhow::{Context, Result};

/// Trait for embedding providers that can compute semantic vectors from text
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute embedding vector from text content
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>>;

    /// Get the dimension of embeddings produced by this provider
    fn dimension(&self) -> usize;

    /// Embed a search query. The default embeds the text as is; the TEI and
    /// Ollama providers prefix their configured query instruction.
    async fn compute_query_embedding(&self, query: &str) -> Result<Vec<f32>> {
        self.compute_embedding(query).await
    }

    /// Compute embeddings for several texts, in order
    async fn compute_embeddings(&self, contents: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(contents.len());
        for (i, content) in contents.iter().enumerate() {
            let embedding = self
                .compute_embedding(content)
                .await
                .with_context(|| format!("Failed to compute embedding {}/{}", i + 1, contents.len()))?;
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }
}
