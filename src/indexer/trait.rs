use crate::models::{Node, ScoredNode};
use anyhow::Result;

/// A node with its embedding, as stored in a vector index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub node: Node,
    pub embedding: Vec<f32>,
    /// Where the node came from: `data`, `upload` or `github:<owner>/<repo>@<branch>`
    pub source: String,
}

/// Trait for vector indexes that store embedded nodes and retrieve the closest ones
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add entries; an entry whose node id is already present replaces it
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// The `top_k` nodes most similar to `query`, best first
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredNode>>;

    /// Remove every entry tagged with `source`, returning how many were removed
    async fn remove_source(&self, source: &str) -> Result<usize>;

    /// Atomically drop every entry belonging to one of `doc_ids` or tagged with
    /// one of `sources`, then add `entries`. On error the index is unchanged.
    /// Returns how many entries were dropped.
    async fn replace(
        &self,
        doc_ids: &[String],
        sources: &[&str],
        entries: Vec<IndexEntry>,
    ) -> Result<usize>;

    /// Remove every node of the given documents
    async fn remove_documents(&self, doc_ids: &[String]) -> Result<usize> {
        self.replace(doc_ids, &[], Vec::new()).await
    }

    /// Remove all entries
    async fn clear(&self) -> Result<()>;

    /// Number of stored entries
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
