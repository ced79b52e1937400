use crate::config::SplitterConfig;
use crate::embeddings::EmbeddingProvider;
use crate::indexer::{IndexEntry, VectorIndex};
use crate::models::{Document, Node};
use crate::utils;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Nodes embedded per provider call
const EMBED_BATCH_SIZE: usize = 32;

/// Splits documents into nodes, embeds them and stores them in an index
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
    chunk_overlap: usize,
    show_progress: bool,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, splitter: &SplitterConfig) -> Self {
        Self {
            embedder,
            chunk_size: splitter.chunk_size,
            chunk_overlap: splitter.chunk_overlap,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while embedding
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Cut documents into nodes; documents without text produce none
    pub fn split(&self, docs: &[Document]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for doc in docs {
            for (i, chunk) in utils::chunk_text(&doc.text, self.chunk_size, self.chunk_overlap)
                .into_iter()
                .enumerate()
            {
                nodes.push(Node {
                    id: utils::node_id(&doc.id, i),
                    doc_id: doc.id.clone(),
                    text: chunk,
                    meta: doc.meta.clone(),
                    page: doc.page,
                });
            }
        }
        nodes
    }

    /// Embed nodes and tag them with `source`
    pub async fn embed_nodes(&self, nodes: Vec<Node>, source: &str) -> Result<Vec<IndexEntry>> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(nodes.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} nodes embedded")
                    .context("Invalid progress bar template")?
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut entries = Vec::with_capacity(nodes.len());
        for batch in nodes.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|n| n.text.clone()).collect();
            let embeddings = self.embedder.compute_embeddings(&texts).await?;
            if embeddings.len() != batch.len() {
                anyhow::bail!(
                    "Embedding provider returned {} vectors for {} nodes",
                    embeddings.len(),
                    batch.len()
                );
            }

            for (node, embedding) in batch.iter().zip(embeddings) {
                entries.push(IndexEntry {
                    node: node.clone(),
                    embedding,
                    source: source.to_string(),
                });
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        Ok(entries)
    }

    /// Split, embed and insert documents; returns the number of nodes indexed.
    ///
    /// Nodes previously indexed for the same documents are replaced, so a
    /// document that shrinks leaves no stale chunks behind. Nothing in the
    /// index changes when embedding fails.
    pub async fn insert_documents(
        &self,
        index: &dyn VectorIndex,
        docs: &[Document],
        source: &str,
    ) -> Result<usize> {
        self.replace_documents(index, docs, source, &[]).await
    }

    /// Like [`IndexBuilder::insert_documents`], and also drops every entry
    /// tagged with one of `retired_sources` once the new nodes are embedded
    pub async fn replace_documents(
        &self,
        index: &dyn VectorIndex,
        docs: &[Document],
        source: &str,
        retired_sources: &[&str],
    ) -> Result<usize> {
        let nodes = self.split(docs);
        let count = nodes.len();
        tracing::info!(documents = docs.len(), nodes = count, source, "indexing documents");

        let entries = self.embed_nodes(nodes, source).await?;
        let doc_ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let removed = index.replace(&doc_ids, retired_sources, entries).await?;
        if removed > 0 {
            tracing::debug!(removed, source, "replaced previously indexed nodes");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::InMemoryVectorIndex;
    use crate::mock::{sample_document, KeywordEmbedder};

    fn builder(chunk_size: usize) -> IndexBuilder {
        IndexBuilder::new(
            Arc::new(KeywordEmbedder::default()),
            &SplitterConfig {
                chunk_size,
                chunk_overlap: 0,
            },
        )
    }

    #[test]
    fn test_split_links_nodes_to_documents() {
        let docs = vec![
            sample_document("/data/a.txt", "crash when saving the file"),
            sample_document("/data/b.txt", ""),
        ];
        let nodes = builder(1024).split(&docs);

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].doc_id, docs[0].id);
        assert_eq!(nodes[0].text, "crash when saving the file");
    }

    #[test]
    fn test_split_long_document_into_several_nodes() {
        let text = "pirate ".repeat(100);
        let docs = vec![sample_document("/data/long.txt", &text)];
        let nodes = builder(10).split(&docs);

        assert!(nodes.len() > 1);
        let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), nodes.len());
        assert!(nodes.iter().all(|n| n.doc_id == docs[0].id));
    }

    #[tokio::test]
    async fn test_insert_documents_every_vector_has_one_document() {
        let docs = vec![
            sample_document("/data/a.txt", "crash on save"),
            sample_document("/data/b.txt", "slow login"),
        ];
        let index = InMemoryVectorIndex::new();

        let count = builder(1024).insert_documents(&index, &docs, "data").await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(index.len().await, 2);

        let mut expected: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        expected.sort();
        assert_eq!(index.document_ids(), expected);
    }

    #[tokio::test]
    async fn test_reinserting_a_shorter_document_drops_old_chunks() {
        let index = InMemoryVectorIndex::new();
        let builder = builder(10);

        let long = sample_document("/data/uploads/report.txt", &"treasure ".repeat(60));
        let first = builder.insert_documents(&index, &[long], "upload").await.unwrap();
        assert!(first > 1);
        assert_eq!(index.len().await, first);

        let short = sample_document("/data/uploads/report.txt", "crash on save");
        let second = builder.insert_documents(&index, &[short], "upload").await.unwrap();
        assert_eq!(second, 1);
        assert_eq!(index.len().await, 1);

        let hits = index.search(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 5).await.unwrap();
        assert!(hits.iter().all(|hit| !hit.node.text.contains("treasure")));
    }

    #[tokio::test]
    async fn test_failed_embedding_leaves_index_untouched() {
        let index = InMemoryVectorIndex::new();
        let embedder = Arc::new(KeywordEmbedder::default());
        let builder = IndexBuilder::new(embedder.clone(), &SplitterConfig::default());

        let doc = sample_document("/data/a.txt", "slow login");
        builder.insert_documents(&index, &[doc.clone()], "data").await.unwrap();

        embedder.set_unavailable(true);
        assert!(builder
            .replace_documents(&index, &[doc], "upload", &["data"])
            .await
            .is_err());
        assert_eq!(index.len().await, 1);
    }
}
