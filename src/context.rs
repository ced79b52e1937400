use crate::chat::ContextChatEngine;
use crate::config::Config;
use crate::embeddings::{self, EmbeddingProvider};
use crate::indexer::{IndexBuilder, InMemoryVectorIndex, VectorIndex, SOURCE_DATA};
use crate::llm::{self, ChatModel};
use crate::loader::DocumentLoader;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Everything a front-end needs, built once at startup and shared by handle
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub loader: Arc<DocumentLoader>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub builder: Arc<IndexBuilder>,
    pub chat: Arc<ContextChatEngine>,
}

impl AppContext {
    /// Build the providers from `config`, then load and index the data directory
    pub async fn initialize(config: Config, show_progress: bool) -> Result<Self> {
        std::fs::create_dir_all(&config.data.dir)
            .with_context(|| format!("Failed to create data directory: {}", config.data.dir.display()))?;

        let loader = DocumentLoader::from_config(&config);
        let embedder = embeddings::from_config(&config.embedding);
        let llm = llm::from_config(&config)?;
        let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());

        let ctx = Self::from_parts(config, loader, embedder, index, llm, show_progress);
        ctx.index_data_dir().await?;
        Ok(ctx)
    }

    /// Assemble a context from ready-made parts without loading anything
    pub fn from_parts(
        config: Config,
        loader: DocumentLoader,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn ChatModel>,
        show_progress: bool,
    ) -> Self {
        let builder = IndexBuilder::new(Arc::clone(&embedder), &config.splitter).with_progress(show_progress);
        let chat = ContextChatEngine::from_config(&config.chat, Arc::clone(&index), Arc::clone(&embedder), llm);

        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            embedder,
            index,
            builder: Arc::new(builder),
            chat: Arc::new(chat),
        }
    }

    /// Load the data directory and add it to the index; returns the number of nodes indexed
    pub async fn index_data_dir(&self) -> Result<usize> {
        let docs = self.loader.load_and_parse_data().await?;
        let nodes = self
            .builder
            .insert_documents(self.index.as_ref(), &docs, SOURCE_DATA)
            .await?;
        tracing::info!(
            documents = docs.len(),
            nodes,
            entries = self.index.len().await,
            "knowledge base ready"
        );
        Ok(nodes)
    }
}
