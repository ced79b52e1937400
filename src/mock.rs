//! Test doubles for the embedding, model and engine seams

use crate::chat::{ChatEngine, StreamingResponse};
use crate::embeddings::EmbeddingProvider;
use crate::llm::{ChatModel, TokenStream};
use crate::models::{ChatMessage, Document, FileMeta};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::SystemTime;

pub(crate) fn sample_meta(path: &str, text: &str) -> FileMeta {
    let now = SystemTime::now();
    FileMeta::new(
        PathBuf::from(path),
        text.len() as u64,
        crate::utils::get_extension(std::path::Path::new(path)),
        now,
        now,
        blake3::hash(text.as_bytes()).to_hex().to_string(),
    )
}

pub(crate) fn sample_document(path: &str, text: &str) -> Document {
    Document::new(text.to_string(), sample_meta(path, text), None)
}

/// Embeds text as word counts over a fixed vocabulary, so similarity is predictable
pub(crate) struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    unavailable: AtomicBool,
}

impl KeywordEmbedder {
    /// While set, every embedding request fails like an unreachable server
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self {
            vocabulary: vec![
                "crash", "save", "login", "slow", "pirate", "treasure", "ship", "bug", "file", "network",
            ],
            unavailable: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        if self.unavailable.load(Ordering::SeqCst) {
            anyhow::bail!("Failed to connect to embedding server");
        }
        let lower = content.to_lowercase();
        let mut vector: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        // Keeps every vector non-zero
        vector.push(0.01);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len() + 1
    }
}

/// Replies with fixed tokens and records every conversation it receives
pub(crate) struct MockChatModel {
    tokens: Vec<String>,
    fail: bool,
    pub(crate) received: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatModel {
    pub(crate) fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            fail: false,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Model whose requests are rejected before any token is produced
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub(crate) fn last_messages(&self) -> Vec<ChatMessage> {
        self.received.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChatModel for MockChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        self.received.lock().unwrap().push(messages.to_vec());
        if self.fail {
            anyhow::bail!("model unavailable");
        }
        let tokens: Vec<Result<String>> = self.tokens.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(tokens)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Chat engine that answers every query with the same tokens
pub(crate) struct MockChatEngine {
    tokens: Vec<String>,
    pub(crate) queries: Mutex<Vec<String>>,
    pub(crate) resets: Mutex<usize>,
}

impl MockChatEngine {
    pub(crate) fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            queries: Mutex::new(Vec::new()),
            resets: Mutex::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ChatEngine for MockChatEngine {
    async fn stream_chat(&self, query: &str) -> Result<StreamingResponse> {
        self.queries.lock().unwrap().push(query.to_string());
        let tokens: Vec<Result<String>> = self.tokens.iter().cloned().map(Ok).collect();
        Ok(StreamingResponse::new(Box::pin(futures::stream::iter(tokens))))
    }

    fn reset(&self) {
        *self.resets.lock().unwrap() += 1;
    }
}
