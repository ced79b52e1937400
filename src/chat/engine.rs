use crate::chat::memory::ChatMemory;
use crate::chat::prompt::{fill_template, format_context};
use crate::config::ChatConfig;
use crate::constants::{CONTEXT_PROMPT_TEMPLATE, SYSTEM_PROMPT};
use crate::embeddings::EmbeddingProvider;
use crate::indexer::VectorIndex;
use crate::llm::{ChatModel, TokenStream};
use crate::models::{ChatMessage, ScoredNode};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::{Arc, Mutex};

/// Trait for chat engines that answer a query with a streamed response
#[async_trait::async_trait]
pub trait ChatEngine: Send + Sync {
    async fn stream_chat(&self, query: &str) -> Result<StreamingResponse>;

    /// Forget the conversation so far
    fn reset(&self);
}

type CompletionHook = Box<dyn FnOnce(&str) + Send>;

/// Answer tokens as they arrive from the model, plus the nodes used as context
pub struct StreamingResponse {
    tokens: TokenStream,
    sources: Vec<ScoredNode>,
    text: String,
    on_complete: Option<CompletionHook>,
    finished: bool,
}

impl StreamingResponse {
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            sources: Vec::new(),
            text: String::new(),
            on_complete: None,
            finished: false,
        }
    }

    pub fn with_sources(mut self, sources: Vec<ScoredNode>) -> Self {
        self.sources = sources;
        self
    }

    /// Run `hook` with the full answer once the stream ends without error
    pub fn on_complete(mut self, hook: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn sources(&self) -> &[ScoredNode] {
        &self.sources
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Next token, or `None` once the answer is complete. An error ends the stream.
    pub async fn next_token(&mut self) -> Option<Result<String>> {
        if self.finished {
            return None;
        }

        match self.tokens.next().await {
            Some(Ok(token)) => {
                self.text.push_str(&token);
                Some(Ok(token))
            }
            Some(Err(e)) => {
                self.finished = true;
                self.on_complete = None;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                if let Some(hook) = self.on_complete.take() {
                    hook(&self.text);
                }
                None
            }
        }
    }

    /// Drain the stream and return the whole answer
    pub async fn collect_text(mut self) -> Result<String> {
        while let Some(token) = self.next_token().await {
            token?;
        }
        Ok(self.text)
    }
}

/// Chat engine that retrieves context for every query and keeps a conversation memory
pub struct ContextChatEngine {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn ChatModel>,
    system_prompt: String,
    context_template: String,
    top_k: usize,
    memory: Arc<Mutex<ChatMemory>>,
}

impl ContextChatEngine {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>, llm: Arc<dyn ChatModel>) -> Self {
        let defaults = ChatConfig::default();
        Self {
            index,
            embedder,
            llm,
            system_prompt: SYSTEM_PROMPT.to_string(),
            context_template: CONTEXT_PROMPT_TEMPLATE.to_string(),
            top_k: defaults.top_k,
            memory: Arc::new(Mutex::new(ChatMemory::new(defaults.memory_token_limit))),
        }
    }

    pub fn from_config(
        config: &ChatConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn ChatModel>,
    ) -> Self {
        Self::new(index, embedder, llm)
            .with_top_k(config.top_k)
            .with_memory_token_limit(config.memory_token_limit)
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_context_template(mut self, template: impl Into<String>) -> Self {
        self.context_template = template.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_memory_token_limit(mut self, limit: usize) -> Self {
        self.memory = Arc::new(Mutex::new(ChatMemory::new(limit)));
        self
    }

    /// Snapshot of the conversation memory
    pub fn history(&self) -> Vec<ChatMessage> {
        self.memory.lock().unwrap_or_else(|e| e.into_inner()).get().to_vec()
    }

    fn build_messages(&self, query: &str, nodes: &[ScoredNode]) -> Vec<ChatMessage> {
        let context = format_context(nodes);
        let system = format!(
            "{}\n{}",
            self.system_prompt,
            fill_template(&self.context_template, &context, query)
        );

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(self.history());
        messages.push(ChatMessage::user(query));
        messages
    }
}

#[async_trait::async_trait]
impl ChatEngine for ContextChatEngine {
    async fn stream_chat(&self, query: &str) -> Result<StreamingResponse> {
        let query_embedding = self
            .embedder
            .compute_query_embedding(query)
            .await
            .context("Failed to embed query")?;
        let nodes = self.index.search(&query_embedding, self.top_k).await?;
        tracing::debug!(retrieved = nodes.len(), top_k = self.top_k, "retrieved context nodes");

        let messages = self.build_messages(query, &nodes);
        let tokens = self
            .llm
            .stream_chat(&messages)
            .await
            .with_context(|| format!("Chat request to model {} failed", self.llm.name()))?;

        let memory = Arc::clone(&self.memory);
        let query = query.to_string();
        Ok(StreamingResponse::new(tokens)
            .with_sources(nodes)
            .on_complete(move |answer| {
                let mut memory = memory.lock().unwrap_or_else(|e| e.into_inner());
                memory.put(ChatMessage::user(query));
                memory.put(ChatMessage::assistant(answer));
            }))
    }

    fn reset(&self) {
        self.memory.lock().unwrap_or_else(|e| e.into_inner()).reset();
        tracing::debug!("chat memory reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{IndexBuilder, InMemoryVectorIndex};
    use crate::mock::{sample_document, KeywordEmbedder, MockChatModel};
    use crate::models::Role;

    async fn engine_with(model: Arc<MockChatModel>, top_k: usize) -> ContextChatEngine {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(KeywordEmbedder::default());
        let index = Arc::new(InMemoryVectorIndex::new());
        let docs = vec![
            sample_document("/data/save.txt", "crash when you save a file"),
            sample_document("/data/login.txt", "login is slow over the network"),
            sample_document("/data/pirate.txt", "the pirate ship hides treasure"),
        ];
        IndexBuilder::new(Arc::clone(&embedder), &Default::default())
            .insert_documents(&*index, &docs, "data")
            .await
            .unwrap();

        ContextChatEngine::new(index, embedder, model).with_top_k(top_k)
    }

    #[tokio::test]
    async fn test_stream_chat_sends_system_context_and_query() {
        let model = Arc::new(MockChatModel::new(&["Ahoy", ",", " matey!"]));
        let engine = engine_with(Arc::clone(&model), 1).await;

        let response = engine.stream_chat("why does save crash?").await.unwrap();
        assert_eq!(response.sources().len(), 1);
        assert!(response.sources()[0].node.meta.path.ends_with("save.txt"));
        assert_eq!(response.collect_text().await.unwrap(), "Ahoy, matey!");

        let messages = model.last_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with(SYSTEM_PROMPT));
        assert!(messages[0].content.contains("file_path: /data/save.txt\n\ncrash when you save a file"));
        assert!(messages[0].content.contains("Query: why does save crash?\nAnswer: "));
        assert!(!messages[0].content.contains("treasure"));
        assert_eq!(messages[1], ChatMessage::user("why does save crash?"));
    }

    #[tokio::test]
    async fn test_memory_grows_after_completed_turns_and_resets() {
        let model = Arc::new(MockChatModel::new(&["Arr"]));
        let engine = engine_with(Arc::clone(&model), 2).await;

        engine.stream_chat("first").await.unwrap().collect_text().await.unwrap();
        engine.stream_chat("second").await.unwrap().collect_text().await.unwrap();

        let messages = model.last_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1], ChatMessage::user("first"));
        assert_eq!(messages[2], ChatMessage::assistant("Arr"));
        assert_eq!(messages[3], ChatMessage::user("second"));
        assert_eq!(engine.history().len(), 4);

        engine.reset();
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_unfinished_stream_is_not_remembered() {
        let model = Arc::new(MockChatModel::new(&["Arr", "!"]));
        let engine = engine_with(model, 2).await;

        let mut response = engine.stream_chat("hello").await.unwrap();
        assert_eq!(response.next_token().await.unwrap().unwrap(), "Arr");
        drop(response);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let engine = engine_with(Arc::new(MockChatModel::failing()), 2).await;
        let err = engine.stream_chat("hello").await.err().unwrap();
        assert!(format!("{:#}", err).contains("model unavailable"));
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_stream_error_skips_completion_hook() {
        let tokens: Vec<Result<String>> = vec![Ok("a".to_string()), Err(anyhow::anyhow!("broken pipe"))];
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        let response = StreamingResponse::new(Box::pin(futures::stream::iter(tokens)))
            .on_complete(move |_| *flag.lock().unwrap() = true);

        assert!(response.collect_text().await.is_err());
        assert!(!*called.lock().unwrap());
    }
}
