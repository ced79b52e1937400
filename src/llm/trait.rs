use crate::models::ChatMessage;
use anyhow::Result;
use futures::Stream;
use std::pin::Pin;

/// Tokens of a streamed model response, in arrival order
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for language-model backends that answer a conversation with a token stream
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and stream back the assistant reply
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream>;

    /// Model name used in logs
    fn name(&self) -> &str;
}
