use crate::config::NvidiaConfig;
use crate::llm::stream::openai_sse_to_stream;
use crate::llm::{ChatModel, TokenStream};
use crate::models::ChatMessage;
use anyhow::{Context, Result};
use serde::Serialize;

/// Chat model hosted on an NVIDIA NIM endpoint (OpenAI-compatible API)
pub struct NvidiaChatModel {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<usize>,
    top_p: Option<f32>,
    client: reqwest::Client,
}

impl NvidiaChatModel {
    /// Fails when no model is configured
    pub fn from_config(config: &NvidiaConfig, api_key: Option<String>) -> Result<Self> {
        let model = config
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .context("NVIDIA backend selected but [nvidia] model is not set")?;

        if api_key.is_none() {
            tracing::warn!("NVIDIA_API_KEY is not set, requests will be sent without credentials");
        }

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            model,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            client: reqwest::Client::new(),
        })
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: true,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[async_trait::async_trait]
impl ChatModel for NvidiaChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat request to NIM");

        let mut builder = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&self.request(messages));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.context("Failed to connect to NVIDIA NIM")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("NIM API returned error {}: {}", status, error_text);
        }

        Ok(openai_sse_to_stream(response))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
