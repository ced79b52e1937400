use crate::config::OllamaConfig;
use crate::llm::stream::ollama_ndjson_to_stream;
use crate::llm::{ChatModel, TokenStream};
use crate::models::ChatMessage;
use anyhow::{Context, Result};
use serde::Serialize;

/// Chat model served by a local Ollama instance
pub struct OllamaChatModel {
    base_url: String,
    model: String,
    temperature: f32,
    context_window: usize,
    json_mode: bool,
    num_output: Option<usize>,
    client: reqwest::Client,
}

impl OllamaChatModel {
    pub fn new(base_url: &str, model: &str) -> Self {
        let defaults = OllamaConfig::default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: defaults.temperature,
            context_window: defaults.context_window,
            json_mode: defaults.json_mode,
            num_output: defaults.num_output,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            temperature: config.temperature,
            context_window: config.context_window,
            json_mode: config.json_mode,
            num_output: config.num_output,
            ..Self::new(&config.url, &config.model)
        }
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages,
            stream: true,
            options: OllamaOptions {
                temperature: self.temperature,
                num_ctx: self.context_window,
                num_predict: self.num_output,
            },
            format: self.json_mode.then_some("json"),
        }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_ctx: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<usize>,
}

#[async_trait::async_trait]
impl ChatModel for OllamaChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&self.request(messages))
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API returned error {}: {}", status, error_text);
        }

        Ok(ollama_ndjson_to_stream(response))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
