pub mod r#trait;
pub mod nvidia;
pub mod ollama;
mod stream;

pub use nvidia::NvidiaChatModel;
pub use ollama::OllamaChatModel;
pub use r#trait::{ChatModel, TokenStream};

use crate::config::{ChatBackend, Config};
use anyhow::Result;
use std::sync::Arc;

/// Build the chat model selected by `[chat] backend`
pub fn from_config(config: &Config) -> Result<Arc<dyn ChatModel>> {
    match config.chat.backend {
        ChatBackend::Ollama => {
            tracing::info!(model = %config.ollama.model, url = %config.ollama.url, "using Ollama chat model");
            Ok(Arc::new(OllamaChatModel::from_config(&config.ollama)))
        }
        ChatBackend::Nvidia => {
            let model = NvidiaChatModel::from_config(&config.nvidia, config.nvidia_api_key())?;
            tracing::info!(model = %model.name(), url = %config.nvidia.url, "using NVIDIA NIM chat model");
            Ok(Arc::new(model))
        }
    }
}
