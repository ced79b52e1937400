use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
///
/// Secrets never live in this file; they are read from the environment
/// (after `.env` has been loaded) through the accessor methods below.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub nvidia: NvidiaConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub llama_parse: LlamaParseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

/// Which embedding server computes vectors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Hugging Face Text Embeddings Inference
    Tei,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingBackend,
    pub url: String,
    pub model: String,
    pub dims: usize,
    /// Task description prepended to queries (not documents) for
    /// instruction-tuned embedding models. Empty disables the prefix.
    pub query_instruction: String,
}

/// Task prompt for multilingual-e5-large-instruct style models
pub const DEFAULT_QUERY_INSTRUCTION: &str =
    "Given a question, retrieve relevant passages that answer the question";

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Tei,
            url: "http://127.0.0.1:8080".to_string(),
            model: "intfloat/multilingual-e5-large-instruct".to_string(),
            dims: 1024,
            query_instruction: DEFAULT_QUERY_INSTRUCTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    /// Larger values only help with models trained on long contexts
    pub context_window: usize,
    pub json_mode: bool,
    /// Caps the number of generated tokens when set
    pub num_output: Option<usize>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.3".to_string(),
            temperature: 0.7,
            context_window: 124_000,
            json_mode: false,
            num_output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NvidiaConfig {
    pub url: String,
    /// No default: the NIM model has to be chosen explicitly
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub top_p: Option<f32>,
}

impl Default for NvidiaConfig {
    fn default() -> Self {
        Self {
            url: "https://integrate.api.nvidia.com/v1".to_string(),
            model: None,
            temperature: 0.7,
            max_tokens: None,
            top_p: None,
        }
    }
}

/// Language-model backend used by the chat engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatBackend {
    #[default]
    Ollama,
    Nvidia,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub backend: ChatBackend,
    /// Number of nodes retrieved per query
    pub top_k: usize,
    /// Token budget of the conversation memory
    pub memory_token_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: ChatBackend::Ollama,
            top_k: 2,
            memory_token_limit: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaParseConfig {
    pub url: String,
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
}

impl Default for LlamaParseConfig {
    fn default() -> Self {
        Self {
            url: "https://api.cloud.llamaindex.ai".to_string(),
            poll_interval_ms: 1000,
            max_wait_secs: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Launch the default browser once the GUI is listening
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_string(),
            open_browser: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub archive_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            archive_url: "https://codeload.github.com".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load `.env`, then configuration from the first location that exists, or defaults
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`Config::load`], but an explicit `path` wins over the search locations
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        // A missing .env is normal
        let _ = dotenv::dotenv();

        if let Some(path) = path {
            return Self::from_file(path);
        }

        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("CHATRAG_CONFIG") {
            candidates.push(expand_path(&path));
        }
        candidates.push(PathBuf::from("config/settings.toml"));
        candidates.push(expand_path("~/.config/chatrag/settings.toml"));

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// LlamaCloud key; its presence enables the structured parsing route
    pub fn llama_cloud_api_key(&self) -> Option<String> {
        non_empty_env("LLAMA_CLOUD_API_KEY")
    }

    pub fn nvidia_api_key(&self) -> Option<String> {
        non_empty_env("NVIDIA_API_KEY")
    }

    pub fn github_token(&self) -> Option<String> {
        non_empty_env("GITHUB_TOKEN")
    }

    /// Where GUI uploads are stored before indexing
    pub fn uploads_dir(&self) -> PathBuf {
        self.data.dir.join("uploads")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Expand a leading `~` in a path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
