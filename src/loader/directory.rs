use crate::config::Config;
use crate::constants::STRUCTURED_PARSE_EXTENSIONS;
use crate::file::FileFactory;
use crate::loader::{LlamaParseClient, StructuredParser};
use crate::models::Document;
use crate::utils;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// How a single file is turned into documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sent to the external structured parser
    Structured,
    /// Read locally by the generic best-effort readers
    Generic,
}

/// Pick the route for a file. Only supported extensions go to the structured
/// parser, and only when a credential for it is configured.
pub fn route_for(extension: Option<&str>, has_credential: bool) -> Route {
    let supported = extension
        .map(|ext| {
            let ext = ext.trim_start_matches('.').to_lowercase();
            STRUCTURED_PARSE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false);

    if has_credential && supported {
        Route::Structured
    } else {
        Route::Generic
    }
}

/// Loads every file under a directory tree into documents
pub struct DocumentLoader {
    root: PathBuf,
    parser: Option<Arc<dyn StructuredParser>>,
}

impl DocumentLoader {
    /// Loader that only uses the generic readers
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            parser: None,
        }
    }

    /// Enable the structured route through `parser`
    pub fn with_parser(mut self, parser: Arc<dyn StructuredParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Loader for the configured data directory; the LlamaCloud parser is
    /// attached only when `LLAMA_CLOUD_API_KEY` is set
    pub fn from_config(config: &Config) -> Self {
        let loader = Self::new(config.data.dir.clone());
        match config.llama_cloud_api_key() {
            Some(key) => {
                tracing::info!("LlamaCloud key found, structured parsing enabled");
                loader.with_parser(Arc::new(LlamaParseClient::from_config(&config.llama_parse, &key)))
            }
            None => loader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_structured_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Load every file found recursively under the root directory.
    /// The first unreadable file or failed parse aborts the load.
    pub async fn load_and_parse_data(&self) -> Result<Vec<Document>> {
        let paths = self.collect_files().await?;
        tracing::info!(root = %self.root.display(), files = paths.len(), "loading documents");
        self.load_files(&paths).await
    }

    /// Load an explicit list of files with the same routing rules
    pub async fn load_files(&self, paths: &[PathBuf]) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for path in paths {
            docs.extend(self.load_file(path).await?);
        }
        Ok(docs)
    }

    /// Load a single file
    pub async fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let meta = utils::file_meta(path)?;
        let route = route_for(meta.extension.as_deref(), self.parser.is_some());

        match (&self.parser, route) {
            (Some(parser), Route::Structured) => {
                tracing::debug!(path = %path.display(), parser = parser.name(), "structured parse");
                parser
                    .parse(&meta)
                    .await
                    .with_context(|| format!("Structured parsing failed: {}", path.display()))
            }
            _ => {
                tracing::debug!(path = %path.display(), "generic read");
                FileFactory::create_from_meta(&meta).to_documents(&meta).await
            }
        }
    }

    /// All regular files under the root, in a stable order
    async fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
            let mut files = Vec::new();
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to scan directory: {}", root.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Ok(files)
        })
        .await?
    }
}
