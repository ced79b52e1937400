use crate::chat::ChatEngine;
use crate::constants::UPLOAD_EXTENSIONS;
use crate::context::AppContext;
use crate::gui::github::GithubClient;
use crate::indexer::{github_source, SOURCE_UPLOAD};
use crate::models::ChatMessage;
use crate::utils::get_extension;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A file received from the upload widget
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// State of the chat panel after the memory is cleared
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClearedChat {
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// Owner, name and branch fields of the GitHub tab
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GithubForm {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

/// GitHub tab after a reset: empty fields plus a status line
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GithubReset {
    #[serde(flatten)]
    pub form: GithubForm,
    pub status: String,
}

/// What the browser front-end can ask for. Failures come back as status
/// text, never as errors.
#[async_trait::async_trait]
pub trait UiHandlers: Send + Sync {
    /// Answer `message` and return the history with both turns appended
    async fn process_message(&self, message: &str, history: Vec<ChatMessage>) -> Vec<ChatMessage>;

    async fn clear_all_memory(&self) -> ClearedChat;

    async fn upload_files(&self, files: Vec<UploadedFile>) -> String;

    async fn clear_knowledge_base(&self) -> String;

    async fn load_github_repository(&self, form: GithubForm) -> String;

    async fn reset_github_info(&self) -> GithubReset;
}

/// Handlers backed by the application context
pub struct KnowledgeBaseHandlers {
    ctx: AppContext,
    github: GithubClient,
    /// Source tag of the repository currently in the index
    loaded_repo: Mutex<Option<String>>,
}

impl KnowledgeBaseHandlers {
    pub fn new(ctx: AppContext, github: GithubClient) -> Self {
        Self {
            ctx,
            github,
            loaded_repo: Mutex::new(None),
        }
    }

    pub fn from_context(ctx: AppContext) -> Self {
        let github = GithubClient::from_config(&ctx.config);
        Self::new(ctx, github)
    }

    async fn save_uploads(&self, files: Vec<UploadedFile>) -> Result<(Vec<PathBuf>, Vec<String>)> {
        let dir = self.ctx.config.uploads_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory: {}", dir.display()))?;

        let mut saved = Vec::new();
        let mut rejected = Vec::new();
        for file in files {
            // Only the final component is kept so uploads stay inside `dir`
            let name = Path::new(&file.name).file_name().map(|n| n.to_os_string());
            let name = match name {
                Some(name) => name,
                None => {
                    rejected.push(file.name);
                    continue;
                }
            };
            let supported = get_extension(Path::new(&name))
                .map(|ext| UPLOAD_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if !supported {
                rejected.push(file.name);
                continue;
            }

            let path = dir.join(&name);
            tokio::fs::write(&path, &file.bytes)
                .await
                .with_context(|| format!("Failed to save upload: {}", path.display()))?;
            saved.push(path);
        }
        Ok((saved, rejected))
    }

    async fn index_uploads(&self, files: Vec<UploadedFile>) -> Result<String> {
        let (saved, rejected) = self.save_uploads(files).await?;
        let rejected_note = if rejected.is_empty() {
            String::new()
        } else {
            format!(" Rejected unsupported files: {}.", rejected.join(", "))
        };
        if saved.is_empty() {
            anyhow::bail!("No supported files to upload.{}", rejected_note);
        }

        let docs = self.ctx.loader.load_files(&saved).await?;
        let nodes = self
            .ctx
            .builder
            .insert_documents(self.ctx.index.as_ref(), &docs, SOURCE_UPLOAD)
            .await?;

        Ok(format!(
            "Uploaded {} file(s) to the knowledge base ({} chunks indexed).{}",
            saved.len(),
            nodes,
            rejected_note
        ))
    }

    async fn reset_knowledge_base(&self) -> Result<()> {
        self.ctx.index.clear().await?;
        self.ctx.chat.reset();
        *self.loaded_repo.lock().await = None;

        let uploads = self.ctx.config.uploads_dir();
        if tokio::fs::try_exists(&uploads).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&uploads)
                .await
                .with_context(|| format!("Failed to remove uploads: {}", uploads.display()))?;
        }
        Ok(())
    }

    async fn load_repository(&self, form: &GithubForm) -> Result<String> {
        let owner = form.owner.trim();
        let repo = form.repo.trim();
        let branch = form.branch.trim();
        if owner.is_empty() || repo.is_empty() || branch.is_empty() {
            anyhow::bail!("Please provide the repository owner, name and branch.");
        }

        let docs = self.github.fetch_documents(owner, repo, branch).await?;
        let source = github_source(owner, repo, branch);

        // The previous repository stays searchable until the new one is embedded
        let mut loaded = self.loaded_repo.lock().await;
        let retired: Vec<&str> = loaded.as_deref().into_iter().collect();
        let nodes = self
            .ctx
            .builder
            .replace_documents(self.ctx.index.as_ref(), &docs, &source, &retired)
            .await?;
        if let Some(previous) = loaded.as_deref() {
            tracing::info!(previous, current = %source, "replaced previous repository");
        }
        *loaded = Some(source);

        Ok(format!(
            "Loaded {}/{} ({}) into the model: {} files, {} chunks indexed.",
            owner,
            repo,
            branch,
            docs.len(),
            nodes
        ))
    }
}

fn error_status(err: &anyhow::Error) -> String {
    format!("Error: {:#}", err)
}

#[async_trait::async_trait]
impl UiHandlers for KnowledgeBaseHandlers {
    async fn process_message(&self, message: &str, mut history: Vec<ChatMessage>) -> Vec<ChatMessage> {
        if message.trim().is_empty() {
            return history;
        }

        let answer = match self.ctx.chat.stream_chat(message).await {
            Ok(response) => response.collect_text().await,
            Err(e) => Err(e),
        };

        history.push(ChatMessage::user(message));
        match answer {
            Ok(text) => history.push(ChatMessage::assistant(text)),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                history.push(ChatMessage::assistant(error_status(&e)));
            }
        }
        history
    }

    async fn clear_all_memory(&self) -> ClearedChat {
        self.ctx.chat.reset();
        ClearedChat::default()
    }

    async fn upload_files(&self, files: Vec<UploadedFile>) -> String {
        if files.is_empty() {
            return "No files selected.".to_string();
        }
        match self.index_uploads(files).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                error_status(&e)
            }
        }
    }

    async fn clear_knowledge_base(&self) -> String {
        match self.reset_knowledge_base().await {
            Ok(()) => {
                tracing::info!("knowledge base cleared");
                "Knowledge base cleared.".to_string()
            }
            Err(e) => error_status(&e),
        }
    }

    async fn load_github_repository(&self, form: GithubForm) -> String {
        match self.load_repository(&form).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "repository load failed");
                error_status(&e)
            }
        }
    }

    async fn reset_github_info(&self) -> GithubReset {
        let previous = self.loaded_repo.lock().await.take();
        let status = match previous {
            Some(source) => match self.ctx.index.remove_source(&source).await {
                Ok(removed) => {
                    tracing::info!(%source, removed, "repository removed");
                    format!("Repository removed from the model ({} chunks).", removed)
                }
                Err(e) => error_status(&e),
            },
            None => "No repository loaded.".to_string(),
        };

        GithubReset {
            form: GithubForm::default(),
            status,
        }
    }
}
