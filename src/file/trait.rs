use crate::models::{Document, FileMeta};
use anyhow::Result;
use async_trait::async_trait;

/// Trait for extracting document text from a file on disk
#[async_trait]
pub trait SemanticSource: Send + Sync {
    /// Extract text content from the file (internal implementation)
    async fn to_text_impl(&self) -> Result<String>;

    /// Extract text content from the file (public API with size check)
    async fn to_text(&self) -> Result<String> {
        // Check file size first - if empty, return empty string
        match tokio::fs::metadata(self.path()).await {
            Ok(metadata) => {
                if metadata.len() == 0 {
                    return Ok(String::new());
                }
            }
            Err(_) => {
                // Can't get metadata, try to read anyway
            }
        }

        self.to_text_impl().await
    }

    /// Turn the file into documents; one per file unless the format is paginated
    async fn to_documents(&self, meta: &FileMeta) -> Result<Vec<Document>> {
        let text = self.to_text().await?;
        Ok(vec![Document::new(text, meta.clone(), None)])
    }

    /// Get the file path
    fn path(&self) -> &std::path::Path;

    /// Get the file extension
    fn extension(&self) -> Option<&str>;
}
