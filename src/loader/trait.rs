use crate::models::{Document, FileMeta};
use anyhow::Result;

/// External service that turns rich documents into clean text
#[async_trait::async_trait]
pub trait StructuredParser: Send + Sync {
    /// Parse one file into documents
    async fn parse(&self, file: &FileMeta) -> Result<Vec<Document>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
