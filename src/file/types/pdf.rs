use crate::file::SemanticSource;
use crate::models::{Document, FileMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// PDF file handler; produces one document per page
pub struct PdfFile {
    path: std::path::PathBuf,
    extension: Option<String>,
}

impl PdfFile {
    pub fn new(path: std::path::PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }

    /// Page number and text of every page that yields text
    async fn pages(&self) -> Result<Vec<(u32, String)>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<(u32, String)>> {
            use lopdf::Document;

            // lopdf first; it is quieter than pdf-extract on malformed fonts
            let doc = Document::load(&path)
                .with_context(|| format!("Failed to load PDF: {}", path.display()))?;

            let mut pages = Vec::new();
            for page_num in doc.get_pages().keys() {
                if let Ok(page_text) = doc.extract_text(&[*page_num]) {
                    let page_text = page_text.trim();
                    if !page_text.is_empty() {
                        pages.push((*page_num, page_text.to_string()));
                    }
                }
            }

            if pages.is_empty() {
                // Fallback: pdf-extract handles some encodings lopdf does not
                let text = pdf_extract::extract_text(&path)
                    .with_context(|| format!("Failed to extract PDF text: {}", path.display()))?;
                let text = text.trim();
                if !text.is_empty() {
                    pages.push((1, text.to_string()));
                }
            }

            Ok(pages)
        })
        .await?
    }
}

#[async_trait]
impl SemanticSource for PdfFile {
    async fn to_text_impl(&self) -> Result<String> {
        let pages = self.pages().await?;
        Ok(pages
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn to_documents(&self, meta: &FileMeta) -> Result<Vec<Document>> {
        if meta.size == 0 {
            return Ok(vec![Document::new(String::new(), meta.clone(), None)]);
        }

        let pages = self.pages().await?;
        Ok(pages
            .into_iter()
            .map(|(page, text)| Document::new(text, meta.clone(), Some(page)))
            .collect())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}
