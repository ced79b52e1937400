use crate::file::SemanticSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// JSON file handler
pub struct JsonFile {
    path: std::path::PathBuf,
    extension: Option<String>,
}

impl JsonFile {
    pub fn new(path: std::path::PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for JsonFile {
    async fn to_text_impl(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read JSON file: {}", self.path.display()))?;

        // Pretty-print valid JSON so nested records split on line boundaries;
        // anything else is kept verbatim
        match serde_json::from_str::<Value>(&content) {
            Ok(parsed) => serde_json::to_string_pretty(&parsed)
                .with_context(|| format!("Failed to serialize JSON: {}", self.path.display())),
            Err(_) => Ok(content),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_json_file_extraction() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::write(&path, r#"{"bug":"crash on save","severity":2}"#).unwrap();

        let json_file = JsonFile::new(path.clone(), Some("json".to_string()));
        let text = json_file.to_text().await.unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("crash on save"));
        assert_eq!(json_file.extension(), Some("json"));
    }

    #[tokio::test]
    async fn test_json_file_invalid_kept_verbatim() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{not json").unwrap();

        let json_file = JsonFile::new(temp_file.path().to_path_buf(), Some("json".to_string()));
        assert_eq!(json_file.to_text().await.unwrap(), "{not json");
    }
}
