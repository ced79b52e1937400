use crate::file::SemanticSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// Best-effort reader for plain text, source code and unknown types.
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub struct GenericFile {
    path: std::path::PathBuf,
    extension: Option<String>,
}

impl GenericFile {
    pub fn new(path: std::path::PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for GenericFile {
    async fn to_text_impl(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read file: {}", self.path.display()))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
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
    async fn test_generic_file_extraction() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let generic_file = GenericFile::new(path.clone(), Some("rs".to_string()));
        let text = generic_file.to_text().await.unwrap();
        assert_eq!(text, "fn main() {}\n");

        assert_eq!(generic_file.path(), path);
        assert_eq!(generic_file.extension(), Some("rs"));
    }

    #[tokio::test]
    async fn test_generic_file_invalid_utf8_is_lossy() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), [b'o', b'k', 0xff, b'!']).unwrap();

        let generic_file = GenericFile::new(temp_file.path().to_path_buf(), None);
        let text = generic_file.to_text().await.unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[tokio::test]
    async fn test_generic_file_empty() {
        let temp_file = NamedTempFile::new().unwrap();
        let generic_file = GenericFile::new(temp_file.path().to_path_buf(), Some("txt".to_string()));
        assert_eq!(generic_file.to_text().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_generic_file_missing_propagates_error() {
        let generic_file = GenericFile::new("/nonexistent/chatrag/file.txt".into(), None);
        assert!(generic_file.to_text().await.is_err());
    }
}
