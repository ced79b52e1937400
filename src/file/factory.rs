use crate::file::types::{CsvFile, DocxFile, GenericFile, JsonFile, MarkupFile, PdfFile, XlsxFile};
use crate::file::SemanticSource;
use crate::models::FileMeta;
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for creating SemanticSource instances based on file extension
pub struct FileFactory;

impl FileFactory {
    /// Create a SemanticSource from FileMeta
    pub fn create_from_meta(meta: &FileMeta) -> Arc<dyn SemanticSource> {
        Self::create(meta.path.clone(), meta.extension.clone())
    }

    /// Create a SemanticSource from path and extension
    pub fn create(path: PathBuf, extension: Option<String>) -> Arc<dyn SemanticSource> {
        let ext_lower = extension.as_ref().map(|s| s.to_lowercase());

        match ext_lower.as_deref() {
            Some("pdf") => Arc::new(PdfFile::new(path, extension)),
            Some("csv") => Arc::new(CsvFile::new(path, extension)),
            Some("json") => Arc::new(JsonFile::new(path, extension)),
            Some("docx") => Arc::new(DocxFile::new(path, extension)),
            Some("xlsx") => Arc::new(XlsxFile::new(path, extension)),
            Some("html") | Some("htm") | Some("xml") => Arc::new(MarkupFile::new(path, extension)),
            _ => Arc::new(GenericFile::new(path, extension)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_factory_keeps_path_and_extension() {
        for ext in ["pdf", "csv", "json", "docx", "xlsx", "html", "xml", "txt", "py"] {
            let path = PathBuf::from(format!("/data/file.{}", ext));
            let source = FileFactory::create(path.clone(), Some(ext.to_string()));
            assert_eq!(source.path(), path.as_path());
            assert_eq!(source.extension(), Some(ext));
        }
    }

    #[tokio::test]
    async fn test_factory_unknown_extension_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.weird");
        std::fs::write(&path, "plain words").unwrap();

        let source = FileFactory::create(path, Some("weird".to_string()));
        assert_eq!(source.to_text().await.unwrap(), "plain words");
    }

    #[tokio::test]
    async fn test_factory_uppercase_extension_routes_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PAGE.HTML");
        std::fs::write(&path, "<p>hello</p>").unwrap();

        let source = FileFactory::create(path, Some("HTML".to_string()));
        assert_eq!(source.to_text().await.unwrap(), "hello");
    }

    #[test]
    fn test_factory_from_file_meta() {
        let now = SystemTime::now();
        let meta = FileMeta::new(
            PathBuf::from("/data/file.txt"),
            100,
            Some("txt".to_string()),
            now,
            now,
            "hash123".to_string(),
        );

        let source = FileFactory::create_from_meta(&meta);
        assert_eq!(source.path(), meta.path.as_path());
        assert_eq!(source.extension(), Some("txt"));
    }
}
