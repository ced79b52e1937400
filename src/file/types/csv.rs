use crate::file::SemanticSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// CSV file handler; each record becomes one line of comma-separated values
pub struct CsvFile {
    path: std::path::PathBuf,
    extension: Option<String>,
}

impl CsvFile {
    pub fn new(path: std::path::PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for CsvFile {
    async fn to_text_impl(&self) -> Result<String> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<String> {
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&path)
                .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

            let mut lines = Vec::new();
            for record in rdr.records() {
                let record = record
                    .with_context(|| format!("Failed to read CSV record: {}", path.display()))?;
                lines.push(record.iter().collect::<Vec<_>>().join(", "));
            }

            Ok(lines.join("\n"))
        })
        .await?
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}
