use crate::file::types::markup::normalize_lines;
use crate::file::SemanticSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;
use zip::ZipArchive;

/// Word document handler; reads the main document part of the archive
pub struct DocxFile {
    path: PathBuf,
    extension: Option<String>,
}

impl DocxFile {
    pub fn new(path: PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for DocxFile {
    async fn to_text_impl(&self) -> Result<String> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<String> {
            let xml = read_document_xml(&path)?;
            docx_paragraphs(&xml)
                .with_context(|| format!("Failed to parse document XML: {}", path.display()))
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

/// Spreadsheet handler; one line per non-empty row, under a header per sheet
pub struct XlsxFile {
    path: PathBuf,
    extension: Option<String>,
}

impl XlsxFile {
    pub fn new(path: PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for XlsxFile {
    async fn to_text_impl(&self) -> Result<String> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || workbook_rows(&path)).await?
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

fn read_document_xml(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read archive: {}", path.display()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .with_context(|| format!("Missing word/document.xml in {}", path.display()))?
        .read_to_string(&mut xml)
        .with_context(|| format!("Failed to read word/document.xml in {}", path.display()))?;
    Ok(xml)
}

/// One line per `w:p`, its `w:t` runs joined without separators
fn docx_paragraphs(xml: &str) -> Result<String> {
    let document = roxmltree::Document::parse(xml)?;

    let lines = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "p")
        .map(|paragraph| {
            paragraph
                .descendants()
                .filter(|node| node.is_element() && node.tag_name().name() == "t")
                .filter_map(|node| node.text())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(normalize_lines(&lines))
}

fn workbook_rows(path: &Path) -> Result<String> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let mut lines = Vec::new();
    for sheet in workbook.sheet_names().to_vec() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                warn!("Skipping sheet {} in {}: {}", sheet, path.display(), e);
                continue;
            }
        };

        lines.push(format!("Sheet: {}", sheet));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            if cells.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            lines.push(cells.join(" | "));
        }
    }

    if lines.is_empty() {
        anyhow::bail!("No readable sheets found in {}", path.display());
    }

    Ok(lines.join("\n"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    fn write_workbook(path: &Path) {
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{SHEET_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Bugs" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        );
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;
        let shared = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{SHEET_NS}" count="3" uniqueCount="3"><si><t>Title</t></si><si><t>Severity</t></si><si><t>Crash on save</t></si></sst>"#
        );
        let sheet = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{SHEET_NS}"><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="3"><c r="A3" t="s"><v>2</v></c><c r="B3"><v>3</v></c></row></sheetData></worksheet>"#
        );

        write_archive(
            path,
            &[
                ("[Content_Types].xml", "<Types/>"),
                ("xl/workbook.xml", workbook.as_str()),
                ("xl/_rels/workbook.xml.rels", rels),
                ("xl/sharedStrings.xml", shared.as_str()),
                ("xl/worksheets/sheet1.xml", sheet.as_str()),
            ],
        );
    }

    #[tokio::test]
    async fn test_docx_file_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        let document = format!(
            r#"<w:document xmlns:w="{WORD_NS}"><w:body><w:p><w:r><w:t>Bug </w:t></w:r><w:r><w:t xml:space="preserve">report</w:t></w:r></w:p><w:p><w:r><w:t>Steps</w:t></w:r></w:p></w:body></w:document>"#
        );
        write_archive(
            &path,
            &[
                ("[Content_Types].xml", "<Types/>"),
                ("word/document.xml", document.as_str()),
            ],
        );

        let docx = DocxFile::new(path, Some("docx".to_string()));
        assert_eq!(docx.to_text().await.unwrap(), "Bug report\nSteps");
    }

    #[test]
    fn test_docx_paragraphs_join_split_runs() {
        let xml = format!(
            r#"<w:document xmlns:w="{WORD_NS}"><w:body><w:p><w:r><w:t>Hel</w:t></w:r><!-- tracked change --><w:r><w:t>lo</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>World</w:t></w:r></w:p></w:body></w:document>"#
        );
        assert_eq!(docx_paragraphs(&xml).unwrap(), "Hello\nWorld");
    }

    #[tokio::test]
    async fn test_xlsx_file_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bugs.xlsx");
        write_workbook(&path);

        let xlsx = XlsxFile::new(path, Some("xlsx".to_string()));
        let text = xlsx.to_text().await.unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, vec!["Sheet: Bugs", "Title | Severity", "Crash on save | 3"]);
    }

    #[tokio::test]
    async fn test_xlsx_not_a_workbook_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "plain text").unwrap();

        let xlsx = XlsxFile::new(path, Some("xlsx".to_string()));
        assert!(xlsx.to_text().await.is_err());
    }

    #[tokio::test]
    async fn test_docx_not_an_archive_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "plain text").unwrap();

        let docx = DocxFile::new(path, Some("docx".to_string()));
        assert!(docx.to_text().await.is_err());
    }
}
