use crate::file::SemanticSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::path::Path;

/// HTML and XML handler. HTML goes through an HTML5 parser, XML through a
/// conforming XML parser; only document text survives.
pub struct MarkupFile {
    path: std::path::PathBuf,
    extension: Option<String>,
}

impl MarkupFile {
    pub fn new(path: std::path::PathBuf, extension: Option<String>) -> Self {
        Self { path, extension }
    }
}

#[async_trait]
impl SemanticSource for MarkupFile {
    async fn to_text_impl(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read markup file: {}", self.path.display()))?;
        let source = String::from_utf8_lossy(&bytes);

        if self.extension.as_deref() == Some("xml") {
            xml_to_text(&source)
                .with_context(|| format!("Failed to parse XML: {}", self.path.display()))
        } else {
            Ok(html_to_text(&source))
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

/// Elements whose content is never page text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start and end a line
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "title", "section",
    "article", "header", "footer", "pre", "blockquote", "table", "ul", "ol",
];

/// Table cells are kept apart by a space
const CELL_TAGS: &[&str] = &["td", "th"];

/// Visible text of an HTML page, one line per block element
pub(crate) fn html_to_text(source: &str) -> String {
    let document = Html::parse_document(source);
    let mut out = String::with_capacity(source.len() / 2);
    collect_html_text(document.root_element(), &mut out);
    normalize_lines(&out)
}

fn collect_html_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        // Comments, doctypes and processing instructions carry no text
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if SKIPPED_TAGS.contains(&name) {
            continue;
        }

        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_html_text(child, out);
        if block {
            out.push('\n');
        } else if CELL_TAGS.contains(&name) {
            out.push(' ');
        }
    }
}

/// Text nodes of an XML document, one per line. CDATA sections count as text,
/// comments and processing instructions do not.
pub(crate) fn xml_to_text(source: &str) -> Result<String> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let document = roxmltree::Document::parse_with_options(source, options)?;

    let text = document
        .descendants()
        .filter(|node| node.is_text())
        .filter_map(|node| node.text())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(normalize_lines(&text))
}

/// Collapse runs of blanks inside lines and drop empty lines
pub(crate) fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
