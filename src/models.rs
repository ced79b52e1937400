use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Metadata about a file in the filesystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMeta {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// File extension (without the dot, lowercased)
    pub extension: Option<String>,
    /// Creation time
    pub created_at: SystemTime,
    /// Last modification time
    pub updated_at: SystemTime,
    /// Blake3 hash of file contents
    pub hash: String,
}

impl FileMeta {
    /// Create a new FileMeta instance
    pub fn new(
        path: PathBuf,
        size: u64,
        extension: Option<String>,
        created_at: SystemTime,
        updated_at: SystemTime,
        hash: String,
    ) -> Self {
        Self {
            path,
            size,
            extension,
            created_at,
            updated_at,
            hash,
        }
    }

    /// Name of the file without its directory
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A unit of ingested text produced by the loader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable id derived from the source path and page
    pub id: String,
    pub text: String,
    pub meta: FileMeta,
    /// 1-based page label for paginated sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Document {
    pub fn new(text: String, meta: FileMeta, page: Option<u32>) -> Self {
        let id = crate::utils::document_id(&meta.path, page);
        Self {
            id,
            text,
            meta,
            page,
        }
    }
}

/// A chunk of a document; the unit that is embedded and retrieved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    /// Id of the document this chunk was cut from
    pub doc_id: String,
    pub text: String,
    pub meta: FileMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A node together with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    pub node: Node,
    pub score: f32,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(path: &str) -> FileMeta {
        let now = SystemTime::now();
        FileMeta::new(PathBuf::from(path), 10, Some("json".to_string()), now, now, "h".to_string())
    }

    #[test]
    fn test_file_meta_file_name() {
        assert_eq!(meta("/data/bugs/b1.json").file_name(), "b1.json");
    }

    #[test]
    fn test_document_id_depends_on_page() {
        let a = Document::new("one".to_string(), meta("/data/a.pdf"), Some(1));
        let b = Document::new("two".to_string(), meta("/data/a.pdf"), Some(2));
        let c = Document::new("three".to_string(), meta("/data/a.pdf"), Some(1));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, c.id);
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_string(&ChatMessage::assistant("Ahoy")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"Ahoy"}"#);
    }
}
